//! # Content Hashes — SHA-256 over Canonical Bytes
//!
//! Every hash stored in a crystal is a lowercase 64-character SHA-256 hex
//! string computed here. `sha256_hex()` accepts only `&CanonicalBytes`, so
//! all hash paths flow through the canonicalization pipeline.
//!
//! - [`hash_str`] hashes a plain string verbatim (chain roots, sentinels).
//! - [`hash_object`] hashes the canonical rendering of any serializable value.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CanonicalizationError;

/// A SHA-256 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Compute a SHA-256 digest from canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest { bytes }
}

/// Compute a SHA-256 hex string from canonical bytes.
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    sha256_digest(data).to_hex()
}

/// Hash a string verbatim.
pub fn hash_str(s: &str) -> String {
    sha256_hex(&CanonicalBytes::from_str_raw(s))
}

/// Hash the canonical rendering of a serializable value.
///
/// # Errors
///
/// Propagates canonicalization failures.
pub fn hash_object(obj: &impl Serialize) -> Result<String, CanonicalizationError> {
    Ok(sha256_hex(&CanonicalBytes::new(obj)?))
}

/// Whether `s` looks like a hash produced by this module.
pub fn is_hex_64(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_hash_object_ignores_key_order() {
        let mut a = BTreeMap::new();
        a.insert("x", 1);
        a.insert("y", 2);
        let b = serde_json::json!({"y": 2, "x": 1});
        assert_eq!(hash_object(&a).unwrap(), hash_object(&b).unwrap());
    }

    #[test]
    fn test_hex_format() {
        let hex = hash_object(&serde_json::json!({"key": "value"})).unwrap();
        assert!(is_hex_64(&hex));
    }

    #[test]
    fn test_digest_display() {
        let digest = sha256_digest(&CanonicalBytes::from_str_raw("abc"));
        let s = format!("{digest}");
        assert!(s.starts_with("sha256:"));
        assert_eq!(s.len(), 7 + 64);
    }

    #[test]
    fn test_known_sha256_vectors() {
        // SHA-256("{}")
        assert_eq!(
            hash_object(&serde_json::json!({})).unwrap(),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
        // SHA-256("abc"), FIPS 180-2 appendix B.1
        assert_eq!(
            hash_str("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        // SHA-256("")
        assert_eq!(
            hash_str(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_string_object_hash_differs_from_raw() {
        // hash_object quotes the string; hash_str does not.
        assert_ne!(hash_object(&"abc").unwrap(), hash_str("abc"));
        assert_eq!(hash_object(&"abc").unwrap(), hash_str("\"abc\""));
    }

    #[test]
    fn test_is_hex_64_rejects_uppercase_and_short() {
        assert!(!is_hex_64("ABC"));
        assert!(!is_hex_64(&"A".repeat(64)));
        assert!(is_hex_64(&"a".repeat(64)));
    }
}
