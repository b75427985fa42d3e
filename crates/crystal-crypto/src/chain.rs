//! # Event Hash Chain
//!
//! An append-only, hash-linked log of dispatch events. Each appended node
//! commits to its position, its timestamp, its event type, the canonical
//! rendering of its payload, and the hash of the node before it, so changing
//! any byte of any node breaks every link after it.
//!
//! ## Algorithm
//!
//! - Node hash: `SHA256(canonical({index, timestamp, eventType, data, parentHash}))`
//!   where `data` is the canonical string of the payload and `parentHash` is
//!   `null` for the first node.
//! - Root: `SHA256(hash_0 || hash_1 || ... || hash_n)` over the lowercase hex
//!   strings, or `SHA256("EMPTY_TREE")` for an empty chain.
//!
//! ## Security Invariant
//!
//! Nodes are never mutated or removed once appended. The builder exposes a
//! read-only slice; the only way to shrink it is [`ChainBuilder::reset`],
//! which discards the whole chain.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crystal_core::{canonicalize, hash_object, hash_str, CanonicalizationError, Clock};

use crate::error::ChainError;

/// Sentinel hashed as the root of an empty chain.
pub const EMPTY_TREE: &str = "EMPTY_TREE";

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// One link of the event chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventNode {
    /// Hash of the node content (64 hex chars).
    pub hash: String,
    /// Position in the chain.
    pub index: u64,
    /// Clock reading at append time.
    pub timestamp: u64,
    /// Wire name of the event.
    pub event_type: String,
    /// Canonical rendering of the event payload.
    pub data: String,
    /// Hash of the previous node, `None` for the first node.
    pub parent_hash: Option<String>,
}

/// The hashed content of a node: every field except the hash itself.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeContent<'a> {
    index: u64,
    timestamp: u64,
    event_type: &'a str,
    data: &'a str,
    parent_hash: Option<&'a str>,
}

/// Hash the content fields of a node.
fn node_content_hash(
    index: u64,
    timestamp: u64,
    event_type: &str,
    data: &str,
    parent_hash: Option<&str>,
) -> Result<String, CanonicalizationError> {
    hash_object(&NodeContent {
        index,
        timestamp,
        event_type,
        data,
        parent_hash,
    })
}

impl EventNode {
    /// Recompute this node's hash from its own fields.
    pub fn recompute_hash(&self) -> Result<String, CanonicalizationError> {
        node_content_hash(
            self.index,
            self.timestamp,
            &self.event_type,
            &self.data,
            self.parent_hash.as_deref(),
        )
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Append-only builder for an event chain.
///
/// Timestamps come from the injected clock, so a deterministic clock yields a
/// deterministic chain.
pub struct ChainBuilder {
    clock: Arc<dyn Clock>,
    nodes: Vec<EventNode>,
}

impl ChainBuilder {
    /// Create an empty chain reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            nodes: Vec::new(),
        }
    }

    /// Append an event and return a copy of the new node.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::Canonicalization` if `data` cannot be rendered
    /// canonically. Nothing is appended in that case.
    pub fn append(
        &mut self,
        event_type: &str,
        data: &impl Serialize,
    ) -> Result<EventNode, ChainError> {
        let index = self.nodes.len() as u64;
        let timestamp = self.clock.now_ms();
        let data = canonicalize(data)?;
        let parent_hash = self.nodes.last().map(|n| n.hash.clone());
        let hash = node_content_hash(index, timestamp, event_type, &data, parent_hash.as_deref())?;

        let node = EventNode {
            hash,
            index,
            timestamp,
            event_type: event_type.to_string(),
            data,
            parent_hash,
        };
        self.nodes.push(node.clone());
        Ok(node)
    }

    /// Root over the current nodes.
    pub fn compute_root(&self) -> String {
        compute_root(&self.nodes)
    }

    /// Read-only view of the chain.
    pub fn nodes(&self) -> &[EventNode] {
        &self.nodes
    }

    /// Number of appended nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Discard every node.
    pub fn reset(&mut self) {
        self.nodes.clear();
    }

    /// Consume the builder, yielding the chain.
    pub fn into_nodes(self) -> Vec<EventNode> {
        self.nodes
    }
}

impl std::fmt::Debug for ChainBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainBuilder")
            .field("len", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Offline checks
// ---------------------------------------------------------------------------

/// Root over an arbitrary node list.
pub fn compute_root(nodes: &[EventNode]) -> String {
    if nodes.is_empty() {
        return hash_str(EMPTY_TREE);
    }
    let joined: String = nodes.iter().map(|n| n.hash.as_str()).collect();
    hash_str(&joined)
}

/// A broken link found while walking a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkBreak {
    /// `parentHash` does not name the previous node (or node 0 has a parent).
    Parent {
        /// Index of the offending node.
        index: usize,
    },
    /// The stored hash does not match the node's own fields.
    Content {
        /// Index of the offending node.
        index: usize,
    },
}

/// Indices whose `parentHash` does not equal the previous node's hash.
///
/// Node 0 must have no parent.
pub fn parent_link_breaks(nodes: &[EventNode]) -> Vec<usize> {
    nodes
        .iter()
        .enumerate()
        .filter(|(i, node)| {
            let expected = i.checked_sub(1).map(|p| nodes[p].hash.as_str());
            node.parent_hash.as_deref() != expected
        })
        .map(|(i, _)| i)
        .collect()
}

/// Walk the chain and report every parent or content break, in index order.
///
/// A node whose content cannot be canonicalized counts as a content break.
pub fn verify_links(nodes: &[EventNode]) -> Vec<LinkBreak> {
    let parent_breaks = parent_link_breaks(nodes);
    let mut breaks = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        if parent_breaks.contains(&i) {
            breaks.push(LinkBreak::Parent { index: i });
        }
        let content_ok = node.recompute_hash().map(|h| h == node.hash).unwrap_or(false);
        if !content_ok {
            breaks.push(LinkBreak::Content { index: i });
        }
    }
    breaks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crystal_core::{FixedClock, SteppingClock};
    use serde_json::json;

    fn stepping() -> Arc<dyn Clock> {
        Arc::new(SteppingClock::new(1_000, 1))
    }

    #[test]
    fn test_empty_root_is_sentinel_hash() {
        let builder = ChainBuilder::new(stepping());
        assert!(builder.is_empty());
        assert_eq!(builder.compute_root(), hash_str("EMPTY_TREE"));
    }

    #[test]
    fn test_first_node_has_no_parent() {
        let mut builder = ChainBuilder::new(stepping());
        let node = builder.append("DISPATCH_RECEIVED", &json!({"trace_id": "t"})).unwrap();
        assert_eq!(node.index, 0);
        assert_eq!(node.timestamp, 1_000);
        assert!(node.parent_hash.is_none());
        assert_eq!(node.data, r#"{"trace_id":"t"}"#);
    }

    #[test]
    fn test_nodes_link_to_previous() {
        let mut builder = ChainBuilder::new(stepping());
        for event in ["DISPATCH_RECEIVED", "VALIDATION_OK", "DISPATCH_COMPLETE"] {
            builder.append(event, &json!({"event_type": event})).unwrap();
        }
        let nodes = builder.nodes();
        assert_eq!(nodes[1].parent_hash.as_deref(), Some(nodes[0].hash.as_str()));
        assert_eq!(nodes[2].parent_hash.as_deref(), Some(nodes[1].hash.as_str()));
        assert!(parent_link_breaks(nodes).is_empty());
        assert!(verify_links(nodes).is_empty());
    }

    #[test]
    fn test_node_hash_matches_content() {
        let mut builder = ChainBuilder::new(Arc::new(FixedClock::new(42)));
        let node = builder.append("POLICY_OK", &json!({"b": 1, "a": 2})).unwrap();
        let expected = hash_object(&json!({
            "index": 0,
            "timestamp": 42,
            "eventType": "POLICY_OK",
            "data": "{\"a\":2,\"b\":1}",
            "parentHash": null,
        }))
        .unwrap();
        assert_eq!(node.hash, expected);
        assert_eq!(node.recompute_hash().unwrap(), expected);
    }

    #[test]
    fn test_root_is_hash_of_concatenation() {
        let mut builder = ChainBuilder::new(stepping());
        let a = builder.append("A", &1).unwrap();
        let b = builder.append("B", &2).unwrap();
        assert_eq!(builder.compute_root(), hash_str(&format!("{}{}", a.hash, b.hash)));
    }

    #[test]
    fn test_reset_clears_chain() {
        let mut builder = ChainBuilder::new(stepping());
        builder.append("A", &json!(null)).unwrap();
        builder.reset();
        assert_eq!(builder.len(), 0);
        let node = builder.append("B", &json!(null)).unwrap();
        assert_eq!(node.index, 0);
        assert!(node.parent_hash.is_none());
    }

    #[test]
    fn test_tampered_data_is_content_break() {
        let mut builder = ChainBuilder::new(stepping());
        builder.append("A", &json!({"v": 1})).unwrap();
        builder.append("B", &json!({"v": 2})).unwrap();
        let mut nodes = builder.into_nodes();
        nodes[1].data = r#"{"v":3}"#.to_string();
        assert_eq!(verify_links(&nodes), vec![LinkBreak::Content { index: 1 }]);
    }

    #[test]
    fn test_rewired_parent_is_parent_break() {
        let mut builder = ChainBuilder::new(stepping());
        for i in 0..3 {
            builder.append("E", &i).unwrap();
        }
        let mut nodes = builder.into_nodes();
        nodes[2].parent_hash = Some(nodes[0].hash.clone());
        assert_eq!(parent_link_breaks(&nodes), vec![2]);
        // The rewired parent is part of the hashed content as well.
        assert_eq!(
            verify_links(&nodes),
            vec![LinkBreak::Parent { index: 2 }, LinkBreak::Content { index: 2 }]
        );
    }

    #[test]
    fn test_root_node_with_parent_is_break() {
        let mut builder = ChainBuilder::new(stepping());
        builder.append("E", &0).unwrap();
        let mut nodes = builder.into_nodes();
        nodes[0].parent_hash = Some("0".repeat(64));
        assert_eq!(parent_link_breaks(&nodes), vec![0]);
    }

    #[test]
    fn test_node_serializes_camel_case() {
        let mut builder = ChainBuilder::new(stepping());
        let node = builder.append("E", &0).unwrap();
        let json = serde_json::to_value(&node).unwrap();
        assert!(json.get("eventType").is_some());
        assert!(json.get("parentHash").unwrap().is_null());
        let back: EventNode = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crystal_core::SteppingClock;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn chain_links_hold_for_any_sequence(
            events in prop::collection::vec(("[A-Z_]{1,16}", any::<i64>()), 0..24),
            start in 0u64..1_000_000,
            step in 0u64..10,
        ) {
            let mut builder = ChainBuilder::new(Arc::new(SteppingClock::new(start, step)));
            for (event, payload) in &events {
                builder.append(event, payload).unwrap();
            }
            let nodes = builder.nodes();
            prop_assert_eq!(nodes.len(), events.len());
            prop_assert!(verify_links(nodes).is_empty());
            if let Some(first) = nodes.first() {
                prop_assert!(first.parent_hash.is_none());
            }
            prop_assert_eq!(builder.compute_root(), compute_root(nodes));
        }
    }
}
