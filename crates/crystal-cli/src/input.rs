//! Reading crystals and sample files from disk.

use std::path::Path;

use anyhow::{bail, Context};
use serde_json::Value;

use crystal_proof::ProofCrystal;
use crystal_stats::StatisticalProfile;

/// Parse `path` as JSON.
pub fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Load a stored crystal.
pub fn load_crystal(path: &Path) -> anyhow::Result<ProofCrystal> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    ProofCrystal::from_json(&text).with_context(|| format!("{} is not a crystal", path.display()))
}

/// Load a JSON array of durations.
pub fn load_samples(path: &Path) -> anyhow::Result<Vec<f64>> {
    let value = read_json(path)?;
    samples_from_value(&value).with_context(|| format!("in {}", path.display()))
}

fn samples_from_value(value: &Value) -> anyhow::Result<Vec<f64>> {
    let Some(items) = value.as_array() else {
        bail!("expected a JSON array of numbers");
    };
    items
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_f64()
                .with_context(|| format!("element {i} is not a number: {v}"))
        })
        .collect()
}

/// A profile from either a sample array or a stored crystal's
/// `performanceProfile`.
pub fn load_profile(path: &Path) -> anyhow::Result<StatisticalProfile> {
    let value = read_json(path)?;
    if value.is_object() {
        let crystal: ProofCrystal = serde_json::from_value(value)
            .with_context(|| format!("{} is neither a sample array nor a crystal", path.display()))?;
        return Ok(crystal.performance_profile().clone());
    }
    let samples = samples_from_value(&value).with_context(|| format!("in {}", path.display()))?;
    crystal_stats::profile(&samples).with_context(|| format!("cannot profile {}", path.display()))
}

/// Display name for a file: its stem, or the full path if it has none.
pub fn display_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
