use anyhow::{Result, Context as AnyhowContext};
use serde_json::Value;
use std::fs;
use std::path::Path;
use crate::api::NodeRecord;
use crate::graph::Elements;
use crate::graph::classify::classify_all;

fn is_yaml(path: &Path) -> bool {
    matches!(path.extension().and_then(|s| s.to_str()), Some("yaml") | Some("yml"))
}

fn read_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if is_yaml(path) {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to deserialize YAML content from {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to deserialize JSON content from {}", path.display()))
    }
}

/// Loads an element list (JSON, or YAML by extension). Every entry goes
/// through the classifier; one malformed element fails the whole file.
pub fn load_elements(path: impl AsRef<Path>) -> Result<Elements> {
    let path = path.as_ref();
    let raw = read_value(path)?;
    let elements = classify_all(&raw)
        .with_context(|| format!("Invalid element list in {}", path.display()))?;
    Ok(elements)
}

/// Loads persisted node rows as the server returns them.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<NodeRecord>> {
    let path = path.as_ref();
    let raw = read_value(path)?;
    let records = serde_json::from_value(raw)
        .with_context(|| format!("Invalid node records in {}", path.display()))?;
    Ok(records)
}

pub fn save_elements(path: impl AsRef<Path>, elements: &Elements) -> Result<()> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(elements)?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
