//! Detector evidence metadata - an open, namespaced key/value bag

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ValidationError;

/// Metadata attached to a relationship.
///
/// Keys are strategy-namespaced (`"imports.line_count"`) by the detection
/// layer; a BTreeMap keeps serialization order stable so persisted and
/// exported forms are bit-exact across runs.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A metadata value - one of a small closed set of primitive kinds.
///
/// Keeping the set closed keeps the JSON persisted in the store simple
/// and deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Boolean flag
    Bool(bool),
    /// Integer count or position
    Int(i64),
    /// Floating point score
    Float(f64),
    /// Free-form text evidence
    Str(String),
}

impl MetadataValue {
    /// Human-readable rendering, used by CLI output
    pub fn render(&self) -> String {
        match self {
            MetadataValue::Bool(b) => b.to_string(),
            MetadataValue::Int(i) => i.to_string(),
            MetadataValue::Float(f) => format!("{:.3}", f),
            MetadataValue::Str(s) => s.clone(),
        }
    }
}

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        MetadataValue::Bool(v)
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        MetadataValue::Int(v)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        MetadataValue::Float(v)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::Str(v.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        MetadataValue::Str(v)
    }
}

/// Validate a metadata map: keys must be non-empty
pub fn validate_metadata(metadata: &Metadata) -> Result<(), ValidationError> {
    if metadata.keys().any(|k| k.trim().is_empty()) {
        return Err(ValidationError::EmptyMetadataKey);
    }
    Ok(())
}

/// Merge `incoming` into `base`, prefixing every incoming key with
/// `namespace` so evidence from different strategies never collides.
pub fn merge_namespaced(base: &mut Metadata, namespace: &str, incoming: &Metadata) {
    for (key, value) in incoming {
        let namespaced = if key.starts_with(&format!("{}.", namespace)) {
            key.clone()
        } else {
            format!("{}.{}", namespace, key)
        };
        base.insert(namespaced, value.clone());
    }
}
