//! Metadata block carried by every configuration document.

use serde::{Deserialize, Serialize};

/// Shared metadata for all document kinds.
///
/// `extends` names a parent document by id; the loader deep-merges the
/// parent into the child before typed parsing, child values winning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CommonMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub extends: Option<String>,
}

impl CommonMetadata {
    /// Metadata for a built-in document.
    pub fn builtin(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            tags: Some(vec!["builtin".to_string()]),
            enabled: true,
            extends: None,
        }
    }
}

pub(crate) fn default_true() -> bool {
    true
}
