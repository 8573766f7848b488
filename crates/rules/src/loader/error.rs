//! Error types and load result structures for the loader.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Semantic error: bad header, duplicate ids, failed checks.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Broken `extends` chain: cycle, missing parent, or too deep.
    #[error("Extends error: {0}")]
    Extends(String),
}

pub type Result<T> = std::result::Result<T, RuleError>;

/// Outcome of loading a single file.
#[derive(Debug)]
pub struct LoadResult {
    pub path: PathBuf,
    pub status: LoadStatus,
}

#[derive(Debug, PartialEq)]
pub enum LoadStatus {
    Loaded { id: String },
    /// Dotfile, non-YAML, etc.
    Skipped { reason: String },
    Failed { error: String },
}

impl LoadStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadStatus::Loaded { .. })
    }
}
