//! Core [`RuleLoader`]: filesystem-backed document loading.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, info, warn};

use crate::schema::{RuleDocument, RuleEnvelope, RuleKind};
use crate::{detector_config, ensemble_config, recommendation_config, room_profiles};

use super::error::{LoadResult, LoadStatus, Result, RuleError};
use super::extends::resolve_extends;

/// Loads `*.yml` / `*.yaml` documents from a directory tree.
///
/// Documents are keyed by `metadata.id`. Built-in documents are available
/// as `extends` parents but are never returned from [`documents`](Self::documents).
pub struct RuleLoader {
    config_dir: PathBuf,
    documents: BTreeMap<String, RuleDocument>,
}

/// A YAML file that parsed as a mapping, before `extends` resolution.
struct RawFile {
    path: PathBuf,
    id: String,
    value: Value,
}

impl RuleLoader {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            documents: BTreeMap::new(),
        }
    }

    /// Recursively scan the directory and load every YAML document.
    ///
    /// Dotfiles and non-YAML files are skipped. Parse errors are reported
    /// per file and do not abort the scan; a broken `extends` chain does.
    pub fn load_all(&mut self) -> Result<Vec<LoadResult>> {
        let mut paths = Vec::new();
        let mut results = Vec::new();
        scan_dir_recursive(&self.config_dir, &mut paths, &mut results)?;
        paths.sort();

        let mut files: Vec<RawFile> = Vec::new();
        for path in paths {
            match read_raw(&path) {
                Ok((id, value)) => {
                    if files.iter().any(|f| f.id == id) {
                        warn!(id = %id, path = %path.display(), "duplicate document id");
                        results.push(LoadResult {
                            path,
                            status: LoadStatus::Failed {
                                error: format!("duplicate document id '{}'", id),
                            },
                        });
                    } else {
                        files.push(RawFile { path, id, value });
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read config file");
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Failed {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }

        let mut raw: BTreeMap<String, Value> = builtin_raw_documents()?;
        for file in &files {
            raw.insert(file.id.clone(), file.value.clone());
        }
        let resolved = resolve_extends(&raw)?;

        for file in files {
            let status = match resolved.get(&file.id).map(parse_value) {
                Some(Ok(doc)) => {
                    info!(id = %file.id, kind = %doc.kind(), path = %file.path.display(), "loaded config document");
                    self.documents.insert(file.id.clone(), doc);
                    LoadStatus::Loaded { id: file.id }
                }
                Some(Err(e)) => {
                    warn!(path = %file.path.display(), error = %e, "failed to parse config document");
                    LoadStatus::Failed {
                        error: e.to_string(),
                    }
                }
                None => LoadStatus::Failed {
                    error: format!("document '{}' missing after extends resolution", file.id),
                },
            };
            results.push(LoadResult {
                path: file.path,
                status,
            });
        }

        Ok(results)
    }

    /// Parse a single file without `extends` resolution.
    pub fn load_file(&self, path: &Path) -> Result<RuleDocument> {
        let contents = fs::read_to_string(path)?;
        let value: Value = serde_yaml::from_str(&contents)?;
        parse_value(&value)
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Loaded documents in id order.
    pub fn documents(&self) -> impl Iterator<Item = &RuleDocument> {
        self.documents.values()
    }

    pub fn get(&self, id: &str) -> Option<&RuleDocument> {
        self.documents.get(id)
    }

    /// Enabled documents of one kind.
    pub fn enabled_of_kind(&self, kind: RuleKind) -> Vec<&RuleDocument> {
        self.documents
            .values()
            .filter(|d| d.kind() == kind && d.metadata().enabled)
            .collect()
    }
}

fn scan_dir_recursive(
    dir: &Path,
    paths: &mut Vec<PathBuf>,
    results: &mut Vec<LoadResult>,
) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "failed to read directory");
            return Ok(());
        }
    };

    for entry in entries {
        let path = entry?.path();

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                if path.is_file() {
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Skipped {
                            reason: "dotfile".to_string(),
                        },
                    });
                }
                continue;
            }
        }

        if path.is_dir() {
            scan_dir_recursive(&path, paths, results)?;
            continue;
        }

        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e == "yml" || e == "yaml")
            .unwrap_or(false);

        if is_yaml {
            paths.push(path);
        } else {
            debug!(path = %path.display(), "skipping non-YAML file");
            results.push(LoadResult {
                path,
                status: LoadStatus::Skipped {
                    reason: "not a YAML file".to_string(),
                },
            });
        }
    }

    Ok(())
}

/// Read a file into raw YAML and extract its id.
fn read_raw(path: &Path) -> Result<(String, Value)> {
    let contents = fs::read_to_string(path)?;
    let value: Value = serde_yaml::from_str(&contents)?;
    let id = raw_id(&value)?;
    Ok((id, value))
}

fn raw_id(value: &Value) -> Result<String> {
    match value.get("metadata").and_then(|m| m.get("id")).and_then(Value::as_str) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(RuleError::Validation(
            "document metadata.id must not be empty".to_string(),
        )),
    }
}

/// Two-pass parse of a resolved YAML value.
fn parse_value(value: &Value) -> Result<RuleDocument> {
    let envelope: RuleEnvelope = serde_yaml::from_value(value.clone())?;
    if envelope.metadata.id.is_empty() {
        return Err(RuleError::Validation(
            "document metadata.id must not be empty".to_string(),
        ));
    }
    envelope.parse_full().map_err(|e| {
        RuleError::Validation(format!(
            "failed to parse document '{}': {}",
            envelope.metadata.id, e
        ))
    })
}

/// Embedded defaults, keyed by id, so directory documents can extend them.
fn builtin_raw_documents() -> Result<BTreeMap<String, Value>> {
    let mut raw = BTreeMap::new();
    for yaml in [
        detector_config::BUILTIN_YAML,
        ensemble_config::BUILTIN_YAML,
        room_profiles::BUILTIN_YAML,
        recommendation_config::BUILTIN_YAML,
    ] {
        let value: Value = serde_yaml::from_str(yaml)?;
        raw.insert(raw_id(&value)?, value);
    }
    Ok(raw)
}
