//! Deep-merge and `extends` inheritance resolution on raw YAML.

use std::collections::{BTreeMap, BTreeSet};

use serde_yaml::Value;

use super::error::{Result, RuleError};

const MAX_EXTENDS_DEPTH: usize = 5;

/// Deep-merge two YAML values: mappings merge recursively, everything else
/// (scalars, sequences) is replaced by the child.
pub fn deep_merge(parent: &Value, child: &Value) -> Value {
    match (parent, child) {
        (Value::Mapping(pm), Value::Mapping(cm)) => {
            let mut merged = pm.clone();
            for (key, child_val) in cm {
                let value = match pm.get(key) {
                    Some(parent_val) => deep_merge(parent_val, child_val),
                    None => child_val.clone(),
                };
                merged.insert(key.clone(), value);
            }
            Value::Mapping(merged)
        }
        (_, child) => child.clone(),
    }
}

/// Resolve every `metadata.extends` chain in `raw`, keyed by document id.
pub fn resolve_extends(raw: &BTreeMap<String, Value>) -> Result<BTreeMap<String, Value>> {
    let mut resolved = BTreeMap::new();
    let mut in_progress = BTreeSet::new();
    for id in raw.keys() {
        resolve_single(id, raw, &mut resolved, &mut in_progress, 0)?;
    }
    Ok(resolved)
}

fn resolve_single(
    id: &str,
    raw: &BTreeMap<String, Value>,
    resolved: &mut BTreeMap<String, Value>,
    in_progress: &mut BTreeSet<String>,
    depth: usize,
) -> Result<Value> {
    if let Some(val) = resolved.get(id) {
        return Ok(val.clone());
    }
    if in_progress.contains(id) {
        return Err(RuleError::Extends(format!(
            "circular extends chain through '{}'",
            id
        )));
    }
    if depth > MAX_EXTENDS_DEPTH {
        return Err(RuleError::Extends(format!(
            "chain exceeds maximum depth ({}) at '{}'",
            MAX_EXTENDS_DEPTH, id
        )));
    }

    let value = raw
        .get(id)
        .ok_or_else(|| RuleError::Extends(format!("parent document '{}' not found", id)))?;

    let result = match parent_id(value) {
        Some(parent) => {
            in_progress.insert(id.to_string());
            let parent_val = resolve_single(&parent, raw, resolved, in_progress, depth + 1)?;
            in_progress.remove(id);
            deep_merge(&parent_val, value)
        }
        None => value.clone(),
    };

    resolved.insert(id.to_string(), result.clone());
    Ok(result)
}

fn parent_id(value: &Value) -> Option<String> {
    value
        .get("metadata")?
        .get("extends")?
        .as_str()
        .map(str::to_string)
}
