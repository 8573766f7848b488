//! Validation of configuration documents with structured errors and
//! suggestions. Errors make a document unusable; warnings are advisory.

pub(crate) mod config_checks;

pub mod fuzzy;

use serde::{Deserialize, Serialize};

use crate::schema::*;

// ── Result types ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Path-like location, e.g. `"spec.weights"`.
    pub path: String,
    pub message: String,
    /// Optional "did you mean" suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        });
    }

    pub(crate) fn error_with_suggestion(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: Some(suggestion.into()),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }

    /// Fold another result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.valid &= other.valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// One line per error, for error messages and CLI output.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| match &e.suggestion {
                Some(s) => format!("{}: {} (did you mean '{}'?)", e.path, e.message, s),
                None => format!("{}: {}", e.path, e.message),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ── Public API ──────────────────────────────────────────────────────

/// Validate any [`RuleDocument`], dispatching on kind.
pub fn validate_document(doc: &RuleDocument) -> ValidationResult {
    let mut result = ValidationResult::new();
    match doc {
        RuleDocument::DetectorConfig(d) => {
            config_checks::validate_header(&d.api_version, &d.kind, doc.kind(), &d.metadata, &mut result);
            config_checks::check_detector_spec(&d.spec, &mut result);
        }
        RuleDocument::EnsembleConfig(d) => {
            config_checks::validate_header(&d.api_version, &d.kind, doc.kind(), &d.metadata, &mut result);
            config_checks::check_ensemble_spec(&d.spec, &mut result);
        }
        RuleDocument::RoomProfiles(d) => {
            config_checks::validate_header(&d.api_version, &d.kind, doc.kind(), &d.metadata, &mut result);
            config_checks::check_room_profiles_spec(&d.spec, &mut result);
        }
        RuleDocument::RecommendationConfig(d) => {
            config_checks::validate_header(&d.api_version, &d.kind, doc.kind(), &d.metadata, &mut result);
            config_checks::check_recommendation_spec(&d.spec, &mut result);
        }
    }
    result
}

/// Parse raw YAML (any kind) and validate it.
pub fn validate_yaml(yaml: &str) -> ValidationResult {
    let parsed = serde_yaml::from_str::<RuleEnvelope>(yaml)
        .map_err(|e| format!("YAML parse error: {e}"))
        .and_then(|envelope| envelope.parse_full());
    match parsed {
        Ok(doc) => validate_document(&doc),
        Err(e) => {
            let mut result = ValidationResult::new();
            match e.strip_prefix("unknown document kind: ") {
                Some(kind) => {
                    let kind = kind.trim_matches('\'');
                    let names: Vec<&str> = RuleKind::ALL.iter().map(|k| k.as_str()).collect();
                    match fuzzy::fuzzy_match(kind, &names) {
                        Some(s) => result.error_with_suggestion("kind", e.clone(), s),
                        None => result.error("kind", e.clone()),
                    }
                }
                None => result.error("", e),
            }
            result
        }
    }
}
