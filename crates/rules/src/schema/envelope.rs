//! Envelope for lightweight first-pass deserialization.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{CommonMetadata, RuleDocument, RuleKind};

/// Reads only the header fields of a document.
///
/// Two-pass loading: extract `kind` first, then deserialize the whole
/// document into the concrete type for that kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEnvelope {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    /// Remaining fields captured as raw YAML for the second pass.
    #[serde(flatten)]
    pub rest: serde_yaml::Value,
}

impl RuleEnvelope {
    pub fn rule_kind(&self) -> std::result::Result<RuleKind, String> {
        self.kind.parse()
    }

    /// Second pass: reconstruct the full YAML and deserialize by kind.
    pub fn parse_full(&self) -> std::result::Result<RuleDocument, String> {
        Ok(match self.rule_kind()? {
            RuleKind::DetectorConfig => RuleDocument::DetectorConfig(self.reparse()?),
            RuleKind::EnsembleConfig => RuleDocument::EnsembleConfig(self.reparse()?),
            RuleKind::RoomProfiles => RuleDocument::RoomProfiles(self.reparse()?),
            RuleKind::RecommendationConfig => {
                RuleDocument::RecommendationConfig(self.reparse()?)
            }
        })
    }

    fn reparse<T: DeserializeOwned>(&self) -> std::result::Result<T, String> {
        let value = serde_yaml::to_value(self).map_err(|e| e.to_string())?;
        serde_yaml::from_value(value).map_err(|e| e.to_string())
    }
}
