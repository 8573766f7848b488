//! [`AnalysisRules`]: the compiled configuration the analysis engine reads.
//!
//! One document of each kind. Built-in documents supply every kind the
//! configuration directory leaves out.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::detector_config::{self, CompiledDetectorConfig, DetectorConfigRule};
use crate::ensemble_config::{self, CompiledEnsembleConfig, EnsembleConfigRule};
use crate::loader::{Result, RuleError, RuleLoader};
use crate::recommendation_config::{
    self, CompiledRecommendationConfig, RecommendationConfigRule,
};
use crate::room_profiles::{self, CompiledRoomProfiles, RoomProfilesRule};
use crate::schema::{RuleDocument, RuleKind};
use crate::validation::{config_checks, validate_document, ValidationResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRules {
    pub detectors: CompiledDetectorConfig,
    pub ensemble: CompiledEnsembleConfig,
    pub rooms: CompiledRoomProfiles,
    pub recommendation: CompiledRecommendationConfig,
}

impl AnalysisRules {
    /// Parse the embedded default documents.
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            detectors: serde_yaml::from_str::<DetectorConfigRule>(detector_config::BUILTIN_YAML)?
                .compile(),
            ensemble: serde_yaml::from_str::<EnsembleConfigRule>(ensemble_config::BUILTIN_YAML)?
                .compile(),
            rooms: serde_yaml::from_str::<RoomProfilesRule>(room_profiles::BUILTIN_YAML)?
                .compile(),
            recommendation: serde_yaml::from_str::<RecommendationConfigRule>(
                recommendation_config::BUILTIN_YAML,
            )?
            .compile(),
        })
    }

    /// Overlay enabled documents on the built-in defaults.
    ///
    /// Every document must validate, and each kind may have at most one
    /// enabled document.
    pub fn from_documents<'a>(docs: impl IntoIterator<Item = &'a RuleDocument>) -> Result<Self> {
        let mut rules = Self::builtin()?;
        let mut seen: Vec<(RuleKind, &str)> = Vec::new();

        for doc in docs {
            let meta = doc.metadata();
            if !meta.enabled {
                info!(id = %meta.id, kind = %doc.kind(), "skipping disabled config document");
                continue;
            }
            if let Some((_, other)) = seen.iter().find(|(k, _)| *k == doc.kind()) {
                return Err(RuleError::Validation(format!(
                    "more than one enabled {} document: '{}' and '{}'",
                    doc.kind(),
                    other,
                    meta.id
                )));
            }
            seen.push((doc.kind(), meta.id.as_str()));

            let result = validate_document(doc);
            for w in &result.warnings {
                warn!(id = %meta.id, path = %w.path, "{}", w.message);
            }
            if !result.valid {
                return Err(RuleError::Validation(format!(
                    "document '{}' is invalid: {}",
                    meta.id,
                    result.error_summary()
                )));
            }

            match doc {
                RuleDocument::DetectorConfig(d) => rules.detectors = d.compile(),
                RuleDocument::EnsembleConfig(d) => rules.ensemble = d.compile(),
                RuleDocument::RoomProfiles(d) => rules.rooms = d.compile(),
                RuleDocument::RecommendationConfig(d) => rules.recommendation = d.compile(),
            }
            info!(id = %meta.id, kind = %doc.kind(), "applied config document");
        }

        Ok(rules)
    }

    /// Load a configuration directory and overlay it on the defaults.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut loader = RuleLoader::new(dir);
        let results = loader.load_all()?;
        let loaded = results.iter().filter(|r| r.status.is_loaded()).count();
        info!(path = %dir.display(), loaded, scanned = results.len(), "scanned config directory");
        Self::from_documents(loader.documents())
    }

    /// Load from `dir` when given, otherwise use the built-in defaults.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::load_dir(dir),
            None => Self::builtin(),
        }
    }

    /// Content checks over the whole bundle.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        config_checks::check_detector_spec(&self.detectors, &mut result);
        config_checks::check_ensemble_spec(&self.ensemble, &mut result);
        config_checks::check_room_profiles_spec(&self.rooms, &mut result);
        config_checks::check_recommendation_spec(&self.recommendation, &mut result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector_config::DetectorConfigSpec;
    use crate::ensemble_config::EnsembleConfigSpec;
    use crate::schema::CommonMetadata;

    #[test]
    fn builtin_is_valid() {
        let rules = AnalysisRules::builtin().unwrap();
        assert!(rules.validate().valid);
        assert_eq!(rules.detectors, DetectorConfigSpec::default());
        assert_eq!(rules.ensemble, EnsembleConfigSpec::default());
    }

    #[test]
    fn document_overrides_one_kind() {
        let mut spec = DetectorConfigSpec::default();
        spec.trend.window = 24;
        let doc = RuleDocument::DetectorConfig(DetectorConfigRule::builtin(spec));
        let rules = AnalysisRules::from_documents([&doc]).unwrap();
        assert_eq!(rules.detectors.trend.window, 24);
        assert_eq!(rules.ensemble, EnsembleConfigSpec::default());
    }

    #[test]
    fn disabled_document_is_ignored() {
        let mut spec = DetectorConfigSpec::default();
        spec.trend.window = 24;
        let mut rule = DetectorConfigRule::builtin(spec);
        rule.metadata.enabled = false;
        let doc = RuleDocument::DetectorConfig(rule);
        let rules = AnalysisRules::from_documents([&doc]).unwrap();
        assert_eq!(rules.detectors.trend.window, 12);
    }

    #[test]
    fn two_enabled_documents_of_one_kind_conflict() {
        let a = RuleDocument::EnsembleConfig(EnsembleConfigRule::builtin(EnsembleConfigSpec::default()));
        let mut b_rule = EnsembleConfigRule::builtin(EnsembleConfigSpec::default());
        b_rule.metadata = CommonMetadata::builtin("other-ensemble", "Other");
        let b = RuleDocument::EnsembleConfig(b_rule);
        let err = AnalysisRules::from_documents([&a, &b]).unwrap_err();
        assert!(err.to_string().contains("more than one enabled EnsembleConfig"));
    }

    #[test]
    fn invalid_document_is_rejected() {
        let mut spec = EnsembleConfigSpec::default();
        spec.weights.reconstruction = 0.9;
        let doc = RuleDocument::EnsembleConfig(EnsembleConfigRule::builtin(spec));
        assert!(matches!(
            AnalysisRules::from_documents([&doc]),
            Err(RuleError::Validation(_))
        ));
    }
}
