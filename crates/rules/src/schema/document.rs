//! Multi-kind document container and accessors.

use super::{CommonMetadata, RuleKind};
use crate::detector_config::DetectorConfigRule;
use crate::ensemble_config::EnsembleConfigRule;
use crate::recommendation_config::RecommendationConfigRule;
use crate::room_profiles::RoomProfilesRule;

/// A fully deserialized document of any supported kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleDocument {
    /// Detector parameters: windows, thresholds, forest size, seed.
    DetectorConfig(DetectorConfigRule),
    /// Family vote weights and consensus weighting.
    EnsembleConfig(EnsembleConfigRule),
    /// Safe ranges, nominal targets and critical limits per room type.
    RoomProfiles(RoomProfilesRule),
    /// Severity ratios, correction rates and dew-point constants.
    RecommendationConfig(RecommendationConfigRule),
}

impl RuleDocument {
    pub fn metadata(&self) -> &CommonMetadata {
        match self {
            RuleDocument::DetectorConfig(doc) => &doc.metadata,
            RuleDocument::EnsembleConfig(doc) => &doc.metadata,
            RuleDocument::RoomProfiles(doc) => &doc.metadata,
            RuleDocument::RecommendationConfig(doc) => &doc.metadata,
        }
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            RuleDocument::DetectorConfig(_) => RuleKind::DetectorConfig,
            RuleDocument::EnsembleConfig(_) => RuleKind::EnsembleConfig,
            RuleDocument::RoomProfiles(_) => RuleKind::RoomProfiles,
            RuleDocument::RecommendationConfig(_) => RuleKind::RecommendationConfig,
        }
    }

    pub fn as_detector_config(&self) -> Option<&DetectorConfigRule> {
        match self {
            RuleDocument::DetectorConfig(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_ensemble_config(&self) -> Option<&EnsembleConfigRule> {
        match self {
            RuleDocument::EnsembleConfig(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_room_profiles(&self) -> Option<&RoomProfilesRule> {
        match self {
            RuleDocument::RoomProfiles(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_recommendation_config(&self) -> Option<&RecommendationConfigRule> {
        match self {
            RuleDocument::RecommendationConfig(doc) => Some(doc),
            _ => None,
        }
    }

    /// Serialize to JSON; the inner types carry `apiVersion` and `kind`.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            RuleDocument::DetectorConfig(d) => serde_json::to_value(d),
            RuleDocument::EnsembleConfig(d) => serde_json::to_value(d),
            RuleDocument::RoomProfiles(d) => serde_json::to_value(d),
            RuleDocument::RecommendationConfig(d) => serde_json::to_value(d),
        }
    }

    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        match self {
            RuleDocument::DetectorConfig(d) => serde_yaml::to_string(d),
            RuleDocument::EnsembleConfig(d) => serde_yaml::to_string(d),
            RuleDocument::RoomProfiles(d) => serde_yaml::to_string(d),
            RuleDocument::RecommendationConfig(d) => serde_yaml::to_string(d),
        }
    }
}
