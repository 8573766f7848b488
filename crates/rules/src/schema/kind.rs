//! Document kind enum for two-pass deserialization dispatch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleKind {
    DetectorConfig,
    EnsembleConfig,
    RoomProfiles,
    RecommendationConfig,
}

impl RuleKind {
    pub const ALL: [RuleKind; 4] = [
        RuleKind::DetectorConfig,
        RuleKind::EnsembleConfig,
        RuleKind::RoomProfiles,
        RuleKind::RecommendationConfig,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::DetectorConfig => "DetectorConfig",
            RuleKind::EnsembleConfig => "EnsembleConfig",
            RuleKind::RoomProfiles => "RoomProfiles",
            RuleKind::RecommendationConfig => "RecommendationConfig",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        RuleKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown document kind: '{}'", s))
    }
}
