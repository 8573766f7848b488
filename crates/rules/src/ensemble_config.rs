//! EnsembleConfig kind: family vote weights and the consensus weighting
//! between score similarity and verdict agreement.

use climate_core::DetectorKind;
use serde::{Deserialize, Serialize};

use crate::schema::{CommonMetadata, API_VERSION};

pub const BUILTIN_YAML: &str = include_str!("../../../data/config/ensemble.yml");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EnsembleConfigRule {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    pub spec: EnsembleConfigSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EnsembleConfigSpec {
    pub weights: VoteWeights,
    pub consensus: ConsensusParams,
}

/// Weights of the family vote. Must sum to 1; renormalized at vote time
/// over the inputs that had enough data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VoteWeights {
    pub reconstruction: f64,
    pub trend: f64,
    /// Weight of the statistical family's mean score.
    pub statistical: f64,
}

impl VoteWeights {
    pub fn total(&self) -> f64 {
        self.reconstruction + self.trend + self.statistical
    }
}

impl Default for VoteWeights {
    fn default() -> Self {
        Self {
            reconstruction: 0.4,
            trend: 0.3,
            statistical: 0.3,
        }
    }
}

/// Two-family consensus weighting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConsensusParams {
    /// Weight of `1 - |s_stat - s_pat|`.
    pub score_weight: f64,
    /// Weight of the boolean agreement term.
    pub agreement_weight: f64,
    /// Agreement reported when neither family had enough data.
    pub inconclusive_agreement: f64,
    /// Statistical verdict compared against the family vote.
    pub statistical_representative: DetectorKind,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            score_weight: 0.5,
            agreement_weight: 0.5,
            inconclusive_agreement: 0.5,
            statistical_representative: DetectorKind::RollingZScore,
        }
    }
}

pub type CompiledEnsembleConfig = EnsembleConfigSpec;

impl EnsembleConfigRule {
    pub fn compile(&self) -> CompiledEnsembleConfig {
        self.spec.clone()
    }

    pub fn builtin(spec: EnsembleConfigSpec) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: "EnsembleConfig".to_string(),
            metadata: CommonMetadata::builtin("default-ensemble", "Default ensemble weights"),
            spec,
        }
    }
}
