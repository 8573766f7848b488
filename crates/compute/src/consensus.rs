//! Cross-family consensus between one statistical and one pattern verdict.
//!
//! `agreement = w_s * (1 - |s_stat - s_pat|) + w_a * [flags equal]`. The
//! boolean term makes this a two-party measure; it does not extend
//! associatively to more families.

use climate_core::{DetectorKind, Family};
use climate_rules::ensemble_config::ConsensusParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::verdict::Verdict;

#[derive(Debug, Error, PartialEq)]
pub enum ConsensusError {
    #[error("both verdicts belong to the {family} family; consensus needs one per family")]
    ConflictingFamilyInputs { family: Family },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub models_agree: bool,
    pub consensus_is_anomaly: bool,
    /// In `[0, 1]`.
    pub agreement_score: f64,
    pub statistical_score: f64,
    pub pattern_score: f64,
    pub statistical_method: DetectorKind,
    pub pattern_method: DetectorKind,
    /// Neither family had enough data.
    pub inconclusive: bool,
}

pub struct ConsensusEngine {
    params: ConsensusParams,
}

impl ConsensusEngine {
    pub fn new(params: ConsensusParams) -> Self {
        Self { params }
    }

    /// Compare two verdicts from different families, in either order.
    pub fn compare(&self, a: &Verdict, b: &Verdict) -> Result<ConsensusResult, ConsensusError> {
        let (statistical, pattern) = match (a.family, b.family) {
            (Family::Statistical, Family::Pattern) => (a, b),
            (Family::Pattern, Family::Statistical) => (b, a),
            (family, _) => return Err(ConsensusError::ConflictingFamilyInputs { family }),
        };

        let inconclusive = statistical.insufficient_data && pattern.insufficient_data;
        let models_agree = statistical.is_anomaly == pattern.is_anomaly;
        let (agreement_score, consensus_is_anomaly) = if inconclusive {
            (self.params.inconclusive_agreement, false)
        } else {
            let similarity = 1.0 - (statistical.score - pattern.score).abs();
            let flag_term = if models_agree { 1.0 } else { 0.0 };
            let agreement = self.params.score_weight * similarity
                + self.params.agreement_weight * flag_term;
            (
                agreement.clamp(0.0, 1.0),
                statistical.is_anomaly && pattern.is_anomaly,
            )
        };

        debug!(
            statistical = %statistical.method,
            pattern = %pattern.method,
            agreement = agreement_score,
            anomaly = consensus_is_anomaly,
            inconclusive,
            "consensus"
        );

        Ok(ConsensusResult {
            models_agree,
            consensus_is_anomaly,
            agreement_score,
            statistical_score: statistical.score,
            pattern_score: pattern.score,
            statistical_method: statistical.method,
            pattern_method: pattern.method,
            inconclusive,
        })
    }
}

/// Agreement statistics over a history of consensus results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsensusSummary {
    pub total: usize,
    pub agreements: usize,
    /// `agreements / total`, 0 when empty.
    pub agreement_rate: f64,
    pub anomalies: usize,
    pub inconclusive: usize,
    pub mean_agreement_score: f64,
}

impl ConsensusSummary {
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a ConsensusResult>) -> Self {
        let mut summary = Self::default();
        let mut score_sum = 0.0;
        for r in results {
            summary.total += 1;
            summary.agreements += usize::from(r.models_agree);
            summary.anomalies += usize::from(r.consensus_is_anomaly);
            summary.inconclusive += usize::from(r.inconclusive);
            score_sum += r.agreement_score;
        }
        if summary.total > 0 {
            summary.agreement_rate = summary.agreements as f64 / summary.total as f64;
            summary.mean_agreement_score = score_sum / summary.total as f64;
        }
        summary
    }
}
