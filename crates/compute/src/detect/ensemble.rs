//! Family vote: the pattern family's representative verdict.
//!
//! Combines the reconstruction score, the trend score and the mean score of
//! the statistical detectors that had enough data. Weights are renormalized
//! over the inputs actually present.

use std::sync::Arc;

use climate_core::{DetectorKind, Series};
use climate_rules::ensemble_config::VoteWeights;
use rayon::prelude::*;
use serde_json::json;

use super::stats::{mean, round4};
use super::{Detector, ReconstructionDetector, TrendDetector};
use crate::verdict::Verdict;

pub struct EnsembleDetector {
    weights: VoteWeights,
    reconstruction: Arc<ReconstructionDetector>,
    trend: Arc<TrendDetector>,
    statistical: Vec<Arc<dyn Detector>>,
}

#[derive(Debug, Clone, Copy)]
struct VoteInput {
    name: &'static str,
    weight: f64,
    score: f64,
    is_anomaly: bool,
}

impl EnsembleDetector {
    pub fn new(
        weights: VoteWeights,
        reconstruction: Arc<ReconstructionDetector>,
        trend: Arc<TrendDetector>,
        statistical: Vec<Arc<dyn Detector>>,
    ) -> Self {
        Self {
            weights,
            reconstruction,
            trend,
            statistical,
        }
    }

    /// Vote over constituent verdicts that were already computed for a
    /// series of `len` points.
    pub fn combine(
        &self,
        len: usize,
        reconstruction: &Verdict,
        trend: &Verdict,
        statistical: &[Verdict],
    ) -> Verdict {
        let mut inputs = Vec::with_capacity(3);
        if !reconstruction.insufficient_data {
            inputs.push(VoteInput {
                name: "reconstruction",
                weight: self.weights.reconstruction,
                score: reconstruction.score,
                is_anomaly: reconstruction.is_anomaly,
            });
        }
        if !trend.insufficient_data {
            inputs.push(VoteInput {
                name: "trend",
                weight: self.weights.trend,
                score: trend.score,
                is_anomaly: trend.is_anomaly,
            });
        }
        let stat_scores: Vec<f64> = statistical
            .iter()
            .filter(|v| !v.insufficient_data)
            .map(|v| v.score)
            .collect();
        if !stat_scores.is_empty() {
            let aggregate = mean(&stat_scores);
            inputs.push(VoteInput {
                name: "statistical",
                weight: self.weights.statistical,
                score: aggregate,
                is_anomaly: aggregate > 0.5,
            });
        }

        let total_weight: f64 = inputs.iter().map(|i| i.weight).sum();
        if inputs.is_empty() || total_weight <= 0.0 {
            return Verdict::insufficient(self.kind(), self.min_points(), len);
        }

        let vote = (inputs.iter().map(|i| i.weight * i.score).sum::<f64>() / total_weight)
            .clamp(0.0, 1.0);
        let is_anomaly = vote > 0.5;
        let models_agree = inputs.iter().all(|i| i.is_anomaly == inputs[0].is_anomaly);

        let flagged: Vec<&str> = inputs.iter().filter(|i| i.is_anomaly).map(|i| i.name).collect();
        let explanation = if is_anomaly {
            format!(
                "family vote {:.2} over {} inputs; anomalous: {}",
                vote,
                inputs.len(),
                flagged.join(", ")
            )
        } else {
            format!("family vote {:.2} over {} inputs", vote, inputs.len())
        };

        let mut scores = serde_json::Map::new();
        let mut weights_used = serde_json::Map::new();
        for input in &inputs {
            scores.insert(input.name.to_string(), json!(round4(input.score)));
            weights_used.insert(input.name.to_string(), json!(round4(input.weight / total_weight)));
        }

        Verdict::new(self.kind(), vote, is_anomaly, explanation)
            .with_aux("vote", round4(vote))
            .with_aux("models_agree", models_agree)
            .with_aux("input_scores", scores)
            .with_aux("weights_used", weights_used)
            .with_aux("statistical_inputs", stat_scores.len())
    }
}

impl Detector for EnsembleDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Ensemble
    }

    /// Shortest series on which at least one constituent has data.
    fn min_points(&self) -> usize {
        self.statistical
            .iter()
            .map(|d| d.min_points())
            .chain([self.reconstruction.min_points(), self.trend.min_points()])
            .min()
            .unwrap_or(0)
    }

    fn detect(&self, series: &Series) -> Verdict {
        let ((reconstruction, trend), statistical) = rayon::join(
            || {
                rayon::join(
                    || self.reconstruction.detect(series),
                    || self.trend.detect(series),
                )
            },
            || {
                self.statistical
                    .par_iter()
                    .map(|d| d.detect(series))
                    .collect::<Vec<_>>()
            },
        );
        self.combine(series.len(), &reconstruction, &trend, &statistical)
    }
}
