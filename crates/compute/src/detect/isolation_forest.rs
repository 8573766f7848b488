//! Isolation forest over scalar readings.
//!
//! Each tree isolates a random subsample with random cut points; points
//! that need few cuts to isolate are anomalous. The per-point score is
//! `2^(-E[h(x)] / c(psi))`. The series score is a high percentile of the
//! per-point scores rather than their maximum, so one noisy reading cannot
//! carry the series on its own.

use climate_core::{DetectorKind, Series};
use climate_rules::detector_config::IsolationForestParams;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::stats::{percentile, round4};
use super::Detector;
use crate::verdict::Verdict;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

enum Node {
    Internal {
        split: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    External {
        size: usize,
    },
}

/// Average path length of an unsuccessful BST search over `n` points.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

fn build(points: &[f64], depth: usize, limit: usize, rng: &mut StdRng) -> Node {
    if depth >= limit || points.len() <= 1 {
        return Node::External { size: points.len() };
    }
    let (lo, hi) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
    if lo >= hi {
        return Node::External { size: points.len() };
    }

    // Interpolate instead of drawing over `hi - lo`, which overflows for
    // readings near the f64 limits.
    let u: f64 = rng.random();
    let split = lo * (1.0 - u) + hi * u;
    if !split.is_finite() {
        return Node::External { size: points.len() };
    }
    let (left, right): (Vec<f64>, Vec<f64>) = points.iter().copied().partition(|&x| x < split);
    Node::Internal {
        split,
        left: Box::new(build(&left, depth + 1, limit, rng)),
        right: Box::new(build(&right, depth + 1, limit, rng)),
    }
}

fn path_length(node: &Node, x: f64, depth: usize) -> f64 {
    match node {
        Node::External { size } => depth as f64 + average_path_length(*size),
        Node::Internal { split, left, right } => {
            if x < *split {
                path_length(left, x, depth + 1)
            } else {
                path_length(right, x, depth + 1)
            }
        }
    }
}

pub struct IsolationForestDetector {
    params: IsolationForestParams,
}

impl IsolationForestDetector {
    pub fn new(params: IsolationForestParams) -> Self {
        Self { params }
    }

    /// Grow the forest. One seeded generator drives every tree, so the
    /// same series always yields the same forest.
    fn grow(&self, values: &[f64], sample_size: usize) -> Vec<Node> {
        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let limit = (sample_size as f64).log2().ceil().max(1.0) as usize;
        (0..self.params.estimators)
            .map(|_| {
                let sample: Vec<f64> = rand::seq::index::sample(&mut rng, values.len(), sample_size)
                    .into_iter()
                    .map(|i| values[i])
                    .collect();
                build(&sample, 0, limit, &mut rng)
            })
            .collect()
    }

    /// Per-point anomaly scores in `[0, 1]`.
    pub fn point_scores(&self, values: &[f64]) -> Vec<f64> {
        let sample_size = self.params.sample_size.min(values.len());
        if sample_size < 2 {
            return vec![0.0; values.len()];
        }
        let forest = self.grow(values, sample_size);
        let c = average_path_length(sample_size);
        values
            .par_iter()
            .map(|&x| {
                let mean_path =
                    forest.iter().map(|t| path_length(t, x, 0)).sum::<f64>() / forest.len() as f64;
                2f64.powf(-mean_path / c).clamp(0.0, 1.0)
            })
            .collect()
    }
}

impl Detector for IsolationForestDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::IsolationForest
    }

    fn min_points(&self) -> usize {
        self.params.min_points
    }

    fn detect(&self, series: &Series) -> Verdict {
        let values = series.values();
        let n = values.len();
        if n < self.min_points() || self.params.estimators == 0 {
            return Verdict::insufficient(self.kind(), self.min_points(), n);
        }

        let scores = self.point_scores(values);
        let (most_isolated, max_point_score) = scores
            .iter()
            .copied()
            .enumerate()
            .fold((0, 0.0), |best, (i, s)| if s > best.1 { (i, s) } else { best });

        let raw = percentile(&scores, self.params.percentile);
        let low_confidence = n < self.params.full_confidence_points;
        let score = if low_confidence {
            raw * n as f64 / self.params.full_confidence_points as f64
        } else {
            raw
        };
        let is_anomaly = score > self.params.threshold;

        let explanation = if is_anomaly {
            format!(
                "reading {:.2} at index {} isolates quickly (score {:.2}, threshold {:.2})",
                values[most_isolated], most_isolated, score, self.params.threshold
            )
        } else {
            format!(
                "no reading isolates unusually fast (score {:.2}, threshold {:.2})",
                score, self.params.threshold
            )
        };

        Verdict::new(self.kind(), score, is_anomaly, explanation)
            .with_aux("max_point_score", round4(max_point_score))
            .with_aux("most_isolated_index", most_isolated)
            .with_aux("latest_point_score", round4(scores[n - 1]))
            .with_aux("percentile", self.params.percentile)
            .with_aux("trees", self.params.estimators)
            .with_aux("sample_size", self.params.sample_size.min(n))
            .with_aux("low_confidence", low_confidence)
    }
}
