//! Weighted reconstruction: each point is rebuilt from the `window` points
//! before it with linear recency weights, position `k` (oldest = 0) getting
//! `(k + 1) / sum(1..=window)`. The reconstruction error is normalized by the
//! weighted spread of that context around the reconstruction.

use climate_core::{DetectorKind, Series};
use climate_rules::detector_config::ReconstructionParams;

use super::stats::{round4, saturate};
use super::Detector;
use crate::verdict::Verdict;

pub struct ReconstructionDetector {
    params: ReconstructionParams,
    weights: Vec<f64>,
}

/// Reconstruction of one point from its context.
#[derive(Debug, Clone, Copy)]
struct Step {
    index: usize,
    reconstructed: f64,
    error: f64,
    normalized: f64,
}

impl ReconstructionDetector {
    pub fn new(params: ReconstructionParams) -> Self {
        let w = params.window.max(1);
        let total = (w * (w + 1) / 2) as f64;
        let weights = (0..w).map(|k| (k + 1) as f64 / total).collect();
        Self { params, weights }
    }

    /// Recency weights, oldest first; they sum to 1.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    fn weighted(&self, context: &[f64]) -> f64 {
        context.iter().zip(&self.weights).map(|(x, w)| x * w).sum()
    }

    fn step(&self, values: &[f64], index: usize) -> Step {
        let context = &values[index - self.weights.len()..index];
        let reconstructed = self.weighted(context);
        let spread = context
            .iter()
            .zip(&self.weights)
            .map(|(x, w)| w * (x - reconstructed).powi(2))
            .sum::<f64>()
            .sqrt()
            .max(self.params.std_floor);
        let error = (values[index] - reconstructed).abs();
        Step {
            index,
            reconstructed,
            error,
            normalized: error / spread,
        }
    }
}

impl Detector for ReconstructionDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Reconstruction
    }

    fn min_points(&self) -> usize {
        self.weights.len() + 1
    }

    fn detect(&self, series: &Series) -> Verdict {
        let values = series.values();
        let n = values.len();
        let w = self.weights.len();
        if n < self.min_points() {
            return Verdict::insufficient(self.kind(), self.min_points(), n);
        }

        let start = w.max(n.saturating_sub(self.params.horizon.max(1)));
        let steps: Vec<Step> = (start..n).map(|i| self.step(values, i)).collect();
        let worst = steps
            .iter()
            .copied()
            .fold(steps[0], |best, s| if s.normalized > best.normalized { s } else { best });
        let anomaly_indices: Vec<usize> = steps
            .iter()
            .filter(|s| s.normalized > self.params.threshold)
            .map(|s| s.index)
            .collect();

        let score = saturate(worst.normalized, self.params.threshold);
        let is_anomaly = score > 0.5;
        let predicted = self.weighted(&values[n - w..]);
        let explanation = if is_anomaly {
            format!(
                "reading {:.2} at index {} is {:.1}x the context spread away from its reconstruction {:.2}",
                values[worst.index], worst.index, worst.normalized, worst.reconstructed
            )
        } else {
            format!(
                "last {} readings reconstruct within {:.1}x the context spread",
                steps.len(),
                self.params.threshold
            )
        };

        Verdict::new(self.kind(), score, is_anomaly, explanation)
            .with_aux("reconstruction_error", round4(worst.error))
            .with_aux("normalized_error", round4(worst.normalized))
            .with_aux("max_index", worst.index)
            .with_aux("predicted_value", round4(predicted))
            .with_aux("latest_weight", round4(self.weights[w - 1]))
            .with_aux("anomaly_indices", anomaly_indices)
            .with_aux("evaluated_points", steps.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn series(values: &[f64]) -> Series {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        Series::from_values(t0, 600, values).unwrap()
    }

    fn detector() -> ReconstructionDetector {
        ReconstructionDetector::new(ReconstructionParams::default())
    }

    #[test]
    fn weights_favor_recent_points() {
        let d = detector();
        let w = d.weights();
        assert_eq!(w.len(), 8);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(w.windows(2).all(|p| p[1] > p[0]));
        assert!((w[7] - 8.0 / 36.0).abs() < 1e-12);
    }

    #[test]
    fn spike_breaks_reconstruction() {
        let mut values: Vec<f64> = (0..30).map(|i| 22.0 + 0.3 * (i as f64 * 0.7).sin()).collect();
        values[15] = 35.0;
        let v = detector().detect(&series(&values));
        assert!(v.is_anomaly);
        assert_eq!(v.aux_f64("max_index"), Some(15.0));
        assert!(v.aux_f64("reconstruction_error").unwrap() > 12.0);
    }

    #[test]
    fn linear_ramp_reconstructs_within_threshold() {
        let values: Vec<f64> = (0..40).map(|i| 18.0 + 0.1 * i as f64).collect();
        let v = detector().detect(&series(&values));
        assert!(!v.is_anomaly, "{}", v.explanation);
    }

    #[test]
    fn only_recent_horizon_is_evaluated() {
        let mut values: Vec<f64> = vec![22.0; 60];
        values[5] = 40.0;
        let v = detector().detect(&series(&values));
        assert_eq!(v.aux_f64("evaluated_points"), Some(24.0));
        assert!(!v.is_anomaly);
    }

    #[test]
    fn needs_context_plus_one() {
        let v = detector().detect(&series(&[22.0; 8]));
        assert!(v.insufficient_data);
    }
}
