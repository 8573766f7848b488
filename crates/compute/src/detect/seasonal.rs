//! Seasonal decomposition: linear baseline plus a per-phase cyclic mean,
//! fitted on history and extrapolated onto the most recent points.

use climate_core::{DetectorKind, Series};
use climate_rules::detector_config::SeasonalParams;

use super::stats::{linear_fit, mean, percentile, round4, saturate};
use super::Detector;
use crate::verdict::Verdict;

const BACKFIT_ROUNDS: usize = 3;

pub struct SeasonalDetector {
    params: SeasonalParams,
}

/// Baseline and cyclic component fitted on the history.
struct Decomposition {
    slope: f64,
    intercept: f64,
    /// Zero-mean cyclic offset per phase.
    phase_offsets: Vec<f64>,
}

impl Decomposition {
    /// Alternate between phase means and the linear baseline so a partial
    /// final cycle does not leak the cycle into the slope.
    fn fit(history: &[f64], period: usize) -> Self {
        let mut model = Self {
            slope: 0.0,
            intercept: mean(history),
            phase_offsets: vec![0.0; period],
        };
        for _ in 0..BACKFIT_ROUNDS {
            let mut sums = vec![0.0; period];
            let mut counts = vec![0usize; period];
            for (i, x) in history.iter().enumerate() {
                sums[i % period] += x - (model.intercept + model.slope * i as f64);
                counts[i % period] += 1;
            }
            let raw: Vec<f64> = sums
                .iter()
                .zip(&counts)
                .map(|(s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
                .collect();
            let center = mean(&raw);
            model.phase_offsets = raw.iter().map(|o| o - center).collect();

            let deseasonalized: Vec<f64> = history
                .iter()
                .enumerate()
                .map(|(i, x)| x - model.phase_offsets[i % period])
                .collect();
            (model.slope, model.intercept) = linear_fit(&deseasonalized);
        }
        model
    }

    fn expected(&self, index: usize) -> f64 {
        let period = self.phase_offsets.len();
        self.intercept + self.slope * index as f64 + self.phase_offsets[index % period]
    }
}

impl SeasonalDetector {
    pub fn new(params: SeasonalParams) -> Self {
        Self { params }
    }
}

impl Detector for SeasonalDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Seasonal
    }

    fn min_points(&self) -> usize {
        self.params.min_cycles * self.params.period + self.params.recent_points
    }

    fn detect(&self, series: &Series) -> Verdict {
        let values = series.values();
        let n = values.len();
        let p = &self.params;
        if n < self.min_points() || p.period == 0 {
            return Verdict::insufficient(self.kind(), self.min_points(), n);
        }

        let split = n - p.recent_points;
        let model = Decomposition::fit(&values[..split], p.period);

        let historical: Vec<f64> = (0..split)
            .map(|i| (values[i] - model.expected(i)).abs())
            .collect();
        let threshold = (percentile(&historical, p.residual_percentile) * p.threshold_multiplier)
            .max(p.residual_floor);

        let (worst, worst_residual) = (split..n)
            .map(|i| (i, values[i] - model.expected(i)))
            .fold((split, 0.0f64), |best, cur| {
                if cur.1.abs() > best.1.abs() {
                    cur
                } else {
                    best
                }
            });

        let score = saturate(worst_residual.abs(), threshold);
        let is_anomaly = score > 0.5;
        let expected = model.expected(worst);
        let phase = worst % p.period;
        let explanation = if is_anomaly {
            format!(
                "reading {:.2} at phase {} departs {:+.2} from the seasonal expectation {:.2} (threshold {:.2})",
                values[worst], phase, worst_residual, expected, threshold
            )
        } else {
            format!(
                "recent readings follow the {}-sample cycle (largest residual {:.2}, threshold {:.2})",
                p.period,
                worst_residual.abs(),
                threshold
            )
        };

        Verdict::new(self.kind(), score, is_anomaly, explanation)
            .with_aux("expected_value", round4(expected))
            .with_aux("residual", round4(worst_residual))
            .with_aux("residual_threshold", round4(threshold))
            .with_aux("phase", phase)
            .with_aux("period", p.period)
            .with_aux("cycles", split / p.period)
            .with_aux("trend_slope", round4(model.slope))
    }
}
