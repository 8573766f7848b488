//! Rolling z-score: each point against the mean and deviation of the
//! `window` points before it.

use climate_core::{DetectorKind, Series};
use climate_rules::detector_config::RollingZScoreParams;

use super::stats::{mean, round4, saturate, std_dev};
use super::Detector;
use crate::verdict::Verdict;

pub struct RollingZScoreDetector {
    params: RollingZScoreParams,
}

impl RollingZScoreDetector {
    pub fn new(params: RollingZScoreParams) -> Self {
        Self { params }
    }
}

impl Detector for RollingZScoreDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::RollingZScore
    }

    fn min_points(&self) -> usize {
        self.params.window + 1
    }

    fn detect(&self, series: &Series) -> Verdict {
        let values = series.values();
        let w = self.params.window;
        if values.len() < self.min_points() {
            return Verdict::insufficient(self.kind(), self.min_points(), values.len());
        }

        let mut max_abs_z = 0.0;
        let mut max_index = w;
        let mut max_z = 0.0;
        let mut at_max = (0.0, 0.0);
        let mut anomaly_indices = Vec::new();

        for i in w..values.len() {
            let window = &values[i - w..i];
            let m = mean(window);
            let s = std_dev(window).max(self.params.std_floor);
            let z = (values[i] - m) / s;
            if z.abs() > self.params.threshold {
                anomaly_indices.push(i);
            }
            if z.abs() > max_abs_z {
                max_abs_z = z.abs();
                max_index = i;
                max_z = z;
                at_max = (m, s);
            }
        }

        let score = saturate(max_abs_z, self.params.threshold);
        let is_anomaly = score > 0.5;
        let (rolling_mean, rolling_std) = at_max;
        let explanation = if is_anomaly {
            format!(
                "value {:.2} at index {} deviates {:.1} standard deviations from its {}-point rolling mean {:.2}",
                values[max_index], max_index, max_z, w, rolling_mean
            )
        } else {
            format!(
                "all points within {:.1} standard deviations of their rolling mean (max {:.2})",
                self.params.threshold, max_abs_z
            )
        };

        Verdict::new(self.kind(), score, is_anomaly, explanation)
            .with_aux("max_z", round4(max_z))
            .with_aux("max_index", max_index)
            .with_aux("deviation", round4(values[max_index] - rolling_mean))
            .with_aux("rolling_mean", round4(rolling_mean))
            .with_aux("rolling_std", round4(rolling_std))
            .with_aux("anomaly_indices", anomaly_indices)
            .with_aux("window", w)
    }
}
