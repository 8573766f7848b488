//! Trend analysis over the most recent `window` points: fitted slope gives
//! the direction, second differences give acceleration, and a last step
//! against the trend counts as a reversal. Both are measured in units of the
//! series' typical step size.

use climate_core::{DetectorKind, Series};
use climate_rules::detector_config::TrendParams;
use serde::{Deserialize, Serialize};

use super::stats::{diff, linear_fit, median, round4, saturate};
use super::Detector;
use crate::verdict::Verdict;

const MIN_POINTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    fn from_slope(slope: f64, stable: f64) -> Self {
        if slope > stable {
            TrendDirection::Up
        } else if slope < -stable {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Stable => "stable",
        }
    }
}

pub struct TrendDetector {
    params: TrendParams,
}

impl TrendDetector {
    pub fn new(params: TrendParams) -> Self {
        Self { params }
    }
}

impl Detector for TrendDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Trend
    }

    fn min_points(&self) -> usize {
        MIN_POINTS
    }

    fn detect(&self, series: &Series) -> Verdict {
        let values = series.values();
        let n = values.len();
        if n < MIN_POINTS {
            return Verdict::insufficient(self.kind(), MIN_POINTS, n);
        }

        let tail = &values[n - self.params.window.clamp(MIN_POINTS, n)..];
        let (slope, _) = linear_fit(tail);
        let direction = TrendDirection::from_slope(slope, self.params.stable_slope);

        let d1 = diff(tail);
        let d2 = diff(&d1);
        let abs_steps: Vec<f64> = diff(values).iter().map(|d| d.abs()).collect();
        let scale = median(&abs_steps).max(self.params.scale_floor);

        let last_step = d1[d1.len() - 1];
        let acceleration = d2[d2.len() - 1];
        let max_accel = d2.iter().fold(0.0f64, |m, d| m.max(d.abs()));
        let reversed = direction != TrendDirection::Stable && last_step * slope < 0.0;
        let reversal = if reversed { last_step.abs() } else { 0.0 };

        let statistic = max_accel.max(reversal) / scale;
        let score = saturate(statistic, self.params.threshold);
        let is_anomaly = score > 0.5;

        let explanation = if reversed && is_anomaly {
            format!(
                "{} trend ({:+.3}/step) reversed by a step of {:+.2}, {:.1}x the typical step",
                direction.as_str(),
                slope,
                last_step,
                statistic
            )
        } else if is_anomaly {
            format!(
                "abrupt change in rate: acceleration {:.2} is {:.1}x the typical step",
                max_accel, statistic
            )
        } else {
            format!(
                "{} trend ({:+.3}/step) with no abrupt change over the last {} points",
                direction.as_str(),
                slope,
                tail.len()
            )
        };

        Verdict::new(self.kind(), score, is_anomaly, explanation)
            .with_aux("trend_direction", direction.as_str())
            .with_aux("slope", round4(slope))
            .with_aux("rate_of_change", round4(last_step))
            .with_aux("acceleration", round4(acceleration))
            .with_aux("max_acceleration", round4(max_accel))
            .with_aux("reversal", reversed)
            .with_aux("typical_step", round4(scale))
    }
}
