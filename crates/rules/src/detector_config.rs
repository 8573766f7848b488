//! DetectorConfig kind: windows, thresholds and sizes for the five scoring
//! detectors. The family vote is configured by `EnsembleConfig`.

use serde::{Deserialize, Serialize};

use crate::schema::{CommonMetadata, API_VERSION};

/// Embedded built-in document.
pub const BUILTIN_YAML: &str = include_str!("../../../data/config/detectors.yml");

// ── YAML-level types ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DetectorConfigRule {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    pub spec: DetectorConfigSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DetectorConfigSpec {
    pub rolling_zscore: RollingZScoreParams,
    pub isolation_forest: IsolationForestParams,
    pub seasonal: SeasonalParams,
    pub reconstruction: ReconstructionParams,
    pub trend: TrendParams,
}

/// Windowed mean/deviation detector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RollingZScoreParams {
    /// Trailing window length in samples.
    pub window: usize,
    /// |z| at which the score reaches 0.5.
    pub threshold: f64,
    /// Lower bound for the window standard deviation.
    pub std_floor: f64,
}

impl Default for RollingZScoreParams {
    fn default() -> Self {
        Self {
            window: 10,
            threshold: 3.0,
            std_floor: 0.05,
        }
    }
}

/// Random-partition isolation ensemble.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct IsolationForestParams {
    pub estimators: usize,
    /// Subsample size per tree, capped at the series length.
    pub sample_size: usize,
    pub seed: u64,
    /// Series score above which the verdict is anomalous.
    pub threshold: f64,
    /// Percentile of per-point scores reported as the series score.
    pub percentile: f64,
    /// Fewer points than this yields an insufficient-data verdict.
    pub min_points: usize,
    /// Below this many points the score is damped proportionally.
    pub full_confidence_points: usize,
}

impl Default for IsolationForestParams {
    fn default() -> Self {
        Self {
            estimators: 100,
            sample_size: 64,
            seed: 42,
            threshold: 0.6,
            percentile: 0.95,
            min_points: 3,
            full_confidence_points: 16,
        }
    }
}

/// Cyclic decomposition detector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SeasonalParams {
    /// Cycle length in samples (24 = daily cycle at hourly sampling).
    pub period: usize,
    /// Complete cycles of history required before the recent points.
    pub min_cycles: usize,
    /// Trailing points evaluated against the decomposition.
    pub recent_points: usize,
    pub residual_percentile: f64,
    pub threshold_multiplier: f64,
    /// Lower bound for the residual threshold.
    pub residual_floor: f64,
}

impl Default for SeasonalParams {
    fn default() -> Self {
        Self {
            period: 24,
            min_cycles: 2,
            recent_points: 1,
            residual_percentile: 0.95,
            threshold_multiplier: 1.5,
            residual_floor: 0.1,
        }
    }
}

/// Recency-weighted reconstruction detector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReconstructionParams {
    /// Context length feeding each reconstruction.
    pub window: usize,
    /// Most recent points evaluated.
    pub horizon: usize,
    /// Normalized error at which the score reaches 0.5.
    pub threshold: f64,
    pub std_floor: f64,
}

impl Default for ReconstructionParams {
    fn default() -> Self {
        Self {
            window: 8,
            horizon: 24,
            threshold: 3.0,
            std_floor: 0.05,
        }
    }
}

/// Slope and acceleration detector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TrendParams {
    /// Recent sub-window used for slope and differences.
    pub window: usize,
    /// |slope| per sample below which the trend is `stable`.
    pub stable_slope: f64,
    /// Scaled acceleration at which the score reaches 0.5.
    pub threshold: f64,
    /// Lower bound for the median step size.
    pub scale_floor: f64,
}

impl Default for TrendParams {
    fn default() -> Self {
        Self {
            window: 12,
            stable_slope: 0.1,
            threshold: 8.0,
            scale_floor: 0.05,
        }
    }
}

// ── Compiled ────────────────────────────────────────────────────────

/// The spec is already typed; compiling is a clone.
pub type CompiledDetectorConfig = DetectorConfigSpec;

impl DetectorConfigRule {
    pub fn compile(&self) -> CompiledDetectorConfig {
        self.spec.clone()
    }

    /// Wrap a spec in a built-in document.
    pub fn builtin(spec: DetectorConfigSpec) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: "DetectorConfig".to_string(),
            metadata: CommonMetadata::builtin("default-detectors", "Default detector parameters"),
            spec,
        }
    }
}
