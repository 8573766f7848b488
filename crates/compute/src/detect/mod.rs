//! The six detectors and the registry that runs them.
//!
//! Statistical family: rolling z-score, isolation forest, seasonal.
//! Pattern family: weighted reconstruction, trend, and the family vote.

pub mod ensemble;
pub mod isolation_forest;
pub mod reconstruction;
pub mod rolling_zscore;
pub mod seasonal;
pub mod stats;
pub mod trend;

use std::sync::Arc;

use climate_core::{DetectorKind, Family, Series};
use climate_rules::detector_config::DetectorConfigSpec;
use climate_rules::ensemble_config::EnsembleConfigSpec;
use rayon::prelude::*;
use tracing::debug;

use crate::verdict::Verdict;

pub use ensemble::EnsembleDetector;
pub use isolation_forest::IsolationForestDetector;
pub use reconstruction::ReconstructionDetector;
pub use rolling_zscore::RollingZScoreDetector;
pub use seasonal::SeasonalDetector;
pub use trend::TrendDetector;

/// A pure function from a series to a verdict.
pub trait Detector: Send + Sync {
    fn kind(&self) -> DetectorKind;

    fn detect(&self, series: &Series) -> Verdict;

    /// Shortest series that yields a real verdict.
    fn min_points(&self) -> usize;

    fn family(&self) -> Family {
        self.kind().family()
    }
}

/// Every detector, built once from read-only configuration.
pub struct DetectorSuite {
    rolling_zscore: Arc<RollingZScoreDetector>,
    isolation_forest: Arc<IsolationForestDetector>,
    seasonal: Arc<SeasonalDetector>,
    reconstruction: Arc<ReconstructionDetector>,
    trend: Arc<TrendDetector>,
    ensemble: EnsembleDetector,
}

impl DetectorSuite {
    pub fn new(detectors: &DetectorConfigSpec, ensemble: &EnsembleConfigSpec) -> Self {
        let rolling_zscore = Arc::new(RollingZScoreDetector::new(detectors.rolling_zscore.clone()));
        let isolation_forest =
            Arc::new(IsolationForestDetector::new(detectors.isolation_forest.clone()));
        let seasonal = Arc::new(SeasonalDetector::new(detectors.seasonal.clone()));
        let reconstruction = Arc::new(ReconstructionDetector::new(detectors.reconstruction.clone()));
        let trend = Arc::new(TrendDetector::new(detectors.trend.clone()));

        let statistical: Vec<Arc<dyn Detector>> = vec![
            rolling_zscore.clone(),
            isolation_forest.clone(),
            seasonal.clone(),
        ];
        let ensemble = EnsembleDetector::new(
            ensemble.weights,
            reconstruction.clone(),
            trend.clone(),
            statistical,
        );

        Self {
            rolling_zscore,
            isolation_forest,
            seasonal,
            reconstruction,
            trend,
            ensemble,
        }
    }

    /// Look up a detector by kind.
    pub fn get(&self, kind: DetectorKind) -> &dyn Detector {
        match kind {
            DetectorKind::RollingZScore => self.rolling_zscore.as_ref(),
            DetectorKind::IsolationForest => self.isolation_forest.as_ref(),
            DetectorKind::Seasonal => self.seasonal.as_ref(),
            DetectorKind::Reconstruction => self.reconstruction.as_ref(),
            DetectorKind::Trend => self.trend.as_ref(),
            DetectorKind::Ensemble => &self.ensemble,
        }
    }

    /// Run the statistical family in registry order.
    pub fn run_statistical(&self, series: &Series) -> Vec<Verdict> {
        [
            DetectorKind::RollingZScore,
            DetectorKind::IsolationForest,
            DetectorKind::Seasonal,
        ]
        .par_iter()
        .map(|&kind| self.get(kind).detect(series))
        .collect()
    }

    /// Run all six detectors. The two families run concurrently; the family
    /// vote reuses the constituent verdicts instead of recomputing them.
    pub fn analyze(&self, series: &Series) -> Vec<Verdict> {
        let (statistical, (reconstruction, trend)) = rayon::join(
            || self.run_statistical(series),
            || {
                rayon::join(
                    || self.reconstruction.detect(series),
                    || self.trend.detect(series),
                )
            },
        );
        let vote = self.ensemble.combine(series.len(), &reconstruction, &trend, &statistical);

        let mut verdicts = statistical;
        verdicts.extend([reconstruction, trend, vote]);
        for v in &verdicts {
            debug!(
                method = %v.method,
                score = v.score,
                anomaly = v.is_anomaly,
                insufficient = v.insufficient_data,
                "detector verdict"
            );
        }
        verdicts
    }
}
