use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Methodology group a detector belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// Pointwise deviation from distributional baselines.
    Statistical,
    /// Shape, trend, and reconstruction based.
    Pattern,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Statistical => write!(f, "statistical"),
            Family::Pattern => write!(f, "pattern"),
        }
    }
}

/// The closed set of detection methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    #[serde(rename = "rolling_zscore")]
    RollingZScore,
    IsolationForest,
    Seasonal,
    Reconstruction,
    Trend,
    Ensemble,
}

impl DetectorKind {
    /// Registry order: statistical family first, family vote last.
    pub const ALL: [DetectorKind; 6] = [
        DetectorKind::RollingZScore,
        DetectorKind::IsolationForest,
        DetectorKind::Seasonal,
        DetectorKind::Reconstruction,
        DetectorKind::Trend,
        DetectorKind::Ensemble,
    ];

    pub fn family(&self) -> Family {
        match self {
            DetectorKind::RollingZScore | DetectorKind::IsolationForest | DetectorKind::Seasonal => {
                Family::Statistical
            }
            DetectorKind::Reconstruction | DetectorKind::Trend | DetectorKind::Ensemble => {
                Family::Pattern
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DetectorKind::RollingZScore => "rolling_zscore",
            DetectorKind::IsolationForest => "isolation_forest",
            DetectorKind::Seasonal => "seasonal",
            DetectorKind::Reconstruction => "reconstruction",
            DetectorKind::Trend => "trend",
            DetectorKind::Ensemble => "ensemble",
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DetectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DetectorKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| format!("unknown detector: '{}'", s))
    }
}
