//! RecommendationConfig kind: severity grading, correction rates and the
//! dew-point constants used by the safety checks.

use std::collections::BTreeMap;

use climate_core::Quantity;
use serde::{Deserialize, Serialize};

use crate::schema::CommonMetadata;

pub const BUILTIN_YAML: &str = include_str!("../../../data/config/recommendation.yml");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RecommendationConfigRule {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    pub spec: RecommendationConfigSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RecommendationConfigSpec {
    pub severity: SeverityParams,
    /// Achievable correction rate per hour, in the quantity's unit.
    pub rates_per_hour: BTreeMap<Quantity, f64>,
    pub dew_point: DewPointParams,
}

impl RecommendationConfigSpec {
    pub fn rate(&self, quantity: Quantity) -> Option<f64> {
        self.rates_per_hour.get(&quantity).copied()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SeverityParams {
    /// Excess (in half-widths) up to which an anomaly is `medium`; beyond is `high`.
    pub medium_ratio: f64,
    /// Confidence above which a range-less anomaly is `high`.
    pub generic_high_confidence: f64,
    /// Confidence above which a range-less anomaly is `medium`.
    pub generic_medium_confidence: f64,
}

/// Magnus formula coefficients and the required dew-point margin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DewPointParams {
    /// Minimum gap (°C) between ambient temperature and dew point.
    pub min_margin: f64,
    pub magnus_b: f64,
    pub magnus_c: f64,
}

pub type CompiledRecommendationConfig = RecommendationConfigSpec;

impl RecommendationConfigRule {
    pub fn compile(&self) -> CompiledRecommendationConfig {
        self.spec.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin() -> RecommendationConfigSpec {
        serde_yaml::from_str::<RecommendationConfigRule>(BUILTIN_YAML)
            .unwrap()
            .compile()
    }

    #[test]
    fn every_quantity_has_a_rate() {
        let spec = builtin();
        for q in Quantity::ALL {
            assert!(spec.rate(q).unwrap() > 0.0, "{q}");
        }
        assert_eq!(spec.rate(Quantity::Temperature), Some(2.0));
    }

    #[test]
    fn generic_confidence_thresholds_ascend() {
        let s = builtin().severity;
        assert!(s.generic_medium_confidence < s.generic_high_confidence);
        assert_eq!(s.medium_ratio, 0.5);
    }

    #[test]
    fn magnus_constants() {
        let d = builtin().dew_point;
        assert_eq!((d.magnus_b, d.magnus_c, d.min_margin), (17.62, 243.12, 2.0));
    }
}
