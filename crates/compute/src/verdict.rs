use std::collections::BTreeMap;

use climate_core::{DetectorKind, Family};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One detector's judgement on one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub method: DetectorKind,
    pub family: Family,
    pub is_anomaly: bool,
    /// Anomaly score in `[0, 1]`.
    pub score: f64,
    pub explanation: String,
    /// The detector could not compute its statistic on this series.
    pub insufficient_data: bool,
    /// Method-specific diagnostics.
    pub auxiliary: BTreeMap<String, Value>,
}

impl Verdict {
    pub fn new(
        method: DetectorKind,
        score: f64,
        is_anomaly: bool,
        explanation: impl Into<String>,
    ) -> Self {
        debug_assert!(
            (0.0..=1.0).contains(&score),
            "{} produced out-of-range score {}",
            method,
            score
        );
        Self {
            method,
            family: method.family(),
            is_anomaly,
            score: score.clamp(0.0, 1.0),
            explanation: explanation.into(),
            insufficient_data: false,
            auxiliary: BTreeMap::new(),
        }
    }

    /// Non-anomalous, zero-score verdict for a series too short to analyze.
    pub fn insufficient(method: DetectorKind, required: usize, available: usize) -> Self {
        let mut verdict = Self::new(
            method,
            0.0,
            false,
            format!(
                "insufficient data: {} needs at least {} points, got {}",
                method, required, available
            ),
        )
        .with_aux("required_points", required)
        .with_aux("available_points", available);
        verdict.insufficient_data = true;
        verdict
    }

    pub fn with_aux(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.auxiliary.insert(key.to_string(), value.into());
        self
    }

    pub fn aux(&self, key: &str) -> Option<&Value> {
        self.auxiliary.get(key)
    }

    pub fn aux_f64(&self, key: &str) -> Option<f64> {
        self.auxiliary.get(key).and_then(Value::as_f64)
    }

    pub fn aux_bool(&self, key: &str) -> Option<bool> {
        self.auxiliary.get(key).and_then(Value::as_bool)
    }

    pub fn aux_str(&self, key: &str) -> Option<&str> {
        self.auxiliary.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_follows_method() {
        let v = Verdict::new(DetectorKind::Trend, 0.2, false, "flat");
        assert_eq!(v.family, Family::Pattern);
        let v = Verdict::new(DetectorKind::Seasonal, 0.2, false, "flat");
        assert_eq!(v.family, Family::Statistical);
    }

    #[test]
    fn insufficient_is_zero_and_quiet() {
        let v = Verdict::insufficient(DetectorKind::RollingZScore, 11, 5);
        assert!(v.insufficient_data);
        assert!(!v.is_anomaly);
        assert_eq!(v.score, 0.0);
        assert_eq!(v.aux_f64("required_points"), Some(11.0));
        assert!(v.explanation.contains("at least 11"));
    }

    #[test]
    fn auxiliary_accessors() {
        let v = Verdict::new(DetectorKind::Trend, 0.1, false, "")
            .with_aux("trend_direction", "up")
            .with_aux("reversal", false)
            .with_aux("slope", 0.25);
        assert_eq!(v.aux_str("trend_direction"), Some("up"));
        assert_eq!(v.aux_bool("reversal"), Some(false));
        assert_eq!(v.aux_f64("slope"), Some(0.25));
    }

    #[test]
    fn serializes_method_tags() {
        let v = Verdict::new(DetectorKind::IsolationForest, 0.4, false, "ok");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["method"], "isolation_forest");
        assert_eq!(json["family"], "statistical");
    }
}
