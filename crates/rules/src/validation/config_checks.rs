//! Per-kind checks for configuration documents.

use climate_core::{DetectorKind, Family, Quantity};

use super::fuzzy::{fuzzy_match, is_kebab_case};
use super::ValidationResult;

use crate::detector_config::DetectorConfigSpec;
use crate::ensemble_config::EnsembleConfigSpec;
use crate::recommendation_config::RecommendationConfigSpec;
use crate::room_profiles::{QuantityRange, RoomProfilesSpec};
use crate::schema::{CommonMetadata, RuleKind, API_VERSION};

/// Upper bound for any window, period or horizon, in samples.
pub const MAX_WINDOW: usize = 10_000;
/// Upper bound for the isolation forest size.
pub const MAX_ESTIMATORS: usize = 10_000;

const WEIGHT_TOLERANCE: f64 = 1e-3;

// ── Header ──────────────────────────────────────────────────────────

pub fn validate_header(
    api_version: &str,
    kind: &str,
    expected: RuleKind,
    metadata: &CommonMetadata,
    result: &mut ValidationResult,
) {
    if api_version != API_VERSION {
        result.error(
            "apiVersion",
            format!("apiVersion must be '{}', got '{}'", API_VERSION, api_version),
        );
    }
    if kind != expected.as_str() {
        result.error(
            "kind",
            format!("kind must be '{}', got '{}'", expected, kind),
        );
    }
    if !is_kebab_case(&metadata.id) {
        result.error(
            "metadata.id",
            format!(
                "id must be kebab-case (lowercase alphanumeric + hyphens), got '{}'",
                metadata.id
            ),
        );
    }
}

fn check_window(path: &str, value: usize, min: usize, result: &mut ValidationResult) {
    if value < min || value > MAX_WINDOW {
        result.error(
            path,
            format!("must be between {} and {}, got {}", min, MAX_WINDOW, value),
        );
    }
}

fn check_positive(path: &str, value: f64, result: &mut ValidationResult) {
    if !value.is_finite() || value <= 0.0 {
        result.error(path, format!("must be a positive number, got {}", value));
    }
}

fn check_unit_interval(path: &str, value: f64, result: &mut ValidationResult) {
    if !(0.0..=1.0).contains(&value) {
        result.error(path, format!("must lie in [0, 1], got {}", value));
    }
}

// ── DetectorConfig ──────────────────────────────────────────────────

pub fn check_detector_spec(spec: &DetectorConfigSpec, result: &mut ValidationResult) {
    let z = &spec.rolling_zscore;
    check_window("spec.rolling_zscore.window", z.window, 2, result);
    check_positive("spec.rolling_zscore.threshold", z.threshold, result);
    check_positive("spec.rolling_zscore.std_floor", z.std_floor, result);

    let f = &spec.isolation_forest;
    if f.estimators == 0 || f.estimators > MAX_ESTIMATORS {
        result.error(
            "spec.isolation_forest.estimators",
            format!("must be between 1 and {}, got {}", MAX_ESTIMATORS, f.estimators),
        );
    }
    check_window("spec.isolation_forest.sample_size", f.sample_size, 2, result);
    if !(f.threshold > 0.0 && f.threshold < 1.0) {
        result.error(
            "spec.isolation_forest.threshold",
            format!("must lie in (0, 1), got {}", f.threshold),
        );
    }
    if !(f.percentile > 0.0 && f.percentile <= 1.0) {
        result.error(
            "spec.isolation_forest.percentile",
            format!("must lie in (0, 1], got {}", f.percentile),
        );
    }
    if f.min_points < 2 {
        result.error(
            "spec.isolation_forest.min_points",
            format!("must be at least 2, got {}", f.min_points),
        );
    }
    if f.full_confidence_points < f.min_points {
        result.error(
            "spec.isolation_forest.full_confidence_points",
            format!(
                "must not be below min_points ({}), got {}",
                f.min_points, f.full_confidence_points
            ),
        );
    }
    if f.sample_size > 1024 {
        result.warn(
            "spec.isolation_forest.sample_size",
            format!("large subsample ({}) makes every tree slower to build", f.sample_size),
        );
    }

    let s = &spec.seasonal;
    check_window("spec.seasonal.period", s.period, 2, result);
    if s.min_cycles == 0 {
        result.error("spec.seasonal.min_cycles", "must be at least 1");
    }
    check_window("spec.seasonal.recent_points", s.recent_points, 1, result);
    if s.recent_points >= s.period {
        result.warn(
            "spec.seasonal.recent_points",
            format!(
                "evaluating {} recent points spans a whole period of {}",
                s.recent_points, s.period
            ),
        );
    }
    if !(s.residual_percentile > 0.0 && s.residual_percentile <= 1.0) {
        result.error(
            "spec.seasonal.residual_percentile",
            format!("must lie in (0, 1], got {}", s.residual_percentile),
        );
    }
    check_positive("spec.seasonal.threshold_multiplier", s.threshold_multiplier, result);
    check_positive("spec.seasonal.residual_floor", s.residual_floor, result);

    let r = &spec.reconstruction;
    check_window("spec.reconstruction.window", r.window, 1, result);
    check_window("spec.reconstruction.horizon", r.horizon, 1, result);
    check_positive("spec.reconstruction.threshold", r.threshold, result);
    check_positive("spec.reconstruction.std_floor", r.std_floor, result);

    let t = &spec.trend;
    check_window("spec.trend.window", t.window, 4, result);
    if !t.stable_slope.is_finite() || t.stable_slope < 0.0 {
        result.error(
            "spec.trend.stable_slope",
            format!("must be a non-negative number, got {}", t.stable_slope),
        );
    }
    check_positive("spec.trend.threshold", t.threshold, result);
    check_positive("spec.trend.scale_floor", t.scale_floor, result);
}

// ── EnsembleConfig ──────────────────────────────────────────────────

pub fn check_ensemble_spec(spec: &EnsembleConfigSpec, result: &mut ValidationResult) {
    let w = &spec.weights;
    for (name, value) in [
        ("reconstruction", w.reconstruction),
        ("trend", w.trend),
        ("statistical", w.statistical),
    ] {
        let path = format!("spec.weights.{}", name);
        if !value.is_finite() || value < 0.0 {
            result.error(path, format!("must be a non-negative number, got {}", value));
        } else if value == 0.0 {
            result.warn(path, "zero weight: this input never influences the vote");
        }
    }
    if (w.total() - 1.0).abs() > WEIGHT_TOLERANCE {
        result.error(
            "spec.weights",
            format!("vote weights must sum to 1.0, got {:.3}", w.total()),
        );
    }

    let c = &spec.consensus;
    check_unit_interval("spec.consensus.score_weight", c.score_weight, result);
    check_unit_interval("spec.consensus.agreement_weight", c.agreement_weight, result);
    if (c.score_weight + c.agreement_weight - 1.0).abs() > WEIGHT_TOLERANCE {
        result.error(
            "spec.consensus",
            format!(
                "score_weight + agreement_weight must equal 1.0, got {:.3}",
                c.score_weight + c.agreement_weight
            ),
        );
    }
    check_unit_interval(
        "spec.consensus.inconclusive_agreement",
        c.inconclusive_agreement,
        result,
    );
    if c.statistical_representative.family() != Family::Statistical {
        result.error_with_suggestion(
            "spec.consensus.statistical_representative",
            format!(
                "'{}' belongs to the {} family",
                c.statistical_representative,
                c.statistical_representative.family()
            ),
            DetectorKind::RollingZScore.name(),
        );
    }
}

// ── RoomProfiles ────────────────────────────────────────────────────

pub fn check_room_profiles_spec(spec: &RoomProfilesSpec, result: &mut ValidationResult) {
    if spec.rooms.is_empty() {
        result.error("spec.rooms", "at least one room profile is required");
        return;
    }
    if spec.default_profile().is_none() {
        let names = spec.room_names();
        let msg = format!("default_room '{}' is not a defined room", spec.default_room);
        match fuzzy_match(&spec.default_room, &names) {
            Some(s) => result.error_with_suggestion("spec.default_room", msg, s),
            None => result.error("spec.default_room", msg),
        }
    }

    for (room, profile) in &spec.rooms {
        if profile.ranges.is_empty() {
            result.warn(
                format!("spec.rooms.{}", room),
                "no quantity ranges: every recommendation will be generic",
            );
        }
        if profile.range(Quantity::Temperature).is_none() {
            result.warn(
                format!("spec.rooms.{}.ranges", room),
                "no temperature range: dew-point checks need an explicit ambient temperature",
            );
        }
        for (quantity, range) in &profile.ranges {
            check_range(&format!("spec.rooms.{}.ranges.{}", room, quantity), *quantity, range, result);
        }
    }
}

fn check_range(path: &str, quantity: Quantity, range: &QuantityRange, result: &mut ValidationResult) {
    let values = [
        Some(range.min),
        Some(range.max),
        Some(range.target),
        range.critical_low,
        range.critical_high,
    ];
    if values.iter().flatten().any(|v| !v.is_finite()) {
        result.error(path, "all limits must be finite numbers");
        return;
    }
    if range.min >= range.max {
        result.error(
            path,
            format!("min ({}) must be below max ({})", range.min, range.max),
        );
    }
    if !range.contains(range.target) {
        result.error(
            format!("{}.target", path),
            format!(
                "target {} lies outside [{}, {}]",
                range.target, range.min, range.max
            ),
        );
    }
    if let Some(low) = range.critical_low {
        if low > range.min {
            result.error(
                format!("{}.critical_low", path),
                format!("critical_low ({}) must not exceed min ({})", low, range.min),
            );
        }
    }
    if let Some(high) = range.critical_high {
        if high < range.max {
            result.error(
                format!("{}.critical_high", path),
                format!("critical_high ({}) must not be below max ({})", high, range.max),
            );
        }
    }
    if quantity == Quantity::Humidity
        && values.iter().flatten().any(|v| !(0.0..=100.0).contains(v))
    {
        result.error(path, "relative humidity limits must lie in [0, 100]");
    }
}

// ── RecommendationConfig ────────────────────────────────────────────

pub fn check_recommendation_spec(spec: &RecommendationConfigSpec, result: &mut ValidationResult) {
    let s = &spec.severity;
    check_positive("spec.severity.medium_ratio", s.medium_ratio, result);
    check_unit_interval(
        "spec.severity.generic_high_confidence",
        s.generic_high_confidence,
        result,
    );
    check_unit_interval(
        "spec.severity.generic_medium_confidence",
        s.generic_medium_confidence,
        result,
    );
    if s.generic_medium_confidence > s.generic_high_confidence {
        result.error(
            "spec.severity",
            format!(
                "thresholds must be ascending: generic_medium_confidence({}) <= generic_high_confidence({})",
                s.generic_medium_confidence, s.generic_high_confidence
            ),
        );
    }

    for (quantity, rate) in &spec.rates_per_hour {
        check_positive(&format!("spec.rates_per_hour.{}", quantity), *rate, result);
    }
    for quantity in Quantity::ALL {
        if spec.rate(quantity).is_none() {
            result.warn(
                "spec.rates_per_hour",
                format!("no rate for {}: time to target will be reported as 0", quantity),
            );
        }
    }

    let d = &spec.dew_point;
    if !d.min_margin.is_finite() || d.min_margin < 0.0 {
        result.error(
            "spec.dew_point.min_margin",
            format!("must be a non-negative number, got {}", d.min_margin),
        );
    }
    check_positive("spec.dew_point.magnus_b", d.magnus_b, result);
    check_positive("spec.dew_point.magnus_c", d.magnus_c, result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector_config::DetectorConfigSpec;
    use crate::ensemble_config::EnsembleConfigSpec;
    use crate::recommendation_config::RecommendationConfigRule;
    use crate::room_profiles::RoomProfilesRule;
    use crate::{recommendation_config, room_profiles};

    fn rooms() -> RoomProfilesSpec {
        serde_yaml::from_str::<RoomProfilesRule>(room_profiles::BUILTIN_YAML)
            .unwrap()
            .spec
    }

    fn recommendation() -> RecommendationConfigSpec {
        serde_yaml::from_str::<RecommendationConfigRule>(recommendation_config::BUILTIN_YAML)
            .unwrap()
            .spec
    }

    #[test]
    fn defaults_pass() {
        let mut result = ValidationResult::new();
        check_detector_spec(&DetectorConfigSpec::default(), &mut result);
        check_ensemble_spec(&EnsembleConfigSpec::default(), &mut result);
        check_room_profiles_spec(&rooms(), &mut result);
        check_recommendation_spec(&recommendation(), &mut result);
        assert!(result.valid, "{}", result.error_summary());
    }

    #[test]
    fn vote_weights_must_sum_to_one() {
        let mut spec = EnsembleConfigSpec::default();
        spec.weights.trend = 0.5;
        let mut result = ValidationResult::new();
        check_ensemble_spec(&spec, &mut result);
        assert!(!result.valid);
        assert_eq!(result.errors[0].path, "spec.weights");
    }

    #[test]
    fn pattern_representative_rejected() {
        let mut spec = EnsembleConfigSpec::default();
        spec.consensus.statistical_representative = DetectorKind::Trend;
        let mut result = ValidationResult::new();
        check_ensemble_spec(&spec, &mut result);
        assert!(!result.valid);
        assert_eq!(result.errors[0].suggestion.as_deref(), Some("rolling_zscore"));
    }

    #[test]
    fn oversized_window_rejected() {
        let mut spec = DetectorConfigSpec::default();
        spec.rolling_zscore.window = MAX_WINDOW + 1;
        spec.trend.window = 3;
        let mut result = ValidationResult::new();
        check_detector_spec(&spec, &mut result);
        let paths: Vec<_> = result.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["spec.rolling_zscore.window", "spec.trend.window"]);
    }

    #[test]
    fn full_confidence_below_min_points_rejected() {
        let mut spec = DetectorConfigSpec::default();
        spec.isolation_forest.full_confidence_points = 2;
        let mut result = ValidationResult::new();
        check_detector_spec(&spec, &mut result);
        assert!(!result.valid);
    }

    #[test]
    fn target_outside_range_rejected() {
        let mut spec = rooms();
        let office = spec.rooms.get_mut("office").unwrap();
        office
            .ranges
            .get_mut(&Quantity::Temperature)
            .unwrap()
            .target = 30.0;
        let mut result = ValidationResult::new();
        check_room_profiles_spec(&spec, &mut result);
        assert!(!result.valid);
        assert_eq!(result.errors[0].path, "spec.rooms.office.ranges.temperature.target");
    }

    #[test]
    fn inverted_range_rejected() {
        let mut spec = rooms();
        let lab = spec.rooms.get_mut("laboratory").unwrap();
        let humidity = lab.ranges.get_mut(&Quantity::Humidity).unwrap();
        humidity.min = 70.0;
        let mut result = ValidationResult::new();
        check_room_profiles_spec(&spec, &mut result);
        assert!(result
            .errors
            .iter()
            .any(|e| e.message.contains("must be below max")));
    }

    #[test]
    fn unknown_default_room_suggests_closest() {
        let mut spec = rooms();
        spec.default_room = "ofice".to_string();
        let mut result = ValidationResult::new();
        check_room_profiles_spec(&spec, &mut result);
        assert_eq!(result.errors[0].suggestion.as_deref(), Some("office"));
    }

    #[test]
    fn missing_rate_warns() {
        let mut spec = recommendation();
        spec.rates_per_hour.remove(&Quantity::Light);
        let mut result = ValidationResult::new();
        check_recommendation_spec(&spec, &mut result);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn header_checks() {
        let meta = CommonMetadata::builtin("Bad_Id", "bad");
        let mut result = ValidationResult::new();
        validate_header("v2", "RoomProfiles", RuleKind::DetectorConfig, &meta, &mut result);
        assert_eq!(result.errors.len(), 3);
    }
}
