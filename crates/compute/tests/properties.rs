//! Property tests over the default configuration.

use chrono::{TimeZone, Utc};
use climate_compute::{
    AnalysisEngine, Assessment, ConsensusEngine, DetectorSuite, Severity, Verdict,
};
use climate_core::{DetectorKind, Quantity, Series};
use climate_rules::ensemble_config::ConsensusParams;
use climate_rules::AnalysisRules;
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

fn suite() -> DetectorSuite {
    let rules = AnalysisRules::builtin().unwrap();
    DetectorSuite::new(&rules.detectors, &rules.ensemble)
}

fn series(values: &[f64]) -> Series {
    let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    Series::from_values(t0, 900, values).unwrap()
}

fn readings() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-40.0f64..120.0, 0..72)
}

fn threshold(kind: DetectorKind) -> f64 {
    match kind {
        DetectorKind::IsolationForest => AnalysisRules::builtin()
            .unwrap()
            .detectors
            .isolation_forest
            .threshold,
        _ => 0.5,
    }
}

fn any_kind() -> impl Strategy<Value = DetectorKind> {
    prop::sample::select(DetectorKind::ALL.to_vec())
}

fn any_verdict() -> impl Strategy<Value = Verdict> {
    (any_kind(), 0.0f64..=1.0, any::<bool>())
        .prop_map(|(kind, score, anomaly)| Verdict::new(kind, score, anomaly, "generated"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn scores_are_bounded_and_match_thresholds(values in readings()) {
        for v in suite().analyze(&series(&values)) {
            prop_assert!((0.0..=1.0).contains(&v.score), "{} score {}", v.method, v.score);
            if v.insufficient_data {
                prop_assert!(!v.is_anomaly);
                prop_assert_eq!(v.score, 0.0);
            } else {
                prop_assert_eq!(v.is_anomaly, v.score > threshold(v.method), "{}", v.method);
            }
        }
    }

    #[test]
    fn analysis_is_deterministic(values in readings()) {
        let suite = suite();
        let s = series(&values);
        prop_assert_eq!(suite.analyze(&s), suite.analyze(&s));
    }
}

proptest! {
    #[test]
    fn consensus_is_symmetric_and_conservative(a in any_verdict(), b in any_verdict()) {
        let engine = ConsensusEngine::new(ConsensusParams::default());
        match (engine.compare(&a, &b), engine.compare(&b, &a)) {
            (Ok(ab), Ok(ba)) => {
                prop_assert_eq!(ab.agreement_score, ba.agreement_score);
                prop_assert!((0.0..=1.0).contains(&ab.agreement_score));
                if ab.consensus_is_anomaly {
                    prop_assert!(a.is_anomaly && b.is_anomaly);
                }
            }
            (Err(_), Err(_)) => prop_assert_eq!(a.family, b.family),
            _ => prop_assert!(false, "compare is not order-independent"),
        }
    }

    #[test]
    fn target_stays_inside_safe_range(
        room_index in 0usize..5,
        quantity in prop::sample::select(Quantity::ALL.to_vec()),
        current in -100.0f64..3000.0,
        score in 0.0f64..=1.0,
        anomaly in any::<bool>(),
        ambient in prop::option::of(5.0f64..40.0),
    ) {
        let engine = AnalysisEngine::with_defaults().unwrap();
        let rooms = engine.rules().rooms.clone();
        let room = rooms.room_names()[room_index % rooms.rooms.len()].to_string();
        let assessment = Assessment::Verdict(Verdict::new(
            DetectorKind::RollingZScore,
            score,
            anomaly,
            "generated",
        ));
        let rec = engine.synthesizer().synthesize_with_ambient(
            &assessment,
            quantity,
            current,
            &room,
            ambient,
        );
        if let Some(range) = rooms.get(&room).and_then(|p| p.range(quantity)) {
            prop_assert!(range.contains(rec.target_value), "{} {} -> {}", room, quantity, rec.target_value);
        } else {
            prop_assert_eq!(rec.target_value, current);
        }
        prop_assert!(rec.time_to_target_minutes >= 0.0);
        prop_assert_eq!(rec.priority, rec.severity.priority());
    }

    #[test]
    fn priority_never_drops_with_severity(
        a in prop::sample::select(vec![Severity::Low, Severity::Medium, Severity::High, Severity::Critical]),
        b in prop::sample::select(vec![Severity::Low, Severity::Medium, Severity::High, Severity::Critical]),
    ) {
        if a <= b {
            prop_assert!(a.priority() <= b.priority());
        }
        prop_assert!((1..=5).contains(&a.priority()));
    }
}
