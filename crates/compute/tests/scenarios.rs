//! End-to-end scenarios over the default configuration.

use chrono::{TimeZone, Utc};
use climate_compute::{
    AnalysisEngine, Assessment, ConsensusResult, SafetyFlag, SensorSeries, Severity, Verdict,
};
use climate_core::{DetectorKind, Quantity, Series};

fn engine() -> AnalysisEngine {
    AnalysisEngine::with_defaults().unwrap()
}

fn series(values: &[f64]) -> Series {
    let t0 = Utc.with_ymd_and_hms(2025, 7, 14, 8, 0, 0).unwrap();
    Series::from_values(t0, 300, values).unwrap()
}

fn spiked() -> Vec<f64> {
    let mut values: Vec<f64> = (0..30).map(|i| 22.0 + 0.3 * (i as f64 * 0.7).sin()).collect();
    values[15] = 35.0;
    values
}

fn verdict_of(verdicts: &[Verdict], kind: DetectorKind) -> &Verdict {
    verdicts.iter().find(|v| v.method == kind).unwrap()
}

#[test]
fn spike_is_flagged_by_both_families() {
    let engine = engine();
    let verdicts = engine.analyze(&series(&spiked()));

    let rolling = verdict_of(&verdicts, DetectorKind::RollingZScore);
    assert!(rolling.is_anomaly);
    assert!(rolling.score > 0.5);
    assert_eq!(rolling.aux_f64("max_index"), Some(15.0));

    let vote = verdict_of(&verdicts, DetectorKind::Ensemble);
    assert!(vote.is_anomaly, "{}", vote.explanation);

    let consensus = engine.compare(rolling, vote).unwrap();
    assert!(consensus.models_agree);
    assert!(consensus.consensus_is_anomaly);
}

#[test]
fn short_flat_series_is_insufficient_for_rolling_window() {
    let verdicts = engine().analyze(&series(&[22.0; 5]));
    let rolling = verdict_of(&verdicts, DetectorKind::RollingZScore);
    assert!(rolling.insufficient_data);
    assert!(!rolling.is_anomaly);
    assert_eq!(rolling.score, 0.0);
}

#[test]
fn overheated_server_room_targets_nominal() {
    let assessment = Assessment::Verdict(Verdict::new(
        DetectorKind::RollingZScore,
        0.85,
        true,
        "temperature spike",
    ));
    let rec = engine().synthesize(&assessment, Quantity::Temperature, 28.5, "server_room");
    assert_eq!(rec.target_value, 22.0);
    assert!(matches!(rec.severity, Severity::High | Severity::Critical));
    assert!(rec.priority >= 4);
}

#[test]
fn condensation_overrides_step_function() {
    let quiet = Assessment::Consensus(ConsensusResult {
        models_agree: true,
        consensus_is_anomaly: false,
        agreement_score: 0.9,
        statistical_score: 0.1,
        pattern_score: 0.2,
        statistical_method: DetectorKind::RollingZScore,
        pattern_method: DetectorKind::Ensemble,
        inconclusive: false,
    });
    let rec = engine().synthesize(&quiet, Quantity::Humidity, 82.5, "data_center");
    assert_eq!(rec.severity, Severity::Critical);
    assert_eq!(rec.priority, 5);
    assert!(rec.safety_flags.contains(&SafetyFlag::CondensationRisk));
    assert!(rec.target_value >= 40.0 && rec.target_value <= 60.0);
}

#[test]
fn confident_no_anomaly_keeps_current_value() {
    let assessment = Assessment::Consensus(ConsensusResult {
        models_agree: true,
        consensus_is_anomaly: false,
        agreement_score: 1.0,
        statistical_score: 0.05,
        pattern_score: 0.05,
        statistical_method: DetectorKind::RollingZScore,
        pattern_method: DetectorKind::Ensemble,
        inconclusive: false,
    });
    let rec = engine().synthesize(&assessment, Quantity::Temperature, 21.4, "server_room");
    assert_eq!(rec.severity, Severity::Low);
    assert_eq!(rec.priority, 1);
    assert_eq!(rec.target_value, 21.4);
    assert_eq!(rec.confidence, 1.0);
}

#[test]
fn spike_report_recommends_on_latest_reading() {
    let engine = engine();
    let input = SensorSeries {
        sensor_id: "rack-7-temp".to_string(),
        quantity: Quantity::Temperature,
        room_type: Some("server_room".to_string()),
        ambient_temperature: None,
        series: series(&spiked()),
    };
    let report = engine.report(&input).unwrap();
    assert!(report.consensus.consensus_is_anomaly);

    // The spike is history; the latest reading is back inside the range.
    let rec = &report.recommendation;
    assert!(rec.is_anomaly);
    assert_eq!(rec.severity, Severity::Low);
    assert_eq!(rec.target_value, 22.0);
    assert_eq!(rec.confidence, report.consensus.agreement_score);
}

#[test]
fn batch_orders_sensors_by_urgency() {
    let engine = engine();
    let t0 = Utc.with_ymd_and_hms(2025, 7, 14, 8, 0, 0).unwrap();
    let hot: Vec<f64> = (0..30).map(|i| if i < 29 { 22.0 } else { 31.0 }).collect();
    let inputs = vec![
        SensorSeries {
            sensor_id: "calm".to_string(),
            quantity: Quantity::Temperature,
            room_type: Some("office".to_string()),
            ambient_temperature: None,
            series: Series::from_values(t0, 300, &[22.0; 30]).unwrap(),
        },
        SensorSeries {
            sensor_id: "hot".to_string(),
            quantity: Quantity::Temperature,
            room_type: Some("server_room".to_string()),
            ambient_temperature: None,
            series: Series::from_values(t0, 300, &hot).unwrap(),
        },
    ];
    let reports: Vec<_> = engine
        .report_all(&inputs)
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();
    let requests: Vec<_> = reports
        .iter()
        .map(|r| climate_compute::SynthesisRequest {
            sensor_id: Some(r.sensor_id.clone()),
            assessment: Assessment::Consensus(r.consensus.clone()),
            quantity: r.quantity,
            current_value: r.recommendation.current_value,
            room_type: r.room_type.clone(),
            ambient_temperature: None,
        })
        .collect();
    let recs = engine.synthesizer().synthesize_batch(&requests);
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].sensor_id.as_deref(), Some("hot"));
    assert_eq!(recs[0].severity, Severity::Critical);
}
