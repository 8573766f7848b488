//! Recommendation synthesis: from an assessment, a quantity, the current
//! value and a room profile to a structured corrective action.

pub mod safety;
pub mod text;

use std::fmt;

use climate_core::Quantity;
use climate_rules::recommendation_config::RecommendationConfigSpec;
use climate_rules::room_profiles::{QuantityRange, RoomProfile, RoomProfilesSpec};
use climate_rules::validation::fuzzy::fuzzy_match;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::consensus::ConsensusResult;
use crate::verdict::Verdict;

pub use safety::SafetyFlag;
pub use text::format_duration;

/// What the synthesizer is told about the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Assessment {
    Consensus(ConsensusResult),
    Verdict(Verdict),
}

impl Assessment {
    pub fn is_anomaly(&self) -> bool {
        match self {
            Assessment::Consensus(c) => c.consensus_is_anomaly,
            Assessment::Verdict(v) => v.is_anomaly,
        }
    }

    /// Consensus agreement score, or the single verdict's score.
    pub fn confidence(&self) -> f64 {
        match self {
            Assessment::Consensus(c) => c.agreement_score,
            Assessment::Verdict(v) => v.score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 4,
            Severity::Critical => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a recommendation after operator actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    #[default]
    Pending,
    Confirmed,
    Rejected,
    Modified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_id: Option<String>,
    pub quantity: Quantity,
    /// Room profile actually used, after fallback.
    pub room_type: String,
    pub current_value: f64,
    pub problem_description: String,
    pub recommended_action: String,
    pub target_value: f64,
    pub reasoning: String,
    pub confidence: f64,
    pub severity: Severity,
    pub priority: u8,
    pub time_to_target_minutes: f64,
    pub time_to_target: String,
    pub safety_flags: Vec<SafetyFlag>,
    pub is_anomaly: bool,
    /// Temperature assumed for the dew-point check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambient_temperature: Option<f64>,
    #[serde(default)]
    pub status: RecommendationStatus,
}

/// One item of a batch synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    #[serde(default)]
    pub sensor_id: Option<String>,
    pub assessment: Assessment,
    pub quantity: Quantity,
    pub current_value: f64,
    pub room_type: String,
    #[serde(default)]
    pub ambient_temperature: Option<f64>,
}

pub struct Synthesizer {
    rooms: RoomProfilesSpec,
    config: RecommendationConfigSpec,
}

impl Synthesizer {
    pub fn new(rooms: RoomProfilesSpec, config: RecommendationConfigSpec) -> Self {
        Self { rooms, config }
    }

    pub fn synthesize(
        &self,
        assessment: &Assessment,
        quantity: Quantity,
        current_value: f64,
        room_type: &str,
    ) -> Recommendation {
        self.synthesize_with_ambient(assessment, quantity, current_value, room_type, None)
    }

    /// Like [`Synthesizer::synthesize`], with an explicit ambient temperature
    /// for the dew-point check. Defaults to the profile's nominal temperature.
    pub fn synthesize_with_ambient(
        &self,
        assessment: &Assessment,
        quantity: Quantity,
        current_value: f64,
        room_type: &str,
        ambient_temperature: Option<f64>,
    ) -> Recommendation {
        self.build(None, assessment, quantity, current_value, room_type, ambient_temperature)
    }

    pub fn synthesize_request(&self, request: &SynthesisRequest) -> Recommendation {
        self.build(
            request.sensor_id.as_deref(),
            &request.assessment,
            request.quantity,
            request.current_value,
            &request.room_type,
            request.ambient_temperature,
        )
    }

    fn build(
        &self,
        sensor_id: Option<&str>,
        assessment: &Assessment,
        quantity: Quantity,
        current_value: f64,
        room_type: &str,
        ambient_temperature: Option<f64>,
    ) -> Recommendation {
        let (room, profile) = self.resolve_room(room_type);
        let range = profile.and_then(|p| p.range(quantity));
        let ambient =
            ambient_temperature.or_else(|| profile.and_then(RoomProfile::nominal_temperature));

        let is_anomaly = assessment.is_anomaly();
        let confidence = assessment.confidence();
        let flags = safety::check(quantity, current_value, range, ambient, &self.config.dew_point);
        let active = is_anomaly || !flags.is_empty();

        let humidity_cap = match (quantity, ambient) {
            (Quantity::Humidity, Some(t)) => {
                Some(safety::max_humidity_for_margin(t, &self.config.dew_point))
            }
            _ => None,
        };
        let target_value = resolve_target(range, current_value, active, humidity_cap);
        let severity = self.severity(range, current_value, is_anomaly, confidence, &flags);
        let time_to_target_minutes = self.time_to_target(quantity, current_value, target_value);

        debug!(
            sensor = sensor_id.unwrap_or("-"),
            room = %room,
            quantity = %quantity,
            current = current_value,
            target = target_value,
            severity = %severity,
            flags = flags.len(),
            "synthesized recommendation"
        );

        Recommendation {
            sensor_id: sensor_id.map(str::to_string),
            quantity,
            problem_description: text::problem(quantity, current_value, range),
            recommended_action: text::action(
                quantity,
                current_value,
                target_value,
                range,
                active,
                sensor_id.unwrap_or(quantity.key()),
            ),
            reasoning: text::reasoning(quantity, current_value, range, &flags, confidence, is_anomaly),
            room_type: room,
            current_value,
            target_value,
            confidence,
            severity,
            priority: severity.priority(),
            time_to_target_minutes,
            time_to_target: self.render_time(quantity, time_to_target_minutes),
            safety_flags: flags,
            is_anomaly,
            ambient_temperature: ambient,
            status: RecommendationStatus::Pending,
        }
    }

    /// Synthesize many items in parallel, keep the ones that need action and
    /// order them by priority, highest first. Equal priorities keep input order.
    pub fn synthesize_batch(&self, requests: &[SynthesisRequest]) -> Vec<Recommendation> {
        let mut recs: Vec<Recommendation> = requests
            .par_iter()
            .map(|r| self.synthesize_request(r))
            .filter(|r| r.is_anomaly || !r.safety_flags.is_empty())
            .collect();
        recs.sort_by(|a, b| b.priority.cmp(&a.priority));
        recs
    }

    fn resolve_room(&self, room_type: &str) -> (String, Option<&RoomProfile>) {
        if let Some(profile) = self.rooms.get(room_type) {
            return (room_type.to_string(), Some(profile));
        }
        let names = self.rooms.room_names();
        let suggestion = fuzzy_match(room_type, &names);
        warn!(
            room_type,
            fallback = %self.rooms.default_room,
            suggestion = suggestion.unwrap_or("none"),
            "unknown room type, using default profile"
        );
        (self.rooms.default_room.clone(), self.rooms.default_profile())
    }

    pub(crate) fn severity(
        &self,
        range: Option<&QuantityRange>,
        current: f64,
        is_anomaly: bool,
        confidence: f64,
        flags: &[SafetyFlag],
    ) -> Severity {
        let params = &self.config.severity;
        if !flags.is_empty() {
            return Severity::Critical;
        }
        if !is_anomaly {
            return Severity::Low;
        }
        match range {
            None if confidence > params.generic_high_confidence => Severity::High,
            None if confidence > params.generic_medium_confidence => Severity::Medium,
            None => Severity::Low,
            Some(r) if r.contains(current) => Severity::Low,
            Some(r) if r.relative_excess(current) <= params.medium_ratio => Severity::Medium,
            Some(_) => Severity::High,
        }
    }

    /// Severity once an operator has picked the target. Out-of-range readings
    /// are graded by the correction still to make, `|current - target|`
    /// over the range half-width, instead of by their distance to the edge.
    pub(crate) fn severity_toward(
        &self,
        range: Option<&QuantityRange>,
        current: f64,
        target: f64,
        is_anomaly: bool,
        confidence: f64,
        flags: &[SafetyFlag],
    ) -> Severity {
        let Some(r) = range else {
            return self.severity(None, current, is_anomaly, confidence, flags);
        };
        if !flags.is_empty() {
            return Severity::Critical;
        }
        if !is_anomaly || r.contains(current) {
            return Severity::Low;
        }
        let half = r.half_width();
        let gap = (current - target).abs();
        let relative = if half > 0.0 { gap / half } else { gap };
        if relative <= self.config.severity.medium_ratio {
            Severity::Medium
        } else {
            Severity::High
        }
    }

    /// Minutes to close the gap at the configured correction rate. Zero when
    /// no rate is configured.
    pub(crate) fn time_to_target(&self, quantity: Quantity, current: f64, target: f64) -> f64 {
        match self.config.rate(quantity) {
            Some(rate) if rate > 0.0 => ((current - target).abs() / rate * 60.0).max(0.0),
            _ => 0.0,
        }
    }

    pub(crate) fn render_time(&self, quantity: Quantity, minutes: f64) -> String {
        match self.config.rate(quantity) {
            Some(rate) if rate > 0.0 => format_duration(minutes),
            _ => "unknown (no correction rate configured)".to_string(),
        }
    }

    pub(crate) fn range_for(&self, room_type: &str, quantity: Quantity) -> Option<&QuantityRange> {
        self.rooms
            .get(room_type)
            .or_else(|| self.rooms.default_profile())
            .and_then(|p| p.range(quantity))
    }
}

/// Active (anomalous or flagged): nominal clamped into the range, humidity
/// further capped for dew-point margin. Otherwise the current value when it
/// is safe, else nominal.
fn resolve_target(
    range: Option<&QuantityRange>,
    current: f64,
    active: bool,
    humidity_cap: Option<f64>,
) -> f64 {
    let Some(range) = range else {
        return current;
    };
    if !active && range.contains(current) {
        return current;
    }
    let nominal = range.clamp(range.target);
    match humidity_cap {
        Some(cap) if active => nominal.min(cap).max(range.min),
        _ => nominal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use climate_core::DetectorKind;
    use climate_rules::AnalysisRules;

    fn synthesizer() -> Synthesizer {
        let rules = AnalysisRules::builtin().unwrap();
        Synthesizer::new(rules.rooms, rules.recommendation)
    }

    fn anomalous(score: f64) -> Assessment {
        Assessment::Verdict(Verdict::new(DetectorKind::RollingZScore, score, true, "spike"))
    }

    fn quiet_consensus() -> Assessment {
        Assessment::Consensus(ConsensusResult {
            models_agree: true,
            consensus_is_anomaly: false,
            agreement_score: 1.0,
            statistical_score: 0.1,
            pattern_score: 0.1,
            statistical_method: DetectorKind::RollingZScore,
            pattern_method: DetectorKind::Ensemble,
            inconclusive: false,
        })
    }

    #[test]
    fn overheated_server_room() {
        let rec = synthesizer().synthesize(&anomalous(0.85), Quantity::Temperature, 28.5, "server_room");
        assert_eq!(rec.target_value, 22.0);
        assert_eq!(rec.severity, Severity::Critical);
        assert_eq!(rec.priority, 5);
        assert_eq!(rec.safety_flags, vec![SafetyFlag::OverheatRisk]);
        assert!((rec.time_to_target_minutes - 195.0).abs() < 1e-9);
        assert_eq!(rec.time_to_target, "~3 hours");
        assert_eq!(rec.confidence, 0.85);
    }

    #[test]
    fn condensation_forces_critical() {
        let rec = synthesizer().synthesize(&anomalous(0.3), Quantity::Humidity, 82.5, "data_center");
        assert_eq!(rec.severity, Severity::Critical);
        assert!(rec.safety_flags.contains(&SafetyFlag::CondensationRisk));
        assert_eq!(rec.target_value, 50.0);
    }

    #[test]
    fn quiet_consensus_keeps_current_value() {
        let rec = synthesizer().synthesize(&quiet_consensus(), Quantity::Temperature, 23.0, "office");
        assert_eq!(rec.severity, Severity::Low);
        assert_eq!(rec.priority, 1);
        assert_eq!(rec.target_value, 23.0);
        assert_eq!(rec.time_to_target_minutes, 0.0);
        assert_eq!(rec.recommended_action, "No action required");
    }

    #[test]
    fn quiet_but_out_of_range_targets_nominal() {
        let rec = synthesizer().synthesize(&quiet_consensus(), Quantity::Temperature, 26.0, "office");
        assert_eq!(rec.severity, Severity::Low);
        assert_eq!(rec.target_value, 22.5);
    }

    #[test]
    fn severity_steps_with_distance() {
        let s = synthesizer();
        // office temperature 21..25, half-width 2
        let inside = s.synthesize(&anomalous(0.9), Quantity::Temperature, 24.0, "office");
        assert_eq!(inside.severity, Severity::Low);
        let near = s.synthesize(&anomalous(0.9), Quantity::Temperature, 25.8, "office");
        assert_eq!(near.severity, Severity::Medium);
        let far = s.synthesize(&anomalous(0.9), Quantity::Temperature, 27.0, "office");
        assert_eq!(far.severity, Severity::High);
        assert_eq!(far.priority, 4);
    }

    #[test]
    fn unknown_room_falls_back_to_default() {
        let rec = synthesizer().synthesize(&anomalous(0.9), Quantity::Temperature, 27.0, "server-rom");
        assert_eq!(rec.room_type, "office");
        assert_eq!(rec.target_value, 22.5);
    }

    #[test]
    fn missing_range_uses_generic_grading() {
        // Only the office profile carries a CO2 range.
        let s = synthesizer();
        let high = s.synthesize(&anomalous(0.8), Quantity::Co2, 1500.0, "laboratory");
        assert_eq!(high.severity, Severity::High);
        assert_eq!(high.target_value, 1500.0);
        let medium = s.synthesize(&anomalous(0.6), Quantity::Co2, 1500.0, "laboratory");
        assert_eq!(medium.severity, Severity::Medium);
        let low = s.synthesize(&anomalous(0.4), Quantity::Co2, 1500.0, "laboratory");
        assert_eq!(low.severity, Severity::Low);
    }

    #[test]
    fn warm_ambient_caps_humidity_target() {
        let range = QuantityRange {
            min: 40.0,
            max: 95.0,
            target: 92.0,
            critical_low: None,
            critical_high: None,
        };
        let target = resolve_target(Some(&range), 96.0, true, Some(88.0));
        assert_eq!(target, 88.0);
        let target = resolve_target(Some(&range), 96.0, true, Some(30.0));
        assert_eq!(target, 40.0);
    }

    #[test]
    fn batch_keeps_actionable_items_by_priority() {
        let s = synthesizer();
        let request = |id: &str, assessment: Assessment, q: Quantity, v: f64, room: &str| SynthesisRequest {
            sensor_id: Some(id.to_string()),
            assessment,
            quantity: q,
            current_value: v,
            room_type: room.to_string(),
            ambient_temperature: None,
        };
        let recs = s.synthesize_batch(&[
            request("t-office", anomalous(0.9), Quantity::Temperature, 25.8, "office"),
            request("t-quiet", quiet_consensus(), Quantity::Temperature, 22.0, "office"),
            request("t-server", anomalous(0.9), Quantity::Temperature, 28.5, "server_room"),
            request("h-office", anomalous(0.9), Quantity::Humidity, 61.0, "office"),
        ]);
        let ids: Vec<_> = recs.iter().map(|r| r.sensor_id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["t-server", "t-office", "h-office"]);
    }

    #[test]
    fn priority_follows_severity_order() {
        let all = [Severity::Low, Severity::Medium, Severity::High, Severity::Critical];
        assert!(all.windows(2).all(|w| w[0] < w[1] && w[0].priority() < w[1].priority()));
    }
}
