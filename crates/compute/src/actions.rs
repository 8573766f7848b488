//! Operator actions on a synthesized recommendation.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::recommend::{text, Recommendation, RecommendationStatus, Synthesizer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RecommendationAction {
    Confirm,
    Reject,
    /// Replace the target with an operator-chosen value.
    Modify { target: f64 },
    RequestInfo,
    RequestReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum ActionOutcome {
    Confirmed(Recommendation),
    Rejected(Recommendation),
    Modified(Recommendation),
    Info(String),
    Report(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum ActionError {
    #[error("target value {0} is not a finite number")]
    NonFiniteTarget(f64),

    #[error("target value {target} is outside the safe range [{min}, {max}]")]
    TargetOutOfRange { target: f64, min: f64, max: f64 },
}

impl Synthesizer {
    pub fn apply_action(
        &self,
        rec: &Recommendation,
        action: &RecommendationAction,
    ) -> Result<ActionOutcome, ActionError> {
        let outcome = match action {
            RecommendationAction::Confirm => {
                let mut confirmed = rec.clone();
                confirmed.status = RecommendationStatus::Confirmed;
                ActionOutcome::Confirmed(confirmed)
            }
            RecommendationAction::Reject => {
                let mut rejected = rec.clone();
                rejected.status = RecommendationStatus::Rejected;
                ActionOutcome::Rejected(rejected)
            }
            RecommendationAction::Modify { target } => {
                ActionOutcome::Modified(self.modify(rec, *target)?)
            }
            RecommendationAction::RequestInfo => ActionOutcome::Info(info_text(rec)),
            RecommendationAction::RequestReport => ActionOutcome::Report(report_text(rec)),
        };
        info!(
            sensor = rec.sensor_id.as_deref().unwrap_or("-"),
            quantity = %rec.quantity,
            ?action,
            "applied recommendation action"
        );
        Ok(outcome)
    }

    /// Overwrite the target and re-derive everything that depends on it.
    fn modify(&self, rec: &Recommendation, target: f64) -> Result<Recommendation, ActionError> {
        if !target.is_finite() {
            return Err(ActionError::NonFiniteTarget(target));
        }
        let range = self.range_for(&rec.room_type, rec.quantity);
        if let Some(r) = range {
            if !r.contains(target) {
                return Err(ActionError::TargetOutOfRange {
                    target,
                    min: r.min,
                    max: r.max,
                });
            }
        }

        let mut modified = rec.clone();
        modified.target_value = target;
        modified.severity = self.severity_toward(
            range,
            rec.current_value,
            target,
            rec.is_anomaly,
            rec.confidence,
            &rec.safety_flags,
        );
        modified.priority = modified.severity.priority();
        modified.time_to_target_minutes = self.time_to_target(rec.quantity, rec.current_value, target);
        modified.time_to_target = self.render_time(rec.quantity, modified.time_to_target_minutes);
        modified.recommended_action = text::action(
            rec.quantity,
            rec.current_value,
            target,
            range,
            rec.is_anomaly || !rec.safety_flags.is_empty(),
            rec.sensor_id.as_deref().unwrap_or(rec.quantity.key()),
        );
        modified.reasoning = format!(
            "{} Target set by operator to {:.1}{}.",
            text::reasoning(
                rec.quantity,
                rec.current_value,
                range,
                &rec.safety_flags,
                rec.confidence,
                rec.is_anomaly,
            ),
            target,
            rec.quantity.unit()
        );
        modified.status = RecommendationStatus::Modified;
        Ok(modified)
    }
}

fn info_text(rec: &Recommendation) -> String {
    format!(
        "{} Reasoning: {} Confidence: {:.2}.",
        rec.problem_description, rec.reasoning, rec.confidence
    )
}

fn report_text(rec: &Recommendation) -> String {
    let flags = if rec.safety_flags.is_empty() {
        "none".to_string()
    } else {
        rec.safety_flags
            .iter()
            .map(|f| f.describe())
            .collect::<Vec<_>>()
            .join(", ")
    };
    [
        format!("Sensor: {}", rec.sensor_id.as_deref().unwrap_or("unknown")),
        format!("Room: {}", rec.room_type),
        format!("Problem: {}", rec.problem_description),
        format!("Action: {}", rec.recommended_action),
        format!(
            "Target: {:.1}{} ({})",
            rec.target_value,
            rec.quantity.unit(),
            rec.time_to_target
        ),
        format!("Severity: {} (priority {}/5)", rec.severity, rec.priority),
        format!("Safety: {}", flags),
        format!("Confidence: {:.2}", rec.confidence),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::{Assessment, Severity};
    use crate::verdict::Verdict;
    use climate_core::{DetectorKind, Quantity};
    use climate_rules::AnalysisRules;

    fn setup() -> (Synthesizer, Recommendation) {
        setup_at(27.0)
    }

    fn setup_at(current: f64) -> (Synthesizer, Recommendation) {
        let rules = AnalysisRules::builtin().unwrap();
        let s = Synthesizer::new(rules.rooms, rules.recommendation);
        let assessment =
            Assessment::Verdict(Verdict::new(DetectorKind::RollingZScore, 0.9, true, "spike"));
        let rec = s.synthesize(&assessment, Quantity::Temperature, current, "office");
        (s, rec)
    }

    fn modified(s: &Synthesizer, rec: &Recommendation, target: f64) -> Recommendation {
        match s.apply_action(rec, &RecommendationAction::Modify { target }).unwrap() {
            ActionOutcome::Modified(m) => m,
            other => panic!("expected modified outcome, got {other:?}"),
        }
    }

    #[test]
    fn modify_rederives_time() {
        let (s, rec) = setup();
        assert_eq!(rec.target_value, 22.5);
        let out = s
            .apply_action(&rec, &RecommendationAction::Modify { target: 24.0 })
            .unwrap();
        let ActionOutcome::Modified(m) = out else {
            panic!("expected modified outcome");
        };
        assert_eq!(m.target_value, 24.0);
        assert!((m.time_to_target_minutes - 90.0).abs() < 1e-9);
        assert_eq!(m.severity, Severity::High);
        assert_eq!(m.priority, 4);
        assert_eq!(m.status, RecommendationStatus::Modified);
        assert!(m.reasoning.ends_with("Target set by operator to 24.0°C."));
    }

    #[test]
    fn modify_grades_the_remaining_correction() {
        let (s, rec) = setup_at(25.8);
        assert_eq!(rec.severity, Severity::Medium);

        let near = modified(&s, &rec, 25.0);
        assert_eq!(near.severity, Severity::Medium);
        assert_eq!(near.priority, 2);

        let far = modified(&s, &rec, 21.0);
        assert_eq!(far.severity, Severity::High);
        assert_eq!(far.priority, 4);
    }

    #[test]
    fn modify_keeps_in_range_readings_low() {
        let (s, rec) = setup_at(23.0);
        assert_eq!(modified(&s, &rec, 21.0).severity, Severity::Low);
    }

    #[test]
    fn modify_rejects_unsafe_targets() {
        let (s, rec) = setup();
        assert_eq!(
            s.apply_action(&rec, &RecommendationAction::Modify { target: 30.0 }),
            Err(ActionError::TargetOutOfRange {
                target: 30.0,
                min: 21.0,
                max: 25.0
            })
        );
        assert!(matches!(
            s.apply_action(&rec, &RecommendationAction::Modify { target: f64::NAN }),
            Err(ActionError::NonFiniteTarget(_))
        ));
    }

    #[test]
    fn confirm_and_reject_set_status() {
        let (s, rec) = setup();
        let ActionOutcome::Confirmed(c) = s.apply_action(&rec, &RecommendationAction::Confirm).unwrap()
        else {
            panic!("expected confirmed outcome");
        };
        assert_eq!(c.status, RecommendationStatus::Confirmed);
        assert_eq!(c.target_value, rec.target_value);
        let ActionOutcome::Rejected(r) = s.apply_action(&rec, &RecommendationAction::Reject).unwrap()
        else {
            panic!("expected rejected outcome");
        };
        assert_eq!(r.status, RecommendationStatus::Rejected);
    }

    #[test]
    fn report_lists_every_field() {
        let (s, rec) = setup();
        let ActionOutcome::Report(text) =
            s.apply_action(&rec, &RecommendationAction::RequestReport).unwrap()
        else {
            panic!("expected report");
        };
        assert!(text.contains("Room: office"));
        assert!(text.contains("Severity: high (priority 4/5)"));
        assert!(text.contains("Safety: none"));
    }

    #[test]
    fn actions_parse_from_json() {
        let a: RecommendationAction =
            serde_json::from_str(r#"{"action":"modify","target":21.5}"#).unwrap();
        assert_eq!(a, RecommendationAction::Modify { target: 21.5 });
        let a: RecommendationAction = serde_json::from_str(r#"{"action":"request_info"}"#).unwrap();
        assert_eq!(a, RecommendationAction::RequestInfo);
    }
}
