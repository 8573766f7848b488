//! The analysis pipeline: detectors, consensus and synthesis wired together
//! from one read-only configuration bundle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use climate_core::config::AnalysisConfig;
use climate_core::{Quantity, Series};
use climate_rules::loader::RuleError;
use climate_rules::AnalysisRules;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::actions::{ActionError, ActionOutcome, RecommendationAction};
use crate::consensus::{ConsensusEngine, ConsensusError, ConsensusResult, ConsensusSummary};
use crate::detect::DetectorSuite;
use crate::recommend::{Assessment, Recommendation, SynthesisRequest, Synthesizer};
use crate::verdict::Verdict;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(#[from] RuleError),

    #[error("invalid analysis configuration: {0}")]
    InvalidConfig(String),

    #[error("series for sensor '{0}' has no readings")]
    EmptySeries(String),

    #[error(transparent)]
    Consensus(#[from] ConsensusError),
}

/// One sensor's readings plus the context needed to act on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSeries {
    pub sensor_id: String,
    pub quantity: Quantity,
    /// Falls back to the engine's default room type.
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub ambient_temperature: Option<f64>,
    pub series: Series,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReport {
    pub sensor_id: String,
    pub quantity: Quantity,
    pub room_type: String,
    /// Timestamp of the reading the recommendation is based on.
    pub as_of: DateTime<Utc>,
    pub verdicts: Vec<Verdict>,
    pub consensus: ConsensusResult,
    pub recommendation: Recommendation,
}

pub struct AnalysisEngine {
    rules: Arc<AnalysisRules>,
    suite: DetectorSuite,
    consensus: ConsensusEngine,
    synthesizer: Synthesizer,
    default_room: String,
}

impl AnalysisEngine {
    /// Build every component from a validated configuration bundle.
    pub fn new(rules: AnalysisRules) -> Result<Self, EngineError> {
        let validation = rules.validate();
        for w in &validation.warnings {
            warn!(path = %w.path, "{}", w.message);
        }
        if !validation.valid {
            return Err(EngineError::InvalidConfig(validation.error_summary()));
        }

        let rules = Arc::new(rules);
        let suite = DetectorSuite::new(&rules.detectors, &rules.ensemble);
        let consensus = ConsensusEngine::new(rules.ensemble.consensus);
        let synthesizer = Synthesizer::new(rules.rooms.clone(), rules.recommendation.clone());
        let default_room = rules.rooms.default_room.clone();

        info!(
            rooms = rules.rooms.rooms.len(),
            default_room = %default_room,
            representative = %rules.ensemble.consensus.statistical_representative,
            "analysis engine ready"
        );

        Ok(Self {
            rules,
            suite,
            consensus,
            synthesizer,
            default_room,
        })
    }

    /// Engine over the embedded default configuration.
    pub fn with_defaults() -> Result<Self, EngineError> {
        Self::new(AnalysisRules::builtin()?)
    }

    /// Engine from environment configuration: config directory and default room.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, EngineError> {
        let rules = AnalysisRules::load(config.config_dir.as_deref())?;
        Ok(Self::new(rules)?.with_default_room(config.default_room_type.clone()))
    }

    /// Room type used for series that do not name one.
    pub fn with_default_room(mut self, room_type: impl Into<String>) -> Self {
        self.default_room = room_type.into();
        self
    }

    pub fn rules(&self) -> &AnalysisRules {
        &self.rules
    }

    pub fn synthesizer(&self) -> &Synthesizer {
        &self.synthesizer
    }

    /// All six verdicts in registry order.
    pub fn analyze(&self, series: &Series) -> Vec<Verdict> {
        self.suite.analyze(series)
    }

    pub fn compare(&self, a: &Verdict, b: &Verdict) -> Result<ConsensusResult, ConsensusError> {
        self.consensus.compare(a, b)
    }

    pub fn synthesize(
        &self,
        assessment: &Assessment,
        quantity: Quantity,
        current_value: f64,
        room_type: &str,
    ) -> Recommendation {
        self.synthesizer
            .synthesize(assessment, quantity, current_value, room_type)
    }

    pub fn apply_action(
        &self,
        recommendation: &Recommendation,
        action: &RecommendationAction,
    ) -> Result<ActionOutcome, ActionError> {
        self.synthesizer.apply_action(recommendation, action)
    }

    /// Full pipeline for one sensor: analyze, compare the statistical
    /// representative with the family vote, recommend on the latest reading.
    pub fn report(&self, input: &SensorSeries) -> Result<SensorReport, EngineError> {
        let latest = input
            .series
            .latest()
            .copied()
            .ok_or_else(|| EngineError::EmptySeries(input.sensor_id.clone()))?;

        let verdicts = self.analyze(&input.series);
        let representative = self.rules.ensemble.consensus.statistical_representative;
        let statistical = find(&verdicts, representative)?;
        let pattern = find(&verdicts, climate_core::DetectorKind::Ensemble)?;
        let consensus = self.consensus.compare(statistical, pattern)?;

        let request = SynthesisRequest {
            sensor_id: Some(input.sensor_id.clone()),
            assessment: Assessment::Consensus(consensus.clone()),
            quantity: input.quantity,
            current_value: latest.value,
            room_type: input
                .room_type
                .clone()
                .unwrap_or_else(|| self.default_room.clone()),
            ambient_temperature: input.ambient_temperature,
        };
        let recommendation = self.synthesizer.synthesize_request(&request);

        info!(
            sensor = %input.sensor_id,
            quantity = %input.quantity,
            points = input.series.len(),
            anomaly = consensus.consensus_is_anomaly,
            agreement = consensus.agreement_score,
            severity = %recommendation.severity,
            "sensor analyzed"
        );

        Ok(SensorReport {
            sensor_id: input.sensor_id.clone(),
            quantity: input.quantity,
            room_type: recommendation.room_type.clone(),
            as_of: latest.timestamp,
            verdicts,
            consensus,
            recommendation,
        })
    }

    /// Reports for many sensors, computed in parallel, in input order.
    pub fn report_all(&self, inputs: &[SensorSeries]) -> Vec<Result<SensorReport, EngineError>> {
        inputs.par_iter().map(|input| self.report(input)).collect()
    }

    /// Agreement statistics over a set of reports.
    pub fn summarize(reports: &[SensorReport]) -> ConsensusSummary {
        ConsensusSummary::from_results(reports.iter().map(|r| &r.consensus))
    }
}

fn find(verdicts: &[Verdict], kind: climate_core::DetectorKind) -> Result<&Verdict, EngineError> {
    verdicts
        .iter()
        .find(|v| v.method == kind)
        .ok_or_else(|| EngineError::InvalidConfig(format!("no verdict produced by {}", kind)))
}
