//! Multi-method anomaly scoring, cross-family consensus and recommendation
//! synthesis for microclimate sensor series.

pub mod actions;
pub mod consensus;
pub mod detect;
pub mod engine;
pub mod recommend;
pub mod verdict;

pub use actions::{ActionError, ActionOutcome, RecommendationAction};
pub use consensus::{ConsensusEngine, ConsensusError, ConsensusResult, ConsensusSummary};
pub use detect::{Detector, DetectorSuite};
pub use engine::{AnalysisEngine, EngineError, SensorReport, SensorSeries};
pub use recommend::{
    Assessment, Recommendation, RecommendationStatus, SafetyFlag, Severity, SynthesisRequest,
    Synthesizer,
};
pub use verdict::Verdict;
