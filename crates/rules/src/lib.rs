//! YAML configuration documents for the microclimate analysis pipeline.
//!
//! This crate provides:
//! - Kubernetes-style documents (`apiVersion`, `kind`, `metadata`, `spec`)
//!   for detector parameters, ensemble and consensus weights, room profiles,
//!   and recommendation tuning
//! - A filesystem loader with `extends` inheritance
//! - Structured validation with errors, warnings and "did you mean" hints
//! - [`AnalysisRules`], the compiled bundle consumed by `climate-compute`

pub mod bundle;
pub mod detector_config;
pub mod ensemble_config;
pub mod loader;
pub mod recommendation_config;
pub mod room_profiles;
pub mod schema;
pub mod validation;

pub use bundle::AnalysisRules;
