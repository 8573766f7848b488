//! Filesystem loader for configuration documents.
//!
//! Scans a directory for YAML files, resolves `extends` inheritance on the
//! raw YAML, then parses each document via two-pass deserialization
//! (RuleEnvelope -> RuleDocument).

mod core;
mod error;
mod extends;


pub use self::core::RuleLoader;
pub use self::error::{LoadResult, LoadStatus, Result, RuleError};
pub use self::extends::{deep_merge, resolve_extends};
