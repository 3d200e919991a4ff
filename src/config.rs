//! Engine configuration.
//!
//! A deliberately small TOML-backed config: the hosting application
//! loads it once and hands it to every [`ChainExecutor`](crate::executor::ChainExecutor)
//! it constructs.
//!
//! ```toml
//! unknown_operation = "skip"   # or "error"
//! max_output_dimension = 8192
//! ```

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid engine config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// What to do with a transformation name the engine doesn't know.
///
/// Skipping mirrors the behavior clients historically relied on; the
/// strict mode turns typos into immediate client errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownOperationPolicy {
    #[default]
    Skip,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub unknown_operation: UnknownOperationPolicy,
    /// Upper bound on any requested output width/height. `None` means
    /// unbounded.
    pub max_output_dimension: Option<u32>,
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }
}
