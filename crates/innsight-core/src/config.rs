//! Engine configuration.
//!
//! Every key is optional in the JSON form; missing keys take the defaults
//! below.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deadline for each adapter call; exceeding it counts as no evidence.
    pub adapter_timeout_ms: u64,
    /// Minimum anchor similarity for a semantic candidate.
    pub semantic_threshold: f32,
    /// Multiplier applied to similarity to get a semantic candidate's confidence.
    pub semantic_confidence_scale: f32,
    /// Local confidence given to candidates mapped from recognised entities.
    pub ner_confidence: f32,
    /// Bytes before an entity searched for a field keyword (check-in, parking, ...).
    pub entity_window: usize,
    /// Maximum byte gap between an entry attribute and its name.
    pub grouping_window: usize,
    /// Documents processed concurrently by a batch run.
    pub max_concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            adapter_timeout_ms: 2_000,
            semantic_threshold: 0.6,
            semantic_confidence_scale: 0.7,
            ner_confidence: 0.7,
            entity_window: 48,
            grouping_window: 160,
            max_concurrency: 4,
        }
    }
}

impl EngineConfig {
    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_millis(self.adapter_timeout_ms)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&raw)?;
        info!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        unit_interval("semantic_threshold", self.semantic_threshold)?;
        unit_interval("semantic_confidence_scale", self.semantic_confidence_scale)?;
        unit_interval("ner_confidence", self.ner_confidence)?;
        if self.max_concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: "max_concurrency",
                reason: "must be at least 1".into(),
            });
        }
        if self.adapter_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "adapter_timeout_ms",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Accepts (0, 1].
fn unit_interval(key: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key,
            reason: format!("{value} is outside (0, 1]"),
        })
    }
}
