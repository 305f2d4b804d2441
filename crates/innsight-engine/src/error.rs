use innsight_core::{ConfigError, SchemaViolation};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Extractor output or record assembly broke the field schema.
    #[error("schema violation: {0}")]
    Schema(#[from] SchemaViolation),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
