use thiserror::Error;

use crate::field::{FieldName, ValueKind};

/// Contract violation between an extractor and the canonical schema.
///
/// Never produced for missing evidence; only for input that does not fit the
/// schema at all. Callers must treat it as a hard error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaViolation {
    #[error("unknown field name: {0:?}")]
    UnknownField(String),

    #[error("field {field} expects a {expected} value, got {found}")]
    ValueKind {
        field: FieldName,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("field {field} has local confidence {value} outside [0, 1]")]
    Confidence { field: FieldName, value: f32 },

    #[error("field {field} has inverted span {start}..{end}")]
    Span {
        field: FieldName,
        start: usize,
        end: usize,
    },

    #[error("record is missing required key {0:?}")]
    MissingKey(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
