use innsight_core::SchemaViolation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unknown export format {0:?} (expected json, jsonl, csv, markdown, rag or summary)")]
    UnknownFormat(String),

    #[error("record failed schema check: {0}")]
    Schema(#[from] SchemaViolation),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("csv output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
