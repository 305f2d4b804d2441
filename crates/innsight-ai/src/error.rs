use std::time::Duration;

use thiserror::Error;

/// Why an adapter produced no result. Always non-fatal to the pipeline.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("adapter unavailable: {0}")]
    Unavailable(String),

    #[error("adapter exceeded deadline of {0:?}")]
    Timeout(Duration),

    #[error("model error: {0}")]
    Model(#[from] anyhow::Error),
}
