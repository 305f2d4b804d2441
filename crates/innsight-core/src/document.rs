//! Scraped input as handed over by the fetch/render layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One scrape of one page. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    source_url: String,
    fetched_at: DateTime<Utc>,
    text: String,
    #[serde(default)]
    html_fragments: Vec<String>,
}

impl RawDocument {
    pub fn new(
        source_url: impl Into<String>,
        fetched_at: DateTime<Utc>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            fetched_at,
            text: text.into(),
            html_fragments: Vec::new(),
        }
    }

    /// Attach the text of HTML block elements, in document order.
    pub fn with_fragments(mut self, fragments: Vec<String>) -> Self {
        self.html_fragments = fragments;
        self
    }

    /// Build from raw bytes. Bytes that are not valid UTF-8 yield an empty
    /// text, which the pipeline turns into an all-unknown record.
    pub fn from_bytes(
        source_url: impl Into<String>,
        fetched_at: DateTime<Utc>,
        bytes: Vec<u8>,
    ) -> Self {
        let source_url = source_url.into();
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!(url = %source_url, error = %e, "document is not decodable text");
                String::new()
            }
        };
        Self::new(source_url, fetched_at, text)
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn html_fragments(&self) -> &[String] {
        &self.html_fragments
    }

    /// True when there is nothing to extract from.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
