//! Exporters for [`CanonicalRecord`]s.
//!
//! Every format reads the same fixed field set; unknown values are printed
//! as `unknown`, never skipped.

mod card;
mod error;
mod flat;
mod text;

use std::fmt;
use std::str::FromStr;

use innsight_core::{check_required_keys, CanonicalRecord};

pub use error::ExportError;
pub use flat::{record_batch, render_csv};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Jsonl,
    Csv,
    Markdown,
    RagText,
    Summary,
}

impl Format {
    pub const ALL: [Format; 6] = [
        Self::Json,
        Self::Jsonl,
        Self::Csv,
        Self::Markdown,
        Self::RagText,
        Self::Summary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Jsonl => "jsonl",
            Self::Csv => "csv",
            Self::Markdown => "markdown",
            Self::RagText => "rag",
            Self::Summary => "summary",
        }
    }

    /// File extension for output written in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Jsonl => "jsonl",
            Self::Csv => "csv",
            Self::Markdown => "md",
            Self::RagText | Self::Summary => "txt",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "md" => Ok(Self::Markdown),
            "txt" | "text" => Ok(Self::RagText),
            _ => Self::ALL
                .into_iter()
                .find(|f| f.as_str() == lower)
                .ok_or_else(|| ExportError::UnknownFormat(s.to_string())),
        }
    }
}

/// Render `records` in `format`.
pub fn render(records: &[CanonicalRecord], format: Format) -> Result<String, ExportError> {
    match format {
        Format::Json => render_json(records),
        Format::Jsonl => render_jsonl(records),
        Format::Csv => render_csv(records),
        Format::Markdown => Ok(join(records, "\n---\n\n", text::markdown)),
        Format::RagText => Ok(join(records, "\n", text::rag_text)),
        Format::Summary => Ok(join(records, "\n", card::summary_card)),
    }
}

fn join(records: &[CanonicalRecord], sep: &str, one: fn(&CanonicalRecord) -> String) -> String {
    records.iter().map(one).collect::<Vec<_>>().join(sep)
}

fn checked_value(record: &CanonicalRecord) -> Result<serde_json::Value, ExportError> {
    let value = serde_json::to_value(record)?;
    check_required_keys(&value)?;
    Ok(value)
}

/// A single record renders as one object, several as an array.
pub fn render_json(records: &[CanonicalRecord]) -> Result<String, ExportError> {
    let mut values = records
        .iter()
        .map(checked_value)
        .collect::<Result<Vec<_>, _>>()?;
    let out = if values.len() == 1 {
        serde_json::to_string_pretty(&values.remove(0))?
    } else {
        serde_json::to_string_pretty(&values)?
    };
    Ok(out + "\n")
}

pub fn render_jsonl(records: &[CanonicalRecord]) -> Result<String, ExportError> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(&checked_value(record)?)?);
        out.push('\n');
    }
    Ok(out)
}

/// `Positive` above 0.6, `Neutral` above 0.4, otherwise `Negative`.
pub fn sentiment_label(score: f32) -> &'static str {
    if score > 0.6 {
        "Positive"
    } else if score > 0.4 {
        "Neutral"
    } else {
        "Negative"
    }
}
