//! Split a document into the segments the semantic scorer sees.
//!
//! HTML fragments are used as-is when the fetch layer supplied them;
//! otherwise the text is cut into sentences.

use innsight_core::{RawDocument, Span};
use once_cell::sync::Lazy;
use regex::Regex;

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+(?:\s+|\z)").expect("sentence regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    /// Location in the document text. Fragments that cannot be found in
    /// the text get an empty span at 0.
    pub span: Span,
}

pub fn segments(doc: &RawDocument) -> Vec<Segment> {
    let fragments: Vec<&str> = doc
        .html_fragments()
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .collect();
    if fragments.is_empty() {
        return sentences(doc.text());
    }
    fragments
        .into_iter()
        .map(|f| Segment {
            text: f.to_string(),
            span: doc
                .text()
                .find(f)
                .map_or(Span::new(0, 0), |start| Span::new(start, start + f.len())),
        })
        .collect()
}

pub fn sentences(text: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut push = |from: usize, to: usize| {
        let raw = &text[from..to];
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return;
        }
        let lead = raw.len() - raw.trim_start().len();
        out.push(Segment {
            text: trimmed.to_string(),
            span: Span::new(from + lead, from + lead + trimmed.len()),
        });
    };
    for m in SENTENCE_END.find_iter(text) {
        push(start, m.end());
        start = m.end();
    }
    push(start, text.len());
    out
}
