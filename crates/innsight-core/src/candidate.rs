//! Candidates and reconciled slots.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaViolation;
use crate::field::{FieldName, FieldValue};

/// Byte offsets into the source text, `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Gap in bytes between two spans; zero when they overlap or touch.
    pub fn distance(&self, other: &Span) -> usize {
        if self.overlaps(other) {
            0
        } else if self.end <= other.start {
            other.start - self.end
        } else {
            self.start - other.end
        }
    }
}

/// Which extractor produced a candidate.
///
/// Declaration order is tie-break precedence: pattern beats ner beats semantic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorSource {
    Pattern,
    Ner,
    Semantic,
}

impl ExtractorSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::Ner => "ner",
            Self::Semantic => "semantic",
        }
    }
}

impl fmt::Display for ExtractorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity types an entity recognizer may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityKind {
    Person,
    Org,
    Loc,
    Time,
    Money,
    Contact,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Org => "ORG",
            Self::Loc => "LOC",
            Self::Time => "TIME",
            Self::Money => "MONEY",
            Self::Contact => "CONTACT",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of a candidate, one variant per extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Evidence {
    /// A named pattern rule fired.
    Pattern { rule: String },
    /// An entity of this kind was mapped onto the field.
    Ner { entity: EntityKind },
    /// An anchor phrase scored above threshold for a text segment.
    Semantic { anchor: String },
}

impl Evidence {
    pub fn source(&self) -> ExtractorSource {
        match self {
            Self::Pattern { .. } => ExtractorSource::Pattern,
            Self::Ner { .. } => ExtractorSource::Ner,
            Self::Semantic { .. } => ExtractorSource::Semantic,
        }
    }
}

/// One proposed value for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub field: FieldName,
    pub value: FieldValue,
    pub evidence: Evidence,
    pub span: Span,
    pub local_confidence: f32,
}

impl Candidate {
    pub fn new(
        field: FieldName,
        value: FieldValue,
        evidence: Evidence,
        span: Span,
        local_confidence: f32,
    ) -> Self {
        Self {
            field,
            value,
            evidence,
            span,
            local_confidence,
        }
    }

    pub fn source(&self) -> ExtractorSource {
        self.evidence.source()
    }

    /// Check the candidate against the field schema.
    pub fn validate(&self) -> Result<(), SchemaViolation> {
        let expected = self.field.value_kind();
        let found = self.value.kind();
        if expected != found {
            return Err(SchemaViolation::ValueKind {
                field: self.field,
                expected,
                found,
            });
        }
        if !self.local_confidence.is_finite() || !(0.0..=1.0).contains(&self.local_confidence) {
            return Err(SchemaViolation::Confidence {
                field: self.field,
                value: self.local_confidence,
            });
        }
        if self.span.start > self.span.end {
            return Err(SchemaViolation::Span {
                field: self.field,
                start: self.span.start,
                end: self.span.end,
            });
        }
        Ok(())
    }
}

/// Reconciled state of one field: every candidate plus the winner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSlot {
    pub field: FieldName,
    pub candidates: Vec<Candidate>,
    pub selected: Option<Candidate>,
    /// Effective confidence of `selected` after any agreement bonus; 0 when absent.
    pub resolved_confidence: f32,
}

impl FieldSlot {
    pub fn absent(field: FieldName) -> Self {
        Self {
            field,
            candidates: Vec::new(),
            selected: None,
            resolved_confidence: 0.0,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.selected.is_some()
    }

    pub fn value(&self) -> Option<&FieldValue> {
        self.selected.as_ref().map(|c| &c.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(confidence: f32) -> Candidate {
        Candidate::new(
            FieldName::Wifi,
            FieldValue::text("available"),
            Evidence::Pattern {
                rule: "wifi.free".into(),
            },
            Span::new(0, 9),
            confidence,
        )
    }

    #[test]
    fn precedence_order() {
        assert!(ExtractorSource::Pattern < ExtractorSource::Ner);
        assert!(ExtractorSource::Ner < ExtractorSource::Semantic);
    }

    #[test]
    fn span_distance() {
        let a = Span::new(0, 10);
        assert_eq!(a.distance(&Span::new(5, 20)), 0);
        assert_eq!(a.distance(&Span::new(15, 20)), 5);
        assert_eq!(Span::new(30, 40).distance(&a), 20);
    }

    #[test]
    fn validate_rejects_bad_confidence() {
        assert!(candidate(0.9).validate().is_ok());
        assert!(matches!(
            candidate(1.5).validate(),
            Err(SchemaViolation::Confidence { .. })
        ));
        assert!(candidate(f32::NAN).validate().is_err());
    }

    #[test]
    fn validate_rejects_kind_mismatch() {
        let mut c = candidate(0.5);
        c.field = FieldName::ParkingAvailable;
        assert!(matches!(
            c.validate(),
            Err(SchemaViolation::ValueKind { .. })
        ));
    }

    #[test]
    fn evidence_json_is_tagged_by_source() {
        let json = serde_json::to_value(Evidence::Ner {
            entity: EntityKind::Time,
        })
        .unwrap();
        assert_eq!(json["source"], "ner");
        assert_eq!(json["entity"], "TIME");
    }
}
