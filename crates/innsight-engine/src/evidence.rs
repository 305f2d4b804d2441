//! Turn adapter output into Candidates.
//!
//! Entities are mapped onto fields by kind and by the keywords that precede
//! them; semantic scores are mapped through the anchor table below.

use std::collections::BTreeSet;

use innsight_ai::{Entity, SegmentScores, NEUTRAL_SENTIMENT};
use innsight_core::normalize::name_start;
use innsight_core::vocab::{is_venue_name, ATTRACTION_NOUNS, DINING_NOUNS};
use innsight_core::{Candidate, EngineConfig, EntityKind, Evidence, FieldName, FieldValue, Span};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::segment::Segment;

static CHECKIN_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bcheck[\s-]?in\b|\barrival\b").expect("check-in keyword regex"));

static CHECKOUT_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bcheck[\s-]?out\b|\bdeparture\b").expect("check-out keyword regex")
});

static PARKING_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bparking\b").expect("parking keyword regex"));

// ── Anchor table ──

/// What a matching anchor asserts about a field.
#[derive(Debug, Clone, Copy)]
pub enum AnchorValue {
    Flag(bool),
    Text(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    pub phrase: &'static str,
    /// `None` for anchors that only feed the audience rules.
    pub target: Option<(FieldName, AnchorValue)>,
}

pub const ANCHORS: &[Anchor] = &[
    Anchor {
        phrase: "parking",
        target: Some((FieldName::ParkingAvailable, AnchorValue::Flag(true))),
    },
    Anchor {
        phrase: "wifi",
        target: Some((FieldName::Wifi, AnchorValue::Text("available"))),
    },
    Anchor {
        phrase: "fitness center",
        target: Some((FieldName::FitnessCenter, AnchorValue::Text("available"))),
    },
    Anchor {
        phrase: "gym",
        target: Some((FieldName::FitnessCenter, AnchorValue::Text("available"))),
    },
    Anchor {
        phrase: "swimming pool",
        target: Some((FieldName::Pool, AnchorValue::Text("available"))),
    },
    Anchor {
        phrase: "pet friendly",
        target: Some((FieldName::PetPolicy, AnchorValue::Text("allowed"))),
    },
    Anchor { phrase: "spa", target: None },
    Anchor { phrase: "fine dining", target: None },
    Anchor { phrase: "valet", target: None },
    Anchor { phrase: "free breakfast", target: None },
    Anchor { phrase: "kids", target: None },
    Anchor { phrase: "business center", target: None },
    Anchor { phrase: "meeting room", target: None },
    Anchor { phrase: "beach", target: None },
];

pub fn anchor_phrases() -> Vec<String> {
    ANCHORS.iter().map(|a| a.phrase.to_string()).collect()
}

// ── Entities ──

/// Largest char boundary `<= i`.
fn floor_boundary(text: &str, mut i: usize) -> usize {
    i = i.min(text.len());
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_boundary(text: &str, mut i: usize) -> usize {
    i = i.min(text.len());
    while !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

fn valid_span(text: &str, span: Span) -> bool {
    span.start <= span.end
        && span.end <= text.len()
        && text.is_char_boundary(span.start)
        && text.is_char_boundary(span.end)
}

/// The check-in/out field whose keyword sits closest before `span`.
fn time_field(text: &str, span: Span, window: usize) -> Option<FieldName> {
    let from = floor_boundary(text, span.start.saturating_sub(window));
    let before = &text[from..span.start];
    let last = |re: &Regex| re.find_iter(before).last().map(|m| m.end());
    match (last(&CHECKIN_KEYWORD), last(&CHECKOUT_KEYWORD)) {
        (Some(i), Some(o)) if i > o => Some(FieldName::CheckinTime),
        (Some(_), Some(_)) => Some(FieldName::CheckoutTime),
        (Some(_), None) => Some(FieldName::CheckinTime),
        (None, Some(_)) => Some(FieldName::CheckoutTime),
        (None, None) => None,
    }
}

fn near_parking(text: &str, span: Span, window: usize) -> bool {
    let from = floor_boundary(text, span.start.saturating_sub(window));
    let to = ceil_boundary(text, span.end.saturating_add(window));
    PARKING_KEYWORD.is_match(&text[from..to])
}

fn map_entity(text: &str, entity: &Entity, window: usize) -> Option<(FieldName, FieldValue, Span)> {
    let span = entity.span;
    let value = entity.text.trim();
    match entity.kind {
        EntityKind::Contact if value.contains('@') => Some((
            FieldName::ContactEmail,
            FieldValue::text(value.to_lowercase()),
            span,
        )),
        EntityKind::Contact => Some((FieldName::ContactPhone, FieldValue::text(value), span)),
        EntityKind::Time => {
            time_field(text, span, window).map(|f| (f, FieldValue::text(value), span))
        }
        EntityKind::Money if near_parking(text, span, window) => {
            Some((FieldName::ParkingCost, FieldValue::text(value), span))
        }
        EntityKind::Org | EntityKind::Loc => {
            let skip = name_start(value);
            let name = &value[skip..];
            let field = if is_venue_name(name, DINING_NOUNS) {
                FieldName::Restaurants
            } else if is_venue_name(name, ATTRACTION_NOUNS) {
                FieldName::NearbyAttractions
            } else if entity.kind == EntityKind::Loc && !name.is_empty() {
                FieldName::ContactAddress
            } else {
                return None;
            };
            let span = Span::new((span.start + skip).min(span.end), span.end);
            Some((field, FieldValue::text(name), span))
        }
        EntityKind::Money | EntityKind::Person => None,
    }
}

/// Candidates for every entity that maps onto a field.
pub fn entity_candidates(text: &str, entities: &[Entity], config: &EngineConfig) -> Vec<Candidate> {
    entities
        .iter()
        .filter_map(|entity| {
            if !valid_span(text, entity.span) {
                debug!(kind = %entity.kind, start = entity.span.start, end = entity.span.end, "entity span outside text, skipped");
                return None;
            }
            let (field, value, span) = map_entity(text, entity, config.entity_window)?;
            Some(Candidate::new(
                field,
                value,
                Evidence::Ner { entity: entity.kind },
                span,
                config.ner_confidence,
            ))
        })
        .collect()
}

// ── Semantic scores ──

#[derive(Debug, Clone, PartialEq)]
pub struct SemanticEvidence {
    pub candidates: Vec<Candidate>,
    /// Anchor phrases whose best segment cleared the threshold.
    pub matched_anchors: BTreeSet<String>,
    /// Mean segment sentiment; neutral when nothing was scored.
    pub sentiment: f32,
}

pub fn semantic_evidence(
    segments: &[Segment],
    scores: &[SegmentScores],
    config: &EngineConfig,
) -> SemanticEvidence {
    let scored = segments.len().min(scores.len());
    let sentiment = if scored == 0 {
        NEUTRAL_SENTIMENT
    } else {
        let sum: f32 = scores[..scored].iter().map(|s| s.sentiment.clamp(0.0, 1.0)).sum();
        sum / scored as f32
    };

    let mut candidates = Vec::new();
    let mut matched_anchors = BTreeSet::new();
    for anchor in ANCHORS {
        // best segment, earliest on ties
        let best = (0..scored)
            .filter_map(|i| {
                let sim = *scores[i].similarity.get(anchor.phrase)?;
                sim.is_finite().then_some((i, sim.clamp(0.0, 1.0)))
            })
            .fold(None, |best: Option<(usize, f32)>, (i, sim)| match best {
                Some((_, b)) if b >= sim => best,
                _ => Some((i, sim)),
            });
        let Some((i, similarity)) = best else {
            continue;
        };
        if similarity <= 0.0 || similarity < config.semantic_threshold {
            continue;
        }
        matched_anchors.insert(anchor.phrase.to_string());
        if let Some((field, value)) = anchor.target {
            let value = match value {
                AnchorValue::Flag(b) => FieldValue::Flag(b),
                AnchorValue::Text(s) => FieldValue::text(s),
            };
            candidates.push(Candidate::new(
                field,
                value,
                Evidence::Semantic {
                    anchor: anchor.phrase.to_string(),
                },
                segments[i].span,
                (similarity * config.semantic_confidence_scale).clamp(0.0, 1.0),
            ));
        }
    }

    SemanticEvidence {
        candidates,
        matched_anchors,
        sentiment,
    }
}
