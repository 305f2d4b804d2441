//! Deterministic, model-free entity recognizer.
//!
//! Covers the structured entity types (CONTACT, TIME, MONEY) with regular
//! expressions, names ORG/LOC spans by their venue noun ("... Grill",
//! "Cafe ...", "... Museum"), and tags street addresses as LOC. Used when no
//! NER model is configured.

use async_trait::async_trait;
use innsight_core::normalize::name_start;
use innsight_core::vocab::{
    is_venue_name, street_address_pattern, venue_name_pattern, ATTRACTION_NOUNS, DINING_NOUNS,
};
use innsight_core::{EntityKind, Span};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{AdapterError, Entity, EntityRecognizer};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email regex")
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?1[-.\s]?)?(?:\(\d{3}\)|\b\d{3})[-.\s]?\d{3}[-.\s]?\d{4}\b")
        .expect("phone regex")
});

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b\d{1,2}(?::[0-5]\d)?\s?(?:[ap]\.m\.|[ap]m\b)|\b(?:[01]?\d|2[0-3]):[0-5]\d\b")
        .expect("time regex")
});

static MONEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[$€£]\s?\d[\d,]*(?:\.\d{2})?|\b\d[\d,]*(?:\.\d{2})?\s?(?:USD|EUR|GBP|dollars?)\b")
        .expect("money regex")
});

static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&street_address_pattern()).expect("address regex"));

static ORG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&venue_name_pattern(DINING_NOUNS, true)).expect("org regex"));

static LOC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&venue_name_pattern(ATTRACTION_NOUNS, false)).expect("loc regex"));

#[derive(Debug, Default, Clone)]
pub struct RuleRecognizer;

impl RuleRecognizer {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous core of [`EntityRecognizer::recognize_entities`].
    pub fn recognize(&self, text: &str) -> Vec<Entity> {
        let mut found = Vec::new();
        // Earlier passes win overlaps: a phone number is not also a MONEY span.
        // Passes with nouns produce venue names and drop bare nouns.
        let passes: [(&Lazy<Regex>, EntityKind, Option<&[&str]>); 7] = [
            (&EMAIL_RE, EntityKind::Contact, None),
            (&PHONE_RE, EntityKind::Contact, None),
            (&TIME_RE, EntityKind::Time, None),
            (&MONEY_RE, EntityKind::Money, None),
            (&ADDRESS_RE, EntityKind::Loc, None),
            (&ORG_RE, EntityKind::Org, Some(DINING_NOUNS)),
            (&LOC_RE, EntityKind::Loc, Some(ATTRACTION_NOUNS)),
        ];

        for (re, kind, nouns) in passes {
            for m in re.find_iter(text) {
                let start = match nouns {
                    Some(_) => m.start() + name_start(m.as_str()),
                    None => m.start(),
                };
                let end = m.end();
                if nouns.is_some_and(|n| !is_venue_name(&text[start..end], n)) {
                    continue;
                }
                let span = Span::new(start, end);
                if found.iter().any(|e: &Entity| e.span.overlaps(&span)) {
                    continue;
                }
                found.push(Entity::new(kind, span, &text[start..end]));
            }
        }

        found.sort_by_key(|e| (e.span.start, e.span.end));
        found
    }
}

#[async_trait]
impl EntityRecognizer for RuleRecognizer {
    fn name(&self) -> &str {
        "rules"
    }

    async fn recognize_entities(&self, text: &str) -> Result<Vec<Entity>, AdapterError> {
        Ok(self.recognize(text))
    }
}
