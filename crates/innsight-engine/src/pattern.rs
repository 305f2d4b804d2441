//! Pattern Extractor: an ordered table of field rules over raw text.
//!
//! Each rule is a regex plus a value function. A rule fires once per match
//! and every firing becomes its own Candidate; duplicates are left for the
//! reconciler. Qualified phrases carry [`EXACT`] confidence, bare keywords
//! [`KEYWORD`].

use innsight_core::normalize::name_start;
use innsight_core::vocab::{
    alternation, is_venue_name, street_address_pattern, venue_name_pattern, ATTRACTION_NOUNS,
    CUISINES, DINING_NOUNS,
};
use innsight_core::{Candidate, Evidence, FieldName, FieldValue, Span};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const EXACT: f32 = 0.9;
pub const KEYWORD: f32 = 0.5;

/// Time of day: `3 PM`, `3:00pm`, `11:00 a.m.`, `15:00`.
const TIME: &str = r"\d{1,2}(?::[0-5]\d)?\s?(?:[ap]\.m\.|[ap]m\b)|(?:[01]?\d|2[0-3]):[0-5]\d\b";

const MONEY: &str = r"[$€£]\s?\d[\d,]*(?:\.\d{2})?";

const PER_UNIT: &str = r"(?:\s*(?:/\s*|per\s+)(?:night|day|stay|hour)|\s+(?:nightly|daily))?";

/// A check-in/out keyword earlier in the same sentence.
const STAY_KEYWORD_BEFORE: &str =
    r"(?i)\b(?:check[\s-]?(?:in|out)|arrival|departure)\b[^.!?\n]*$";

/// Bytes before a match searched by [`Rule::not_after`].
const CONTEXT_WINDOW: usize = 32;

struct Rule {
    id: &'static str,
    field: FieldName,
    confidence: f32,
    re: Regex,
    /// Capture group whose text and span the candidate takes; 0 is the whole match.
    group: usize,
    value: fn(&str) -> FieldValue,
    /// The rule does not fire when this matches the text just before it.
    not_after: Option<Regex>,
}

fn verbatim(s: &str) -> FieldValue {
    FieldValue::text(s.trim())
}

fn lowercase(s: &str) -> FieldValue {
    FieldValue::text(s.trim().to_lowercase())
}

fn available(_: &str) -> FieldValue {
    FieldValue::text("available")
}

fn yes(_: &str) -> FieldValue {
    FieldValue::Flag(true)
}

fn no(_: &str) -> FieldValue {
    FieldValue::Flag(false)
}

fn rule(
    id: &'static str,
    field: FieldName,
    confidence: f32,
    pattern: &str,
    group: usize,
    value: fn(&str) -> FieldValue,
) -> Rule {
    Rule {
        id,
        field,
        confidence,
        re: Regex::new(pattern).unwrap_or_else(|e| panic!("pattern rule {id}: {e}")),
        group,
        value,
        not_after: None,
    }
}

impl Rule {
    fn not_after(mut self, pattern: &str) -> Self {
        self.not_after = Some(
            Regex::new(pattern).unwrap_or_else(|e| panic!("pattern rule {}: {e}", self.id)),
        );
        self
    }
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    use FieldName::*;

    vec![
        // ── Check-in / check-out ──
        rule(
            "checkin.phrase",
            CheckinTime,
            EXACT,
            &format!(
                r"(?i)\b(?:check[\s-]?in|arrival)(?:\s+time)?(?:\s+(?:begins|starts|is))?(?:\s+(?:at|from|after))?\s*:?\s*({TIME})"
            ),
            1,
            verbatim,
        ),
        rule(
            "checkout.phrase",
            CheckoutTime,
            EXACT,
            &format!(
                r"(?i)\b(?:check[\s-]?out|departure)(?:\s+time)?(?:\s+(?:is|ends))?(?:\s+(?:by|at|before|until))?\s*:?\s*({TIME})"
            ),
            1,
            verbatim,
        ),
        // ── Contact ──
        rule(
            "contact.phone",
            ContactPhone,
            EXACT,
            r"(?:\+?1[-.\s]?)?(?:\(\d{3}\)|\b\d{3})[-.\s]?\d{3}[-.\s]?\d{4}\b",
            0,
            verbatim,
        ),
        rule(
            "contact.email",
            ContactEmail,
            EXACT,
            r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            0,
            lowercase,
        ),
        rule(
            "address.street",
            ContactAddress,
            EXACT,
            &street_address_pattern(),
            0,
            verbatim,
        ),
        // ── Parking ──
        rule(
            "parking.qualified",
            ParkingAvailable,
            EXACT,
            r"(?i)\b(?:valet|free|complimentary|self|on-?site|covered|garage)[\s-]+parking\b|\bparking\s+(?:is\s+)?available\b",
            0,
            yes,
        ),
        rule(
            "parking.none",
            ParkingAvailable,
            EXACT,
            r"(?i)\bno\s+(?:on-?site\s+)?parking\b|\bparking\s+(?:is\s+)?(?:not\s+available|unavailable)\b",
            0,
            no,
        ),
        rule("parking.keyword", ParkingAvailable, KEYWORD, r"(?i)\bparking\b", 0, yes),
        rule(
            "parking.cost.after",
            ParkingCost,
            EXACT,
            &format!(r"(?i)\bparking\b[^.!?\n$€£]{{0,40}}({MONEY}{PER_UNIT})"),
            1,
            verbatim,
        ),
        rule(
            "parking.cost.before",
            ParkingCost,
            EXACT,
            &format!(
                r"(?i)({MONEY}{PER_UNIT})\s+(?:for\s+)?(?:valet\s+|self[\s-]?|on-?site\s+)?parking\b"
            ),
            1,
            verbatim,
        ),
        rule(
            "parking.cost.free",
            ParkingCost,
            EXACT,
            r"(?i)\b(?:free|complimentary)\s+(?:self[\s-]?|on-?site\s+)?parking\b|\bparking\s+(?:is\s+)?(?:free|complimentary|included)\b",
            0,
            |_| FieldValue::text("Free"),
        ),
        rule(
            "parking.type.valet",
            ParkingType,
            EXACT,
            r"(?i)\bvalet\b",
            0,
            |_| FieldValue::text("Valet"),
        ),
        rule(
            "parking.type.self",
            ParkingType,
            EXACT,
            r"(?i)\bself[\s-]?park(?:ing)?\b",
            0,
            |_| FieldValue::text("Self-park"),
        ),
        // ── Amenities ──
        rule(
            "wifi.phrase",
            Wifi,
            EXACT,
            r"(?i)\b(?:free|complimentary|high[\s-]speed)\s+(?:wi-?fi|wireless(?:\s+internet)?|internet)\b|\b(?:wi-?fi|internet)\s+(?:is\s+)?(?:available|included)\b",
            0,
            available,
        ),
        rule(
            "wifi.none",
            Wifi,
            EXACT,
            r"(?i)\bno\s+(?:free\s+)?(?:wi-?fi|internet|wireless)\b|\b(?:wi-?fi|internet|wireless(?:\s+internet)?)\s+(?:is\s+)?(?:not\s+(?:available|provided|offered|included)|unavailable)\b",
            0,
            |_| FieldValue::text("not available"),
        ),
        rule(
            "wifi.keyword",
            Wifi,
            KEYWORD,
            r"(?i)\b(?:wi-?fi|internet|wireless)\b",
            0,
            available,
        ),
        rule(
            "fitness.phrase",
            FitnessCenter,
            EXACT,
            r"(?i)\bfitness\s+cent(?:er|re)\b|\bgym\b",
            0,
            available,
        ),
        rule(
            "fitness.keyword",
            FitnessCenter,
            KEYWORD,
            r"(?i)\b(?:workout|exercise)\b",
            0,
            available,
        ),
        rule(
            "pool.typed",
            Pool,
            EXACT,
            r"(?i)\b(indoor|outdoor|heated|seasonal|rooftop)\s+(?:swimming\s+)?pool\b",
            1,
            lowercase,
        ),
        rule("pool.keyword", Pool, KEYWORD, r"(?i)\b(?:pool|swimming)\b", 0, available),
        rule(
            "pets.allowed",
            PetPolicy,
            EXACT,
            r"(?i)\bpet[\s-]friendly\b|\bpets?\s+(?:are\s+)?(?:welcome|allowed)\b",
            0,
            |_| FieldValue::text("allowed"),
        ),
        rule(
            "pets.denied",
            PetPolicy,
            EXACT,
            r"(?i)\bno\s+pets\b|\bpets?\s+(?:are\s+)?not\s+(?:allowed|permitted)\b",
            0,
            |_| FieldValue::text("not allowed"),
        ),
        // ── Dining ──
        rule(
            "restaurant.name",
            Restaurants,
            EXACT,
            &venue_name_pattern(DINING_NOUNS, true),
            0,
            verbatim,
        ),
        rule(
            "restaurant.cuisine",
            RestaurantCuisine,
            KEYWORD,
            &format!(r"(?i)\b(?:{})\b", alternation(CUISINES)),
            0,
            lowercase,
        ),
        rule(
            "restaurant.hours",
            RestaurantHours,
            EXACT,
            &format!(r"(?i)\b(?:{TIME})\s*(?:-|–|to)\s*(?:{TIME})"),
            0,
            verbatim,
        )
        .not_after(STAY_KEYWORD_BEFORE),
        // ── Attractions ──
        rule(
            "attraction.name",
            NearbyAttractions,
            EXACT,
            &venue_name_pattern(ATTRACTION_NOUNS, false),
            0,
            verbatim,
        ),
        rule(
            "attraction.distance",
            AttractionDistance,
            EXACT,
            r"(?i)\b\d+(?:\.\d+)?[\s-]*(?:miles?|mi|km|kilometers?|kilometres?|blocks?|minutes?|mins?)(?:\s+(?:walk|drive|away))?\b",
            0,
            verbatim,
        ),
    ]
});

/// Stateless rule-based extractor.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, text: &str) -> Vec<Candidate> {
        let mut out = Vec::new();
        for rule in RULES.iter() {
            for caps in rule.re.captures_iter(text) {
                if let Some(candidate) = rule.fire(text, &caps) {
                    out.push(candidate);
                }
            }
        }
        out
    }
}

impl Rule {
    fn fire(&self, text: &str, caps: &Captures<'_>) -> Option<Candidate> {
        let m = caps.get(self.group)?;
        if let Some(re) = &self.not_after {
            let mut from = m.start().saturating_sub(CONTEXT_WINDOW);
            while !text.is_char_boundary(from) {
                from -= 1;
            }
            if re.is_match(&text[from..m.start()]) {
                return None;
            }
        }

        let nouns = match self.field {
            FieldName::Restaurants => Some(DINING_NOUNS),
            FieldName::NearbyAttractions => Some(ATTRACTION_NOUNS),
            _ => None,
        };
        let mut start = m.start();
        if nouns.is_some() {
            start += name_start(m.as_str());
        }
        let raw = &m.as_str()[start - m.start()..];
        if raw.trim().is_empty() || nouns.is_some_and(|n| !is_venue_name(raw, n)) {
            return None;
        }
        Some(Candidate::new(
            self.field,
            (self.value)(raw),
            Evidence::Pattern {
                rule: self.id.to_string(),
            },
            Span::new(start, m.end()),
            self.confidence,
        ))
    }
}
