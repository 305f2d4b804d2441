//! Value normalisation for agreement checks.
//!
//! Two candidates "agree" when their normalised forms are equal. The rules
//! are per field kind:
//!
//! - free text: lowercase, collapse whitespace, trim trailing punctuation
//! - phone numbers: digits only, US country code dropped (`+1 555 123 4567` = `(555) 123-4567`)
//! - times: `3 PM`, `3:00pm`, `03:00 p.m.` all become `3:00 pm`
//! - addresses: commas dropped, street abbreviations spelled out (`St` = `Street`)
//! - costs: unit suffixes removed (`$25/night` = `$25 per night` = `$25`),
//!   `.00` cents dropped, and `complimentary` / `no charge` folded into `free`

use once_cell::sync::Lazy;
use regex::Regex;

use crate::field::{FieldName, FieldValue};

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*([ap])\.?\s*m\b\.?").expect("time regex")
});

static COST_UNIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*(?:/\s*|per\s+|a\s+|each\s+)(?:night|day|hour|stay|vehicle|car)\b|\s*(?:nightly|daily|hourly)\b")
        .expect("cost unit regex")
});

static ZERO_CENTS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d)\.00\b").expect("zero cents regex"));

/// Normalise a value for comparison against other candidates of `field`.
pub fn normalize_value(field: FieldName, value: &FieldValue) -> String {
    match value {
        FieldValue::Flag(b) => b.to_string(),
        FieldValue::Number(n) => format!("{n}"),
        FieldValue::Text(s) => match field {
            FieldName::ContactPhone => normalize_phone(s),
            FieldName::CheckinTime | FieldName::CheckoutTime | FieldName::RestaurantHours => {
                normalize_times(s)
            }
            FieldName::ParkingCost => normalize_cost(s),
            FieldName::ContactAddress => normalize_address(s),
            _ => normalize_text(s),
        },
    }
}

/// Lowercase, collapse runs of whitespace, and trim surrounding punctuation.
pub fn normalize_text(s: &str) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?'))
        .to_lowercase()
}

/// Digits only; an 11-digit number starting with 1 loses the country code.
pub fn normalize_phone(s: &str) -> String {
    let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 11 && digits.starts_with('1') {
        digits[1..].to_string()
    } else {
        digits
    }
}

/// Rewrite every time of day in `s` as `H:MM am|pm`.
pub fn normalize_times(s: &str) -> String {
    let rewritten = TIME_RE.replace_all(s, |caps: &regex::Captures<'_>| {
        let hour: u32 = caps[1].parse().unwrap_or(0);
        let minute = caps.get(2).map_or("00", |m| m.as_str());
        let meridiem = caps[3].to_ascii_lowercase();
        format!("{hour}:{minute} {meridiem}m")
    });
    normalize_text(&rewritten)
}

/// Words that often precede a capitalised place name at the start of a
/// sentence without being part of it.
const NAME_FILLERS: &[&str] = &[
    "Visit", "Enjoy", "Explore", "Discover", "Try", "Dine", "Near", "Nearby", "At", "Our",
    "From", "To", "And", "Or", "Walk", "Stroll", "Relax", "Stay", "Call",
];

/// Byte offset at which a captured name really starts, skipping filler words.
pub fn name_start(s: &str) -> usize {
    let mut offset = 0;
    for word in s.split(' ') {
        if NAME_FILLERS.contains(&word) {
            offset += word.len() + 1;
        } else {
            break;
        }
    }
    offset.min(s.len())
}

const STREET_ABBREVIATIONS: &[(&str, &str)] = &[
    ("st", "street"),
    ("ave", "avenue"),
    ("blvd", "boulevard"),
    ("rd", "road"),
    ("dr", "drive"),
    ("ln", "lane"),
    ("pl", "place"),
    ("ct", "court"),
    ("pkwy", "parkway"),
    ("hwy", "highway"),
];

pub fn normalize_address(s: &str) -> String {
    normalize_text(&s.replace(',', " "))
        .split(' ')
        .map(|word| {
            let bare = word.trim_end_matches('.');
            STREET_ABBREVIATIONS
                .iter()
                .find(|(short, _)| *short == bare)
                .map_or(bare, |(_, long)| *long)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn normalize_cost(s: &str) -> String {
    let lower = normalize_text(s);
    if ["free", "complimentary", "no charge", "included"]
        .iter()
        .any(|w| lower.contains(w))
    {
        return "free".to_string();
    }
    let stripped = COST_UNIT_RE.replace_all(&lower, "");
    let stripped = ZERO_CENTS_RE.replace_all(&stripped, "$1");
    normalize_text(&stripped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_case_and_whitespace() {
        assert_eq!(normalize_text("  Valet \n Parking. "), "valet parking");
    }

    #[test]
    fn phone_variants_agree() {
        assert_eq!(normalize_phone("(555) 123-4567"), "5551234567");
        assert_eq!(normalize_phone("+1 555.123.4567"), "5551234567");
        assert_eq!(normalize_phone("555-123-4567"), "5551234567");
    }

    #[test]
    fn time_variants_agree() {
        assert_eq!(normalize_times("3:00 PM"), "3:00 pm");
        assert_eq!(normalize_times("3 pm"), "3:00 pm");
        assert_eq!(normalize_times("03:00 p.m."), "3:00 pm");
        assert_eq!(normalize_times("11:00AM"), "11:00 am");
    }

    #[test]
    fn time_ranges_normalise_each_end() {
        assert_eq!(normalize_times("7 AM - 10:30 PM"), "7:00 am - 10:30 pm");
    }

    #[test]
    fn cost_units_stripped() {
        assert_eq!(normalize_cost("$25/night"), "$25");
        assert_eq!(normalize_cost("$25 per night"), "$25");
        assert_eq!(normalize_cost("$25.00 nightly"), "$25");
        assert_eq!(normalize_cost("$25"), "$25");
        assert_eq!(normalize_cost("$12.50 / day"), "$12.50");
    }

    #[test]
    fn free_variants_fold() {
        assert_eq!(normalize_cost("Complimentary"), "free");
        assert_eq!(normalize_cost("free of charge"), "free");
    }

    #[test]
    fn address_abbreviations_agree() {
        assert_eq!(
            normalize_address("123 Main St., Springfield, IL 62701"),
            normalize_address("123 Main Street Springfield IL 62701")
        );
        assert_eq!(normalize_address("9 Ocean Blvd"), "9 ocean boulevard");
    }

    #[test]
    fn fillers_skipped_in_names() {
        let s = "Visit Central Park";
        assert_eq!(&s[name_start(s)..], "Central Park");
        assert_eq!(name_start("The Harbor Grill"), 0);
    }

    #[test]
    fn dispatch_by_field() {
        let v = FieldValue::text("(555) 123-4567");
        assert_eq!(normalize_value(FieldName::ContactPhone, &v), "5551234567");
        assert_eq!(
            normalize_value(FieldName::ParkingAvailable, &FieldValue::Flag(true)),
            "true"
        );
        assert_eq!(
            normalize_value(FieldName::ParkingType, &FieldValue::text("Valet")),
            "valet"
        );
    }
}
