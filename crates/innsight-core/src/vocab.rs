//! Shared hospitality vocabulary used by the pattern rules and the
//! rule-based recognizer.

/// Nouns that end the name of a dining venue.
pub const DINING_NOUNS: &[&str] = &[
    "Restaurant",
    "Bistro",
    "Grill",
    "Cafe",
    "Café",
    "Steakhouse",
    "Kitchen",
    "Brasserie",
    "Trattoria",
    "Bar",
    "Lounge",
    "Tavern",
    "Diner",
];

/// Nouns that end the name of a nearby attraction.
pub const ATTRACTION_NOUNS: &[&str] = &[
    "Museum",
    "Park",
    "Theater",
    "Theatre",
    "Gallery",
    "Zoo",
    "Aquarium",
    "Stadium",
    "Arena",
    "Beach",
    "Square",
    "Market",
    "Mall",
    "Garden",
    "Gardens",
    "Pier",
    "Cathedral",
    "Monument",
];

pub const CUISINES: &[&str] = &[
    "italian",
    "french",
    "american",
    "asian",
    "mexican",
    "japanese",
    "chinese",
    "indian",
    "thai",
    "mediterranean",
    "seafood",
    "steakhouse",
    "sushi",
    "farm-to-table",
];

/// Street-type words that close a street address, long and short forms.
pub const STREET_SUFFIXES: &[&str] = &[
    "Street", "St", "Avenue", "Ave", "Boulevard", "Blvd", "Road", "Rd", "Drive", "Dr", "Lane",
    "Ln", "Way", "Place", "Pl", "Court", "Ct", "Parkway", "Pkwy", "Highway", "Hwy", "Terrace",
    "Plaza",
];

/// Words that can open a name without naming anything ("The Grill").
const ARTICLES: &[&str] = &["the", "a", "an", "our", "its", "le", "la", "el"];

/// Regex alternation of `nouns`, e.g. `Museum|Park|...`.
pub fn alternation(nouns: &[&str]) -> String {
    nouns.join("|")
}

/// Regex for a capitalised venue name closed by one of `nouns`
/// ("The Harbor Grill"). With `leading`, capitalised words may also follow
/// the noun ("Cafe Luna"), and a bare noun matches too; callers filter the
/// match with [`is_venue_name`]. Capitals may be non-ASCII.
pub fn venue_name_pattern(nouns: &[&str], leading: bool) -> String {
    let nouns = alternation(nouns);
    let word = r"\p{Lu}[\w'&]*";
    if leading {
        format!(r"\b(?:{word}\s+){{0,4}}(?:{nouns})(?:\s+{word}){{0,3}}\b")
    } else {
        format!(r"\b(?:{word}\s+){{1,4}}(?:{nouns})\b")
    }
}

/// Regex for a street address: house number, capitalised street name and
/// a [`STREET_SUFFIXES`] word, then an optional city and `ST 12345` tail.
pub fn street_address_pattern() -> String {
    let suffixes = alternation(STREET_SUFFIXES);
    format!(
        r"\b\d{{1,5}}\s+(?:\p{{Lu}}[\w']*\s+){{1,4}}(?:{suffixes})\b(?:,\s*\p{{Lu}}[\w']*(?:\s+\p{{Lu}}[\w']*){{0,2}})?(?:,?\s+[A-Z]{{2}}\s+\d{{5}}(?:-\d{{4}})?)?"
    )
}

fn is_noun(word: &str, nouns: &[&str]) -> bool {
    let word = word.trim_matches(|c: char| !c.is_alphanumeric());
    nouns.iter().any(|n| n.to_lowercase() == word.to_lowercase())
}

/// True when `name` is a venue name: its first or last word is one of
/// `nouns`, and some other word actually names it. "Enjoy Our Restaurant"
/// after filler stripping is just "Our Restaurant" and does not count.
pub fn is_venue_name(name: &str, nouns: &[&str]) -> bool {
    let words: Vec<&str> = name.split_whitespace().collect();
    let (Some(first), Some(last)) = (words.first(), words.last()) else {
        return false;
    };
    if !is_noun(first, nouns) && !is_noun(last, nouns) {
        return false;
    }
    words
        .iter()
        .any(|w| !is_noun(w, nouns) && !ARTICLES.contains(&w.to_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn venue_names_by_first_or_last_word() {
        assert!(is_venue_name("The Harbor Grill", DINING_NOUNS));
        assert!(is_venue_name("Cafe Luna", DINING_NOUNS));
        assert!(is_venue_name("Café Étoile", DINING_NOUNS));
        assert!(is_venue_name("Central park,", ATTRACTION_NOUNS));
        assert!(!is_venue_name("Grand Grill Master", DINING_NOUNS));
        assert!(!is_venue_name("200 Museum Drive", ATTRACTION_NOUNS));
    }

    #[test]
    fn bare_nouns_are_not_names() {
        assert!(!is_venue_name("Restaurant", DINING_NOUNS));
        assert!(!is_venue_name("Our Restaurant", DINING_NOUNS));
        assert!(!is_venue_name("The Bar", DINING_NOUNS));
        assert!(!is_venue_name("", DINING_NOUNS));
    }

    #[test]
    fn street_addresses() {
        let re = Regex::new(&street_address_pattern()).unwrap();
        let found = |s: &str| re.find(s).map(|m| m.as_str().to_string());
        assert_eq!(
            found("Located at 123 Main Street, Springfield, IL 62701."),
            Some("123 Main Street, Springfield, IL 62701".into())
        );
        assert_eq!(found("We are at 9 Ocean Blvd."), Some("9 Ocean Blvd".into()));
        assert_eq!(found("Check-in: 3:00 PM"), None);
        assert_eq!(found("a 10 minute walk"), None);
    }

    #[test]
    fn name_pattern_leading_and_unicode() {
        let re = Regex::new(&venue_name_pattern(DINING_NOUNS, true)).unwrap();
        let found = |s: &str| re.find(s).map(|m| m.as_str().to_string());
        assert_eq!(found("we love Cafe Luna today"), Some("Cafe Luna".into()));
        assert_eq!(found("Try Cafe Luna today"), Some("Try Cafe Luna".into()));
        assert_eq!(found("dine at Café Étoile"), Some("Café Étoile".into()));
        assert_eq!(found("see Élan Bistro"), Some("Élan Bistro".into()));

        let trailing = Regex::new(&venue_name_pattern(ATTRACTION_NOUNS, false)).unwrap();
        assert!(trailing.find("Park Avenue").is_none());
        assert!(trailing.find("Lincoln Park").is_some());
    }
}
