//! Target-audience rule table.
//!
//! A label applies when any of its trigger phrases appears, as whole words,
//! in a reconciled text value or in a matched anchor phrase.

use std::collections::{BTreeMap, BTreeSet};

use innsight_core::{FieldName, FieldSlot, FieldValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudienceRule {
    pub label: String,
    pub triggers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudienceRules {
    rules: Vec<AudienceRule>,
}

impl Default for AudienceRules {
    fn default() -> Self {
        Self::empty()
            .with_rule(
                "Luxury",
                ["valet", "spa", "fine dining", "concierge", "suite", "butler"],
            )
            .with_rule(
                "Family",
                ["free breakfast", "kids", "children", "family", "playground"],
            )
            .with_rule("Business", ["business center", "meeting room", "conference"])
            .with_rule("Leisure", ["pool", "beach", "resort", "golf"])
    }
}

/// Lowercase words joined by single spaces, padded so that phrase lookups
/// only match on word boundaries.
fn words(s: &str) -> String {
    let joined = s
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    format!(" {joined} ")
}

impl AudienceRules {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a rule, or extend the triggers of an existing label.
    pub fn with_rule<I, S>(mut self, label: &str, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let triggers = triggers.into_iter().map(Into::into);
        match self.rules.iter_mut().find(|r| r.label == label) {
            Some(rule) => rule.triggers.extend(triggers),
            None => self.rules.push(AudienceRule {
                label: label.to_string(),
                triggers: triggers.collect(),
            }),
        }
        self
    }

    pub fn rules(&self) -> &[AudienceRule] {
        &self.rules
    }

    /// Labels triggered by the given texts.
    pub fn classify<'a>(&self, texts: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
        let haystacks: Vec<String> = texts.into_iter().map(words).collect();
        self.rules
            .iter()
            .filter(|rule| {
                rule.triggers.iter().any(|t| {
                    let needle = words(t);
                    !needle.trim().is_empty() && haystacks.iter().any(|h| h.contains(&needle))
                })
            })
            .map(|rule| rule.label.clone())
            .collect()
    }

    /// Labels for a reconciled document: selected text values of every slot
    /// plus the anchor phrases the semantic scorer matched.
    pub fn evaluate(
        &self,
        slots: &BTreeMap<FieldName, FieldSlot>,
        matched_anchors: &BTreeSet<String>,
    ) -> BTreeSet<String> {
        let values = slots.values().filter_map(|slot| match slot.value()? {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        });
        self.classify(values.chain(matched_anchors.iter().map(String::as_str)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use innsight_core::{Candidate, Evidence, Span};

    #[test]
    fn whole_word_matching() {
        let rules = AudienceRules::default();
        assert_eq!(rules.classify(["Valet"]), BTreeSet::from(["Luxury".to_string()]));
        assert!(rules.classify(["poolside suites"]).is_empty());
        assert_eq!(
            rules.classify(["Kids eat free", "Rooftop pool"]),
            BTreeSet::from(["Family".to_string(), "Leisure".to_string()])
        );
        assert!(rules.classify(std::iter::empty::<&str>()).is_empty());
    }

    #[test]
    fn table_is_extensible() {
        let rules = AudienceRules::default()
            .with_rule("Pet Owners", ["dog park"])
            .with_rule("Business", ["coworking"]);
        assert_eq!(rules.rules().len(), 5);
        assert_eq!(
            rules.classify(["Shared coworking space near the dog park"]),
            BTreeSet::from(["Business".to_string(), "Pet Owners".to_string()])
        );
    }

    #[test]
    fn evaluates_slots_and_anchors() {
        let mut slots = BTreeMap::new();
        let mut slot = FieldSlot::absent(FieldName::ParkingType);
        let valet = Candidate::new(
            FieldName::ParkingType,
            FieldValue::text("Valet"),
            Evidence::Pattern { rule: "parking.type.valet".into() },
            Span::new(0, 5),
            0.9,
        );
        slot.candidates.push(valet.clone());
        slot.selected = Some(valet);
        slots.insert(FieldName::ParkingType, slot);

        let anchors = BTreeSet::from(["meeting room".to_string()]);
        assert_eq!(
            AudienceRules::default().evaluate(&slots, &anchors),
            BTreeSet::from(["Business".to_string(), "Luxury".to_string()])
        );
    }
}
