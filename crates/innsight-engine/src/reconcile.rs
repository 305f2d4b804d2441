//! Reconciler: one winner per field and the overall confidence score.
//!
//! Candidates are grouped by field. Within a field, candidates whose
//! normalised values agree across at least two extractor sources each get
//! [`AGREEMENT_BONUS`]. The winner has the highest effective confidence;
//! ties go to the stronger source (pattern > ner > semantic), then to the
//! earlier span, then to input order. A candidate with zero confidence is
//! kept in its slot but never selected.
//!
//! `confidence_score` sums the resolved confidences of the canonical fields
//! and divides by the number of canonical fields, so an absent field counts
//! as zero.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use innsight_core::{normalize_value, Candidate, ExtractorSource, FieldName, FieldSlot, SchemaViolation};
use serde::Serialize;

pub const AGREEMENT_BONUS: f32 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    /// One slot for every field in the schema, resolved or not.
    pub slots: BTreeMap<FieldName, FieldSlot>,
    pub confidence_score: f32,
}

impl Reconciliation {
    pub fn slot(&self, field: FieldName) -> Option<&FieldSlot> {
        self.slots.get(&field)
    }
}

/// Reconcile a flat candidate list. Any malformed candidate rejects the
/// whole list.
pub fn reconcile(candidates: &[Candidate]) -> Result<Reconciliation, SchemaViolation> {
    for candidate in candidates {
        candidate.validate()?;
    }

    let mut slots: BTreeMap<FieldName, FieldSlot> = FieldName::ALL
        .iter()
        .map(|&field| (field, FieldSlot::absent(field)))
        .collect();
    for candidate in candidates {
        if let Some(slot) = slots.get_mut(&candidate.field) {
            slot.candidates.push(candidate.clone());
        }
    }
    for slot in slots.values_mut() {
        resolve(slot);
    }

    // fold from +0.0: an empty f32 sum is -0.0
    let total = FieldName::CANONICAL
        .iter()
        .filter_map(|f| slots.get(f))
        .filter(|s| s.is_resolved())
        .fold(0.0_f32, |acc, s| acc + s.resolved_confidence);
    let confidence_score = (total / FieldName::CANONICAL.len() as f32).clamp(0.0, 1.0);

    Ok(Reconciliation {
        slots,
        confidence_score,
    })
}

fn resolve(slot: &mut FieldSlot) {
    if slot.candidates.is_empty() {
        return;
    }

    let keys: Vec<String> = slot
        .candidates
        .iter()
        .map(|c| normalize_value(c.field, &c.value))
        .collect();
    let eligible = |c: &Candidate| c.local_confidence > 0.0;
    let mut sources: BTreeMap<&str, BTreeSet<ExtractorSource>> = BTreeMap::new();
    for (key, c) in keys.iter().zip(&slot.candidates) {
        if eligible(c) {
            sources.entry(key.as_str()).or_default().insert(c.source());
        }
    }
    let effective: Vec<f32> = keys
        .iter()
        .zip(&slot.candidates)
        .map(|(key, c)| {
            if sources.get(key.as_str()).is_some_and(|s| s.len() >= 2) {
                (c.local_confidence + AGREEMENT_BONUS).min(1.0)
            } else {
                c.local_confidence
            }
        })
        .collect();

    let winner = (0..slot.candidates.len())
        .filter(|&i| eligible(&slot.candidates[i]))
        .reduce(|best, i| {
            match rank(&slot.candidates[i], effective[i], &slot.candidates[best], effective[best]) {
                Ordering::Greater => i,
                _ => best,
            }
        });
    if let Some(i) = winner {
        slot.selected = Some(slot.candidates[i].clone());
        slot.resolved_confidence = effective[i];
    }
}

/// `Greater` when `a` should win over `b`. Equal ranks keep the earlier
/// candidate in input order.
fn rank(a: &Candidate, a_conf: f32, b: &Candidate, b_conf: f32) -> Ordering {
    a_conf
        .total_cmp(&b_conf)
        .then_with(|| b.source().cmp(&a.source()))
        .then_with(|| b.span.start.cmp(&a.span.start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use innsight_core::{EntityKind, Evidence, FieldValue, Span};

    fn pattern(field: FieldName, value: &str, conf: f32, start: usize) -> Candidate {
        Candidate::new(
            field,
            FieldValue::text(value),
            Evidence::Pattern { rule: "test".into() },
            Span::new(start, start + value.len()),
            conf,
        )
    }

    fn ner(field: FieldName, value: &str, conf: f32, start: usize) -> Candidate {
        Candidate::new(
            field,
            FieldValue::text(value),
            Evidence::Ner {
                entity: EntityKind::Time,
            },
            Span::new(start, start + value.len()),
            conf,
        )
    }

    #[test]
    fn no_candidates_all_absent() {
        let r = reconcile(&[]).unwrap();
        assert_eq!(r.slots.len(), FieldName::ALL.len());
        assert!(r.slots.values().all(|s| !s.is_resolved()));
        assert_eq!(r.confidence_score, 0.0);
        assert!(r.confidence_score.is_sign_positive());
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.ends_with(r#""confidence_score":0.0}"#), "{json}");
    }

    #[test]
    fn zero_confidence_never_selected() {
        let r = reconcile(&[pattern(FieldName::Pool, "available", 0.0, 0)]).unwrap();
        let slot = r.slot(FieldName::Pool).unwrap();
        assert_eq!(slot.candidates.len(), 1);
        assert!(!slot.is_resolved());
        assert_eq!(r.confidence_score, 0.0);

        // no agreement bonus from a zero-confidence partner either
        let r = reconcile(&[
            pattern(FieldName::Pool, "available", 0.5, 0),
            ner(FieldName::Pool, "available", 0.0, 10),
        ])
        .unwrap();
        assert_eq!(r.slot(FieldName::Pool).unwrap().resolved_confidence, 0.5);
    }

    #[test]
    fn pattern_wins_tie_with_ner() {
        let r = reconcile(&[
            ner(FieldName::CheckinTime, "2:00 PM", 0.7, 0),
            pattern(FieldName::CheckinTime, "3:00 PM", 0.7, 20),
        ])
        .unwrap();
        let slot = r.slot(FieldName::CheckinTime).unwrap();
        let winner = slot.selected.as_ref().unwrap();
        assert_eq!(winner.source(), ExtractorSource::Pattern);
        assert_eq!(winner.value, FieldValue::text("3:00 PM"));
        assert_eq!(slot.resolved_confidence, 0.7);
    }

    #[test]
    fn higher_confidence_beats_precedence() {
        let r = reconcile(&[
            pattern(FieldName::Wifi, "available", 0.5, 0),
            ner(FieldName::Wifi, "free", 0.7, 10),
        ])
        .unwrap();
        let winner = r.slot(FieldName::Wifi).unwrap().selected.as_ref().unwrap();
        assert_eq!(winner.source(), ExtractorSource::Ner);
    }

    #[test]
    fn earlier_span_breaks_remaining_tie() {
        let r = reconcile(&[
            pattern(FieldName::ContactPhone, "555-000-1111", 0.9, 40),
            pattern(FieldName::ContactPhone, "555-222-3333", 0.9, 5),
        ])
        .unwrap();
        let winner = r.slot(FieldName::ContactPhone).unwrap().selected.as_ref().unwrap();
        assert_eq!(winner.value, FieldValue::text("555-222-3333"));
    }

    #[test]
    fn agreement_across_sources_adds_bonus() {
        let r = reconcile(&[
            pattern(FieldName::CheckinTime, "3:00 PM", 0.9, 10),
            ner(FieldName::CheckinTime, "3 pm", 0.7, 10),
        ])
        .unwrap();
        let slot = r.slot(FieldName::CheckinTime).unwrap();
        assert_eq!(slot.resolved_confidence, 1.0);
        assert_eq!(slot.selected.as_ref().unwrap().source(), ExtractorSource::Pattern);

        let r = reconcile(&[
            pattern(FieldName::ParkingCost, "$25/night", 0.6, 0),
            ner(FieldName::ParkingCost, "$25", 0.5, 0),
        ])
        .unwrap();
        let slot = r.slot(FieldName::ParkingCost).unwrap();
        assert!((slot.resolved_confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn same_source_agreement_has_no_bonus() {
        let r = reconcile(&[
            pattern(FieldName::Wifi, "available", 0.5, 0),
            pattern(FieldName::Wifi, "available", 0.5, 20),
        ])
        .unwrap();
        assert_eq!(r.slot(FieldName::Wifi).unwrap().resolved_confidence, 0.5);
    }

    #[test]
    fn confidence_is_completeness_weighted() {
        let r = reconcile(&[
            pattern(FieldName::CheckinTime, "3:00 PM", 0.9, 0),
            pattern(FieldName::CheckoutTime, "11:00 AM", 0.9, 20),
            // entry attributes never count
            pattern(FieldName::RestaurantCuisine, "italian", 0.5, 40),
        ])
        .unwrap();
        let expected = 1.8 / 13.0;
        assert!((r.confidence_score - expected).abs() < 1e-6);
        assert!(r.slot(FieldName::RestaurantCuisine).unwrap().is_resolved());
    }

    #[test]
    fn malformed_candidate_rejected() {
        let mut bad = pattern(FieldName::Pool, "available", 0.9, 0);
        bad.local_confidence = 1.5;
        assert!(matches!(
            reconcile(&[bad]),
            Err(SchemaViolation::Confidence { .. })
        ));

        let flag_as_text = pattern(FieldName::ParkingAvailable, "yes", 0.9, 0);
        assert!(matches!(
            reconcile(&[flag_as_text]),
            Err(SchemaViolation::ValueKind { .. })
        ));
    }

    #[test]
    fn unknown_field_name_rejected_at_parse() {
        let json = r#"[{"field":"spa_hours","value":"9 AM","evidence":{"source":"pattern","rule":"x"},"span":{"start":0,"end":4},"local_confidence":0.9}]"#;
        let err = serde_json::from_str::<Vec<Candidate>>(json).unwrap_err();
        assert!(err.to_string().contains("spa_hours"));
    }

    #[test]
    fn reconcile_is_deterministic() {
        let candidates = vec![
            pattern(FieldName::Wifi, "available", 0.5, 3),
            ner(FieldName::Wifi, "Available", 0.7, 9),
            pattern(FieldName::Pool, "heated", 0.9, 30),
        ];
        let a = serde_json::to_string(&reconcile(&candidates).unwrap()).unwrap();
        let b = serde_json::to_string(&reconcile(&candidates).unwrap()).unwrap();
        assert_eq!(a, b);
    }
}
