//! Record Builder: reconciled slots plus metadata in, [`CanonicalRecord`] out.
//!
//! Restaurant and attraction entries are grouped around name candidates.
//! Names that normalise equal or whose spans overlap are one entity; each
//! entry attribute (cuisine, hours, distance) joins the nearest entity
//! within the grouping window and is dropped otherwise.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use innsight_core::{
    normalize_value, AttractionEntry, CanonicalRecord, Candidate, Contact, EngineConfig,
    FieldName, FieldReport, FieldSlot, FieldState, Parking, RawDocument, RestaurantEntry,
    SchemaViolation, Span,
};
use tracing::debug;

/// Where the record came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMeta {
    pub source_url: String,
    pub fetched_at: DateTime<Utc>,
}

impl From<&RawDocument> for SourceMeta {
    fn from(doc: &RawDocument) -> Self {
        Self {
            source_url: doc.source_url().to_string(),
            fetched_at: doc.fetched_at(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RecordBuilder {
    grouping_window: usize,
}

impl Default for RecordBuilder {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

/// True when `a` should be preferred over `b` as an entity's name or attribute.
fn outranks(a: &Candidate, b: &Candidate) -> bool {
    a.local_confidence
        .total_cmp(&b.local_confidence)
        .then_with(|| b.source().cmp(&a.source()))
        .then_with(|| b.span.start.cmp(&a.span.start))
        .is_gt()
}

struct Group<'a> {
    key: String,
    name: &'a Candidate,
    spans: Vec<Span>,
    attrs: BTreeMap<FieldName, &'a Candidate>,
}

impl Group<'_> {
    fn distance(&self, span: &Span) -> usize {
        self.spans
            .iter()
            .map(|s| s.distance(span))
            .min()
            .unwrap_or(usize::MAX)
    }

    fn attr(&self, field: FieldName) -> FieldState<String> {
        self.attrs.get(&field).map(|c| c.value.to_string()).into()
    }
}

impl RecordBuilder {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            grouping_window: config.grouping_window,
        }
    }

    /// Assemble a record. Every schema field must have a slot, resolved or
    /// not; a missing slot is a [`SchemaViolation::MissingKey`].
    pub fn build(
        &self,
        slots: &BTreeMap<FieldName, FieldSlot>,
        confidence_score: f32,
        sentiment_score: f32,
        target_audience: BTreeSet<String>,
        source: &SourceMeta,
    ) -> Result<CanonicalRecord, SchemaViolation> {
        for field in FieldName::ALL {
            if !slots.contains_key(&field) {
                return Err(SchemaViolation::MissingKey(field.as_str().to_string()));
            }
        }
        let slot = |field: FieldName| &slots[&field];
        let text = |field: FieldName| -> FieldState<String> {
            slot(field).value().map(|v| v.to_string()).into()
        };

        let restaurants = self
            .group(
                &slot(FieldName::Restaurants).candidates,
                [FieldName::RestaurantCuisine, FieldName::RestaurantHours]
                    .iter()
                    .flat_map(|&f| &slot(f).candidates),
            )
            .into_iter()
            .map(|g| RestaurantEntry {
                name: g.name.value.to_string(),
                cuisine: g.attr(FieldName::RestaurantCuisine),
                hours: g.attr(FieldName::RestaurantHours),
            })
            .collect();
        let nearby_attractions = self
            .group(
                &slot(FieldName::NearbyAttractions).candidates,
                slot(FieldName::AttractionDistance).candidates.iter(),
            )
            .into_iter()
            .map(|g| AttractionEntry {
                name: g.name.value.to_string(),
                distance: g.attr(FieldName::AttractionDistance),
            })
            .collect();

        let fields = FieldName::CANONICAL
            .iter()
            .map(|&field| {
                let s = slot(field);
                let report = FieldReport {
                    confidence: s.resolved_confidence,
                    source: s.selected.as_ref().map(Candidate::source).into(),
                    candidates: s.candidates.len(),
                };
                (field, report)
            })
            .collect();

        Ok(CanonicalRecord {
            source_url: source.source_url.clone(),
            fetched_at: source.fetched_at,
            contact: Contact {
                phone: text(FieldName::ContactPhone),
                email: text(FieldName::ContactEmail),
                address: text(FieldName::ContactAddress),
            },
            checkin_time: text(FieldName::CheckinTime),
            checkout_time: text(FieldName::CheckoutTime),
            parking: Parking {
                available: slot(FieldName::ParkingAvailable)
                    .value()
                    .and_then(|v| v.as_flag())
                    .into(),
                cost: text(FieldName::ParkingCost),
                kind: text(FieldName::ParkingType),
            },
            wifi: text(FieldName::Wifi),
            fitness_center: text(FieldName::FitnessCenter),
            pool: text(FieldName::Pool),
            pet_policy: text(FieldName::PetPolicy),
            restaurants,
            nearby_attractions,
            confidence_score: confidence_score.clamp(0.0, 1.0),
            sentiment_score: sentiment_score.clamp(0.0, 1.0),
            target_audience,
            fields,
        })
    }

    fn group<'a>(
        &self,
        names: &'a [Candidate],
        attributes: impl Iterator<Item = &'a Candidate>,
    ) -> Vec<Group<'a>> {
        let mut ordered: Vec<&Candidate> = names.iter().collect();
        ordered.sort_by_key(|c| c.span.start);

        let mut groups: Vec<Group<'a>> = Vec::new();
        for candidate in ordered {
            let key = normalize_value(candidate.field, &candidate.value);
            let existing = groups
                .iter()
                .position(|g| g.key == key || g.spans.iter().any(|s| s.overlaps(&candidate.span)));
            match existing {
                Some(i) => {
                    let group = &mut groups[i];
                    group.spans.push(candidate.span);
                    if outranks(candidate, group.name) {
                        group.name = candidate;
                    }
                }
                None => groups.push(Group {
                    key,
                    name: candidate,
                    spans: vec![candidate.span],
                    attrs: BTreeMap::new(),
                }),
            }
        }

        for attr in attributes {
            // ties go to the earlier entity
            let nearest = groups
                .iter()
                .enumerate()
                .map(|(i, g)| (g.distance(&attr.span), i))
                .min();
            match nearest {
                Some((d, i)) if d <= self.grouping_window => {
                    let kept = groups[i].attrs.entry(attr.field).or_insert(attr);
                    if outranks(attr, kept) {
                        *kept = attr;
                    }
                }
                _ => debug!(
                    field = %attr.field,
                    value = %attr.value,
                    start = attr.span.start,
                    "attribute not near any named entity, dropped"
                ),
            }
        }
        groups
    }
}
