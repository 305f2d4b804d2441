//! Vertical terminal card, one section per group of fields.

use std::fmt::Write;

use innsight_core::{CanonicalRecord, FieldName};

use crate::sentiment_label;
use crate::text::{audience, yes_no};

fn row(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "  {label:<26} {value}");
}

pub(crate) fn summary_card(r: &CanonicalRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", r.source_url);
    let _ = writeln!(
        out,
        "{} of {} fields resolved, fetched {}",
        r.resolved_count(),
        FieldName::CANONICAL.len(),
        r.fetched_at.format("%Y-%m-%d %H:%M UTC")
    );
    out.push('\n');

    out.push_str("Contact\n");
    row(&mut out, "phone", &r.contact.phone);
    row(&mut out, "email", &r.contact.email);
    row(&mut out, "address", &r.contact.address);
    out.push('\n');

    out.push_str("Stay\n");
    row(&mut out, "checkin_time", &r.checkin_time);
    row(&mut out, "checkout_time", &r.checkout_time);
    row(&mut out, "pet_policy", &r.pet_policy);
    out.push('\n');

    out.push_str("Parking\n");
    row(&mut out, "available", yes_no(&r.parking.available));
    row(&mut out, "cost", &r.parking.cost);
    row(&mut out, "type", &r.parking.kind);
    out.push('\n');

    out.push_str("Amenities\n");
    row(&mut out, "wifi", &r.wifi);
    row(&mut out, "fitness_center", &r.fitness_center);
    row(&mut out, "pool", &r.pool);
    out.push('\n');

    if !r.restaurants.is_empty() {
        let _ = writeln!(out, "Dining ({})", r.restaurants.len());
        for entry in &r.restaurants {
            let _ = writeln!(out, "    {:<30}  {}  {}", entry.name, entry.cuisine, entry.hours);
        }
        out.push('\n');
    }
    if !r.nearby_attractions.is_empty() {
        let _ = writeln!(out, "Nearby ({})", r.nearby_attractions.len());
        for entry in &r.nearby_attractions {
            let _ = writeln!(out, "    {:<30}  {}", entry.name, entry.distance);
        }
        out.push('\n');
    }

    out.push_str("Scores\n");
    row(&mut out, "confidence_score", format!("{:.2}", r.confidence_score));
    row(
        &mut out,
        "sentiment_score",
        format!("{:.2} ({})", r.sentiment_score, sentiment_label(r.sentiment_score)),
    );
    row(&mut out, "target_audience", audience(r));

    out.push_str("\nProvenance\n");
    for (field, report) in &r.fields {
        if let Some(source) = report.source.known() {
            let _ = writeln!(
                out,
                "  {:<26} {:.2}  {source}  ({} candidates)",
                field.as_str(),
                report.confidence,
                report.candidates
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn card_groups_fields() {
        let card = summary_card(&fixtures::harbor());
        assert!(card.starts_with("=== https://harbor.test ===\n"));
        assert!(card.contains(&format!("  {:<26} {}\n", "type", "Valet")));
        assert!(card.contains("Dining (1)"));
        assert!(card.contains(&format!(
            "  {:<26} {}\n",
            "address", "42 Harbor Way, Portland, ME 04101"
        )));
        assert!(card.contains(&format!("  {:<26} {}\n", "target_audience", "Luxury")));
        assert!(card.contains(&format!(
            "  {:<26} 1.00  pattern  (2 candidates)",
            "checkin_time"
        )));
    }

    #[test]
    fn card_for_unknown_record() {
        let card = summary_card(&fixtures::unknown());
        assert!(card.contains("0 of 13 fields resolved"));
        assert!(!card.contains("Dining"));
        assert!(card.contains(&format!("  {:<26} {}\n", "wifi", "unknown")));
    }
}
