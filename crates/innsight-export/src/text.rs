//! Markdown and RAG-oriented plain-text profiles.

use std::fmt::Write;

use innsight_core::{CanonicalRecord, FieldState, UNKNOWN};

use crate::flat::{attraction_names, list_or_unknown, restaurant_names};
use crate::sentiment_label;

pub(crate) fn yes_no(flag: &FieldState<bool>) -> &'static str {
    match flag {
        FieldState::Known(true) => "yes",
        FieldState::Known(false) => "no",
        FieldState::Unknown => UNKNOWN,
    }
}

pub(crate) fn audience(record: &CanonicalRecord) -> String {
    if record.target_audience.is_empty() {
        UNKNOWN.to_string()
    } else {
        record
            .target_audience
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub(crate) fn markdown(record: &CanonicalRecord) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_markdown(&mut out, record);
    out
}

fn write_markdown(out: &mut String, r: &CanonicalRecord) -> std::fmt::Result {
    writeln!(out, "# Hotel profile: {}", r.source_url)?;
    writeln!(out)?;
    writeln!(out, "_Fetched {}_", r.fetched_at.to_rfc3339())?;
    writeln!(out)?;

    writeln!(out, "## Contact")?;
    writeln!(out, "- **Phone:** {}", r.contact.phone)?;
    writeln!(out, "- **Email:** {}", r.contact.email)?;
    writeln!(out, "- **Address:** {}", r.contact.address)?;
    writeln!(out)?;

    writeln!(out, "## Policies")?;
    writeln!(out, "- **Check-in:** {}", r.checkin_time)?;
    writeln!(out, "- **Check-out:** {}", r.checkout_time)?;
    writeln!(out, "- **Pets:** {}", r.pet_policy)?;
    writeln!(out)?;

    writeln!(out, "## Parking")?;
    writeln!(out, "- **Available:** {}", yes_no(&r.parking.available))?;
    writeln!(out, "- **Cost:** {}", r.parking.cost)?;
    writeln!(out, "- **Type:** {}", r.parking.kind)?;
    writeln!(out)?;

    writeln!(out, "## Amenities")?;
    writeln!(out, "- **WiFi:** {}", r.wifi)?;
    writeln!(out, "- **Fitness center:** {}", r.fitness_center)?;
    writeln!(out, "- **Pool:** {}", r.pool)?;
    writeln!(out)?;

    writeln!(out, "## Dining")?;
    if r.restaurants.is_empty() {
        writeln!(out, "{UNKNOWN}")?;
    }
    for entry in &r.restaurants {
        writeln!(
            out,
            "- **{}**: cuisine {}, hours {}",
            entry.name, entry.cuisine, entry.hours
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Nearby attractions")?;
    if r.nearby_attractions.is_empty() {
        writeln!(out, "{UNKNOWN}")?;
    }
    for entry in &r.nearby_attractions {
        writeln!(out, "- **{}**: {}", entry.name, entry.distance)?;
    }
    writeln!(out)?;

    writeln!(out, "## Assessment")?;
    writeln!(out, "- **Confidence:** {:.0}%", r.confidence_score * 100.0)?;
    writeln!(
        out,
        "- **Sentiment:** {} ({:.2})",
        sentiment_label(r.sentiment_score),
        r.sentiment_score
    )?;
    writeln!(out, "- **Target audience:** {}", audience(r))?;
    Ok(())
}

/// Flat `Label: value` lines, one fact per line, for chunking into a
/// retrieval index.
pub(crate) fn rag_text(r: &CanonicalRecord) -> String {
    let lines = [
        ("Hotel source", r.source_url.clone()),
        ("Contact phone", r.contact.phone.to_string()),
        ("Contact email", r.contact.email.to_string()),
        ("Contact address", r.contact.address.to_string()),
        ("Check-in time", r.checkin_time.to_string()),
        ("Check-out time", r.checkout_time.to_string()),
        ("Parking available", yes_no(&r.parking.available).to_string()),
        ("Parking cost", r.parking.cost.to_string()),
        ("Parking type", r.parking.kind.to_string()),
        ("WiFi", r.wifi.to_string()),
        ("Fitness center", r.fitness_center.to_string()),
        ("Pool", r.pool.to_string()),
        ("Pet policy", r.pet_policy.to_string()),
        ("Restaurants", list_or_unknown(restaurant_names(r))),
        ("Nearby attractions", list_or_unknown(attraction_names(r))),
        ("Confidence score", format!("{:.2}", r.confidence_score)),
        ("Guest sentiment", sentiment_label(r.sentiment_score).to_string()),
        ("Target audience", audience(r)),
    ];
    lines
        .iter()
        .map(|(label, value)| format!("{label}: {value}\n"))
        .collect()
}
