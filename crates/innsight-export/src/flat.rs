//! Flattened one-row-per-record table, written out as CSV.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::csv::Writer;
use arrow::record_batch::RecordBatch;
use innsight_core::flat::{record_schema, SCORE_COLUMNS, TEXT_COLUMNS};
use innsight_core::{CanonicalRecord, UNKNOWN};

use crate::ExportError;

/// Entries as `Name (attr, attr)`, joined with `; `.
pub(crate) fn list_or_unknown(items: Vec<String>) -> String {
    if items.is_empty() {
        UNKNOWN.to_string()
    } else {
        items.join("; ")
    }
}

pub(crate) fn restaurant_names(record: &CanonicalRecord) -> Vec<String> {
    record
        .restaurants
        .iter()
        .map(|r| with_known(&r.name, [r.cuisine.known(), r.hours.known()]))
        .collect()
}

pub(crate) fn attraction_names(record: &CanonicalRecord) -> Vec<String> {
    record
        .nearby_attractions
        .iter()
        .map(|a| with_known(&a.name, [a.distance.known()]))
        .collect()
}

fn with_known<const N: usize>(name: &str, attrs: [Option<&String>; N]) -> String {
    let known: Vec<&str> = attrs.iter().flatten().map(|s| s.as_str()).collect();
    if known.is_empty() {
        name.to_string()
    } else {
        format!("{name} ({})", known.join(", "))
    }
}

fn text_cell(record: &CanonicalRecord, column: &str) -> String {
    match column {
        "source_url" => record.source_url.clone(),
        "fetched_at" => record.fetched_at.to_rfc3339(),
        "contact_phone" => record.contact.phone.to_string(),
        "contact_email" => record.contact.email.to_string(),
        "contact_address" => record.contact.address.to_string(),
        "checkin_time" => record.checkin_time.to_string(),
        "checkout_time" => record.checkout_time.to_string(),
        "parking_available" => record.parking.available.to_string(),
        "parking_cost" => record.parking.cost.to_string(),
        "parking_type" => record.parking.kind.to_string(),
        "wifi" => record.wifi.to_string(),
        "fitness_center" => record.fitness_center.to_string(),
        "pool" => record.pool.to_string(),
        "pet_policy" => record.pet_policy.to_string(),
        "restaurants" => list_or_unknown(restaurant_names(record)),
        "nearby_attractions" => list_or_unknown(attraction_names(record)),
        _ => UNKNOWN.to_string(),
    }
}

fn score_cell(record: &CanonicalRecord, column: &str) -> f64 {
    match column {
        "confidence_score" => f64::from(record.confidence_score),
        "sentiment_score" => f64::from(record.sentiment_score),
        _ => 0.0,
    }
}

/// Build the flattened table for `records`.
pub fn record_batch(records: &[CanonicalRecord]) -> Result<RecordBatch, ExportError> {
    let mut columns: Vec<ArrayRef> = Vec::new();
    for column in TEXT_COLUMNS {
        let values: Vec<String> = records.iter().map(|r| text_cell(r, column)).collect();
        columns.push(Arc::new(StringArray::from(values)));
    }
    for column in SCORE_COLUMNS {
        let values: Vec<f64> = records.iter().map(|r| score_cell(r, column)).collect();
        columns.push(Arc::new(Float64Array::from(values)));
    }
    let audience: Vec<String> = records
        .iter()
        .map(|r| r.target_audience.iter().cloned().collect::<Vec<_>>().join("; "))
        .collect();
    columns.push(Arc::new(StringArray::from(audience)));

    Ok(RecordBatch::try_new(Arc::new(record_schema()), columns)?)
}

/// Header row plus one row per record.
pub fn render_csv(records: &[CanonicalRecord]) -> Result<String, ExportError> {
    let batch = record_batch(records)?;
    let mut buf = Vec::new();
    {
        let mut writer = Writer::new(&mut buf);
        writer.write(&batch)?;
    }
    Ok(String::from_utf8(buf)?)
}
