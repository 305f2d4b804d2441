//! The canonical hotel record handed to exporters.
//!
//! Every key is always present. A field without evidence holds
//! [`FieldState::Unknown`], which serialises as the string `"unknown"`, so
//! exporters never branch on a missing key.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::candidate::ExtractorSource;
use crate::error::SchemaViolation;
use crate::field::FieldName;

/// Sentinel written for fields with no evidence.
pub const UNKNOWN: &str = "unknown";

/// Top-level keys every serialised record carries.
pub const REQUIRED_KEYS: &[&str] = &[
    "source_url",
    "fetched_at",
    "contact",
    "checkin_time",
    "checkout_time",
    "parking",
    "wifi",
    "fitness_center",
    "pool",
    "pet_policy",
    "restaurants",
    "nearby_attractions",
    "confidence_score",
    "sentiment_score",
    "target_audience",
    "fields",
];

/// A value that is either known or explicitly unknown.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldState<T> {
    Known(T),
    #[default]
    Unknown,
}

impl<T> FieldState<T> {
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    pub fn known(&self) -> Option<&T> {
        match self {
            Self::Known(v) => Some(v),
            Self::Unknown => None,
        }
    }
}

impl<T> From<Option<T>> for FieldState<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unknown, Self::Known)
    }
}

impl<T: std::fmt::Display> std::fmt::Display for FieldState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(v) => v.fmt(f),
            Self::Unknown => f.write_str(UNKNOWN),
        }
    }
}

impl<T: Serialize> Serialize for FieldState<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Known(v) => v.serialize(serializer),
            Self::Unknown => serializer.serialize_str(UNKNOWN),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for FieldState<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        if raw.as_str() == Some(UNKNOWN) || raw.is_null() {
            return Ok(Self::Unknown);
        }
        serde_json::from_value(raw)
            .map(Self::Known)
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Contact {
    pub phone: FieldState<String>,
    pub email: FieldState<String>,
    /// Street address; shown with the contact details but not scored.
    pub address: FieldState<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Parking {
    pub available: FieldState<bool>,
    pub cost: FieldState<String>,
    #[serde(rename = "type")]
    pub kind: FieldState<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantEntry {
    pub name: String,
    pub cuisine: FieldState<String>,
    pub hours: FieldState<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttractionEntry {
    pub name: String,
    pub distance: FieldState<String>,
}

/// Per-field provenance kept alongside the values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldReport {
    pub confidence: f32,
    pub source: FieldState<ExtractorSource>,
    pub candidates: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub source_url: String,
    pub fetched_at: DateTime<Utc>,
    pub contact: Contact,
    pub checkin_time: FieldState<String>,
    pub checkout_time: FieldState<String>,
    pub parking: Parking,
    pub wifi: FieldState<String>,
    pub fitness_center: FieldState<String>,
    pub pool: FieldState<String>,
    pub pet_policy: FieldState<String>,
    pub restaurants: Vec<RestaurantEntry>,
    pub nearby_attractions: Vec<AttractionEntry>,
    /// Completeness-weighted mean of resolved confidences, in [0, 1].
    pub confidence_score: f32,
    /// Mean segment sentiment, in [0, 1] with 0.5 neutral.
    pub sentiment_score: f32,
    pub target_audience: BTreeSet<String>,
    /// Keyed by canonical field name.
    pub fields: BTreeMap<FieldName, FieldReport>,
}

impl CanonicalRecord {
    /// Number of canonical fields with a selected value.
    pub fn resolved_count(&self) -> usize {
        self.fields.values().filter(|r| r.source.is_known()).count()
    }
}

/// Check that a serialised record carries every required top-level key.
pub fn check_required_keys(value: &serde_json::Value) -> Result<(), SchemaViolation> {
    let obj = value
        .as_object()
        .ok_or_else(|| SchemaViolation::MissingKey("<record object>".into()))?;
    for key in REQUIRED_KEYS {
        if !obj.contains_key(*key) {
            return Err(SchemaViolation::MissingKey((*key).to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_serialises_as_sentinel() {
        let parking = Parking {
            available: FieldState::Known(true),
            cost: FieldState::Unknown,
            kind: FieldState::Known("Valet".into()),
        };
        let json = serde_json::to_value(&parking).unwrap();
        assert_eq!(json["available"], true);
        assert_eq!(json["cost"], "unknown");
        assert_eq!(json["type"], "Valet");
    }

    #[test]
    fn sentinel_deserialises_as_unknown() {
        let state: FieldState<bool> = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(state, FieldState::Unknown);
        let state: FieldState<String> = serde_json::from_str("\"3:00 PM\"").unwrap();
        assert_eq!(state, FieldState::Known("3:00 PM".to_string()));
    }

    #[test]
    fn missing_key_is_reported() {
        let value = serde_json::json!({ "source_url": "x" });
        assert_eq!(
            check_required_keys(&value),
            Err(SchemaViolation::MissingKey("fetched_at".into()))
        );
    }
}
