//! The canonical field schema.
//!
//! Every Candidate names one [`FieldName`]. Thirteen of them are canonical
//! (they make up the record and the denominator of the confidence score).
//! The rest are supplementary: the street address shown under `contact`,
//! and the entry attributes that enrich restaurant and attraction entries.
//! They are reconciled like any other field but never counted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaViolation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldName {
    ContactPhone,
    ContactEmail,
    ContactAddress,
    CheckinTime,
    CheckoutTime,
    ParkingAvailable,
    ParkingCost,
    ParkingType,
    Wifi,
    FitnessCenter,
    Pool,
    PetPolicy,
    Restaurants,
    NearbyAttractions,
    RestaurantCuisine,
    RestaurantHours,
    AttractionDistance,
}

/// The type of value a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Text,
    Flag,
    Number,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Text => "text",
            Self::Flag => "flag",
            Self::Number => "number",
        })
    }
}

impl FieldName {
    /// All fields in schema order.
    pub const ALL: [FieldName; 17] = [
        Self::ContactPhone,
        Self::ContactEmail,
        Self::ContactAddress,
        Self::CheckinTime,
        Self::CheckoutTime,
        Self::ParkingAvailable,
        Self::ParkingCost,
        Self::ParkingType,
        Self::Wifi,
        Self::FitnessCenter,
        Self::Pool,
        Self::PetPolicy,
        Self::Restaurants,
        Self::NearbyAttractions,
        Self::RestaurantCuisine,
        Self::RestaurantHours,
        Self::AttractionDistance,
    ];

    /// Fields that count toward the confidence score.
    pub const CANONICAL: [FieldName; 13] = [
        Self::ContactPhone,
        Self::ContactEmail,
        Self::CheckinTime,
        Self::CheckoutTime,
        Self::ParkingAvailable,
        Self::ParkingCost,
        Self::ParkingType,
        Self::Wifi,
        Self::FitnessCenter,
        Self::Pool,
        Self::PetPolicy,
        Self::Restaurants,
        Self::NearbyAttractions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContactPhone => "contact.phone",
            Self::ContactEmail => "contact.email",
            Self::ContactAddress => "contact.address",
            Self::CheckinTime => "checkin_time",
            Self::CheckoutTime => "checkout_time",
            Self::ParkingAvailable => "parking.available",
            Self::ParkingCost => "parking.cost",
            Self::ParkingType => "parking.type",
            Self::Wifi => "wifi",
            Self::FitnessCenter => "fitness_center",
            Self::Pool => "pool",
            Self::PetPolicy => "pet_policy",
            Self::Restaurants => "restaurants",
            Self::NearbyAttractions => "nearby_attractions",
            Self::RestaurantCuisine => "restaurant.cuisine",
            Self::RestaurantHours => "restaurant.hours",
            Self::AttractionDistance => "attraction.distance",
        }
    }

    pub fn is_canonical(&self) -> bool {
        !matches!(
            self,
            Self::ContactAddress
                | Self::RestaurantCuisine
                | Self::RestaurantHours
                | Self::AttractionDistance
        )
    }

    pub fn value_kind(&self) -> ValueKind {
        match self {
            Self::ParkingAvailable => ValueKind::Flag,
            _ => ValueKind::Text,
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = SchemaViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| SchemaViolation::UnknownField(s.to_string()))
    }
}

impl TryFrom<String> for FieldName {
    type Error = SchemaViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldName> for String {
    fn from(field: FieldName) -> Self {
        field.as_str().to_string()
    }
}

/// One proposed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Flag(_) => ValueKind::Flag,
            Self::Number(_) => ValueKind::Number,
            Self::Text(_) => ValueKind::Text,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}
