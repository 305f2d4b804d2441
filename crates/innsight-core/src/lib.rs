//! Innsight data model: documents, candidates, the canonical field schema
//! and the record handed to exporters.

pub mod candidate;
pub mod config;
pub mod document;
pub mod error;
pub mod field;
pub mod normalize;
pub mod record;
pub mod schema;
pub mod vocab;

pub use candidate::{Candidate, EntityKind, Evidence, ExtractorSource, FieldSlot, Span};
pub use config::EngineConfig;
pub use document::RawDocument;
pub use error::{ConfigError, SchemaViolation};
pub use field::{FieldName, FieldValue, ValueKind};
pub use normalize::normalize_value;
pub use record::{
    AttractionEntry, CanonicalRecord, Contact, FieldReport, FieldState, Parking,
    RestaurantEntry, REQUIRED_KEYS, UNKNOWN, check_required_keys,
};
pub use schema::flat;
