//! Extraction and confidence-scoring engine.
//!
//! Raw text goes through three independent extractors (pattern rules, an
//! entity recognizer, a semantic scorer); their candidates are reconciled
//! into one value per field with a completeness-weighted confidence score,
//! and assembled into a [`CanonicalRecord`](innsight_core::CanonicalRecord).

pub mod audience;
pub mod builder;
mod error;
pub mod evidence;
pub mod pattern;
pub mod pipeline;
pub mod reconcile;
pub mod segment;

pub use audience::{AudienceRule, AudienceRules};
pub use builder::{RecordBuilder, SourceMeta};
pub use error::EngineError;
pub use pattern::PatternExtractor;
pub use pipeline::{Gathered, Pipeline};
pub use reconcile::{reconcile, Reconciliation, AGREEMENT_BONUS};
