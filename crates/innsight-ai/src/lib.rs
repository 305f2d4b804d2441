//! Adapter boundary: entity recognition and semantic scoring behind narrow
//! async traits, plus the implementations shipped with Innsight.
//!
//! The engine never names a model. It receives `Arc<dyn EntityRecognizer>` and
//! `Arc<dyn SemanticScorer>` at construction and calls them through
//! [`guard`], which turns failures and timeouts into empty results.

mod error;
pub mod guard;
mod lexicon;
mod recognizer;
mod rules;
mod scorer;

pub use error::AdapterError;
pub use lexicon::LexiconScorer;
pub use recognizer::{Entity, EntityRecognizer};
pub use rules::RuleRecognizer;
pub use scorer::{SegmentScores, SemanticScorer, NEUTRAL_SENTIMENT};

#[cfg(feature = "onnx")]
mod embedder;
#[cfg(feature = "onnx")]
mod embedding_scorer;
#[cfg(feature = "onnx")]
pub use embedder::Embedder;
#[cfg(feature = "onnx")]
pub use embedding_scorer::EmbeddingScorer;
