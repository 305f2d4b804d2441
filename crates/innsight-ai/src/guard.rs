//! Deadline guard around adapter calls.
//!
//! A failed or late adapter contributes no evidence. The failure is logged
//! and reported back as [`Availability::Unavailable`] so callers can tell
//! "no entities found" apart from "recognizer down" in diagnostics, but the
//! payload is always usable.

use std::time::Duration;

use tracing::warn;

use crate::{AdapterError, Entity, EntityRecognizer, SegmentScores, SemanticScorer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable,
}

/// Adapter output plus whether the adapter actually answered.
#[derive(Debug, Clone, PartialEq)]
pub struct Guarded<T> {
    pub value: T,
    pub availability: Availability,
}

impl<T: Default> Guarded<T> {
    fn available(value: T) -> Self {
        Self {
            value,
            availability: Availability::Available,
        }
    }

    fn unavailable(adapter: &str, error: &AdapterError) -> Self {
        warn!(adapter, error = %error, "adapter unavailable, treating as no evidence");
        Self {
            value: T::default(),
            availability: Availability::Unavailable,
        }
    }
}

/// Run an entity recognizer under `deadline`.
pub async fn recognize(
    recognizer: &dyn EntityRecognizer,
    text: &str,
    deadline: Duration,
) -> Guarded<Vec<Entity>> {
    match tokio::time::timeout(deadline, recognizer.recognize_entities(text)).await {
        Ok(Ok(entities)) => Guarded::available(entities),
        Ok(Err(e)) => Guarded::unavailable(recognizer.name(), &e),
        Err(_) => Guarded::unavailable(recognizer.name(), &AdapterError::Timeout(deadline)),
    }
}

/// Run a semantic scorer over all segments under a single `deadline`.
pub async fn score(
    scorer: &dyn SemanticScorer,
    segments: &[String],
    anchors: &[String],
    deadline: Duration,
) -> Guarded<Vec<SegmentScores>> {
    match tokio::time::timeout(deadline, scorer.score_batch(segments, anchors)).await {
        Ok(Ok(scores)) if scores.len() == segments.len() => Guarded::available(scores),
        Ok(Ok(scores)) => Guarded::unavailable(
            scorer.name(),
            &AdapterError::Unavailable(format!(
                "returned {} scores for {} segments",
                scores.len(),
                segments.len()
            )),
        ),
        Ok(Err(e)) => Guarded::unavailable(scorer.name(), &e),
        Err(_) => Guarded::unavailable(scorer.name(), &AdapterError::Timeout(deadline)),
    }
}
