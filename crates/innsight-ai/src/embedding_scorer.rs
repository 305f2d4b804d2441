//! [`SemanticScorer`] backed by sentence embeddings.
//!
//! Similarity is the cosine between segment and anchor embeddings, clamped
//! to [0, 1]. Sentiment compares each segment against a positive and a
//! negative prototype phrase. Inference runs on the blocking pool; anchor
//! embeddings are cached for the life of the scorer.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use tracing::debug;

use crate::embedder::{cosine, Embedder};
use crate::{AdapterError, SegmentScores, SemanticScorer};

const POSITIVE_PROTOTYPE: &str = "excellent, comfortable and welcoming hotel with great service";
const NEGATIVE_PROTOTYPE: &str = "dirty, noisy and disappointing hotel with rude staff";

pub struct EmbeddingScorer {
    embedder: Arc<Mutex<Embedder>>,
    anchors: Mutex<HashMap<String, Vec<f32>>>,
}

impl EmbeddingScorer {
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        Ok(Self::new(Embedder::load(model_dir)?))
    }

    pub fn new(embedder: Embedder) -> Self {
        Self {
            embedder: Arc::new(Mutex::new(embedder)),
            anchors: Mutex::new(HashMap::new()),
        }
    }

    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AdapterError> {
        let embedder = Arc::clone(&self.embedder);
        tokio::task::spawn_blocking(move || {
            let mut embedder = embedder
                .lock()
                .map_err(|_| anyhow!("embedder lock poisoned"))?;
            let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
            embedder.embed_batch(&refs)
        })
        .await
        .map_err(|e| AdapterError::Unavailable(format!("embedding task failed: {e}")))?
        .map_err(AdapterError::from)
    }

    /// Embeddings for `anchors`, computing only the ones not seen before.
    async fn anchor_vectors(&self, anchors: &[String]) -> Result<Vec<Vec<f32>>, AdapterError> {
        let missing: Vec<String> = {
            let cache = self.cache()?;
            anchors
                .iter()
                .filter(|a| !cache.contains_key(*a))
                .cloned()
                .collect()
        };
        if !missing.is_empty() {
            debug!(count = missing.len(), "embedding anchor phrases");
            let vectors = self.embed(missing.clone()).await?;
            self.cache()?.extend(missing.into_iter().zip(vectors));
        }
        let cache = self.cache()?;
        anchors
            .iter()
            .map(|a| {
                cache
                    .get(a)
                    .cloned()
                    .ok_or_else(|| AdapterError::Unavailable(format!("no embedding for {a:?}")))
            })
            .collect()
    }

    fn cache(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<f32>>>, AdapterError> {
        self.anchors
            .lock()
            .map_err(|_| AdapterError::Unavailable("anchor cache lock poisoned".into()))
    }
}

fn similarity(a: &[f32], b: &[f32]) -> f32 {
    cosine(a, b).clamp(0.0, 1.0)
}

/// Map the positive/negative prototype similarities onto [0, 1].
fn polarity(segment: &[f32], positive: &[f32], negative: &[f32]) -> f32 {
    let balance = cosine(segment, positive) - cosine(segment, negative);
    (0.5 + balance).clamp(0.0, 1.0)
}

#[async_trait]
impl SemanticScorer for EmbeddingScorer {
    fn name(&self) -> &str {
        "embedding"
    }

    async fn score_segments(
        &self,
        text: &str,
        anchors: &[String],
    ) -> Result<BTreeMap<String, f32>, AdapterError> {
        let scores = self.score_batch(&[text.to_string()], anchors).await?;
        Ok(scores.into_iter().next().map(|s| s.similarity).unwrap_or_default())
    }

    async fn sentiment(&self, text: &str) -> Result<f32, AdapterError> {
        let scores = self.score_batch(&[text.to_string()], &[]).await?;
        Ok(scores
            .first()
            .map(|s| s.sentiment)
            .unwrap_or(crate::NEUTRAL_SENTIMENT))
    }

    async fn score_batch(
        &self,
        segments: &[String],
        anchors: &[String],
    ) -> Result<Vec<SegmentScores>, AdapterError> {
        if segments.is_empty() {
            return Ok(Vec::new());
        }
        let prototypes = self
            .anchor_vectors(&[POSITIVE_PROTOTYPE.to_string(), NEGATIVE_PROTOTYPE.to_string()])
            .await?;
        let anchor_vecs = self.anchor_vectors(anchors).await?;
        let segment_vecs = self.embed(segments.to_vec()).await?;

        Ok(segment_vecs
            .iter()
            .map(|seg| SegmentScores {
                similarity: anchors
                    .iter()
                    .zip(&anchor_vecs)
                    .map(|(a, v)| (a.clone(), similarity(seg, v)))
                    .collect(),
                sentiment: polarity(seg, &prototypes[0], &prototypes[1]),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn similarity_clamps_negative_cosine() {
        assert_eq!(similarity(&[1.0, 0.0], &[-1.0, 0.0]), 0.0);
        assert!((similarity(&[0.6, 0.8], &[0.6, 0.8]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn polarity_is_neutral_when_equidistant() {
        assert!((polarity(&[1.0, 0.0], &[0.0, 1.0], &[0.0, -1.0]) - 0.5).abs() < 1e-6);
        assert!(polarity(&[0.0, 1.0], &[0.0, 1.0], &[0.0, -1.0]) > 0.9);
    }

    fn model_dir() -> Option<PathBuf> {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../models/all-MiniLM-L6-v2");
        dir.join("model.onnx").is_file().then_some(dir)
    }

    #[tokio::test]
    async fn ranks_related_anchor_higher() {
        let Some(dir) = model_dir() else {
            eprintln!("skipping: model not downloaded");
            return;
        };
        let scorer = EmbeddingScorer::load(&dir).unwrap();
        let scores = scorer
            .score_segments(
                "Guests can work out in our 24-hour gym.",
                &["fitness center".to_string(), "pet friendly".to_string()],
            )
            .await
            .unwrap();
        assert!(scores["fitness center"] > scores["pet friendly"]);
    }
}
