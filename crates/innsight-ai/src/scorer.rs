use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::AdapterError;

/// Sentiment of a segment with no polar signal.
pub const NEUTRAL_SENTIMENT: f32 = 0.5;

/// Scores for one text segment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SegmentScores {
    /// anchor phrase → similarity in [0, 1]
    pub similarity: BTreeMap<String, f32>,
    /// Polarity in [0, 1]; 0.5 is neutral.
    pub sentiment: f32,
}

/// Semantic-similarity and sentiment capability.
///
/// Similarities and sentiment are both normalised to [0, 1].
#[async_trait]
pub trait SemanticScorer: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Similarity of `text` to each anchor phrase.
    async fn score_segments(
        &self,
        text: &str,
        anchors: &[String],
    ) -> Result<BTreeMap<String, f32>, AdapterError>;

    /// Sentiment polarity of `text`.
    async fn sentiment(&self, text: &str) -> Result<f32, AdapterError>;

    /// Score many segments at once. The default scores them one by one;
    /// model-backed scorers override this to batch inference.
    async fn score_batch(
        &self,
        segments: &[String],
        anchors: &[String],
    ) -> Result<Vec<SegmentScores>, AdapterError> {
        let mut out = Vec::with_capacity(segments.len());
        for segment in segments {
            out.push(SegmentScores {
                similarity: self.score_segments(segment, anchors).await?,
                sentiment: self.sentiment(segment).await?,
            });
        }
        Ok(out)
    }
}
