//! Model-free semantic scorer.
//!
//! Similarity is the share of an anchor's tokens present in the segment, so
//! "fitness center" scores 1.0 against "a 24-hour fitness center" and 0.5
//! against "fitness classes". Sentiment is the balance of polar words from a
//! small hospitality lexicon, mapped onto [0, 1].

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use crate::{AdapterError, SemanticScorer, NEUTRAL_SENTIMENT};

const POSITIVE: &[&str] = &[
    "amazing",
    "beautiful",
    "best",
    "clean",
    "comfortable",
    "complimentary",
    "convenient",
    "delicious",
    "elegant",
    "excellent",
    "free",
    "friendly",
    "great",
    "luxurious",
    "lovely",
    "modern",
    "perfect",
    "relaxing",
    "spacious",
    "stunning",
    "welcoming",
    "wonderful",
];

const NEGATIVE: &[&str] = &[
    "awful",
    "bad",
    "broken",
    "cramped",
    "crowded",
    "dirty",
    "disappointing",
    "expensive",
    "noisy",
    "old",
    "poor",
    "rude",
    "slow",
    "smelly",
    "terrible",
    "uncomfortable",
    "worst",
];

/// Lowercased word tokens with light stemming: `wi-fi` becomes `wifi` and a
/// plural `s` is dropped from words longer than three letters.
fn tokens(text: &str) -> Vec<String> {
    let lower = text.to_lowercase().replace("wi-fi", "wifi");
    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| match w.strip_suffix('s') {
            Some(stem) if w.len() > 3 && !stem.ends_with('s') => stem.to_string(),
            _ => w.to_string(),
        })
        .collect()
}

#[derive(Debug, Default, Clone)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn similarity(&self, text: &str, anchor: &str) -> f32 {
        let anchor_tokens = tokens(anchor);
        if anchor_tokens.is_empty() {
            return 0.0;
        }
        let present: BTreeSet<String> = tokens(text).into_iter().collect();
        let hits = anchor_tokens.iter().filter(|t| present.contains(*t)).count();
        hits as f32 / anchor_tokens.len() as f32
    }

    pub fn polarity(&self, text: &str) -> f32 {
        let words = tokens(text);
        let pos = words.iter().filter(|w| POSITIVE.contains(&w.as_str())).count();
        let neg = words.iter().filter(|w| NEGATIVE.contains(&w.as_str())).count();
        if pos + neg == 0 {
            return NEUTRAL_SENTIMENT;
        }
        let balance = (pos as f32 - neg as f32) / (pos + neg) as f32;
        NEUTRAL_SENTIMENT + 0.5 * balance
    }
}

#[async_trait]
impl SemanticScorer for LexiconScorer {
    fn name(&self) -> &str {
        "lexicon"
    }

    async fn score_segments(
        &self,
        text: &str,
        anchors: &[String],
    ) -> Result<BTreeMap<String, f32>, AdapterError> {
        Ok(anchors
            .iter()
            .map(|a| (a.clone(), self.similarity(text, a)))
            .collect())
    }

    async fn sentiment(&self, text: &str) -> Result<f32, AdapterError> {
        Ok(self.polarity(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_fold_case_and_plurals() {
        assert_eq!(tokens("Free Wi-Fi, heated Pools"), vec!["free", "wifi", "heated", "pool"]);
        assert_eq!(tokens("gas"), vec!["gas"]);
        assert_eq!(tokens("business"), vec!["business"]);
    }

    #[test]
    fn similarity_is_token_coverage() {
        let s = LexiconScorer::new();
        assert_eq!(s.similarity("A 24-hour fitness center.", "fitness center"), 1.0);
        assert_eq!(s.similarity("Daily fitness classes.", "fitness center"), 0.5);
        assert_eq!(s.similarity("Free WiFi in all rooms", "wifi"), 1.0);
        assert_eq!(s.similarity("Nothing relevant", "parking"), 0.0);
        assert_eq!(s.similarity("anything", ""), 0.0);
    }

    #[test]
    fn polarity_range() {
        let s = LexiconScorer::new();
        assert_eq!(s.polarity("Check-in at 3 PM"), NEUTRAL_SENTIMENT);
        assert_eq!(s.polarity("Clean, spacious and friendly"), 1.0);
        assert_eq!(s.polarity("Dirty and noisy"), 0.0);
        assert_eq!(s.polarity("Great pool, rude staff"), 0.5);
    }

    #[tokio::test]
    async fn batch_scores_every_segment() {
        let s = LexiconScorer::new();
        let segments = vec!["Free WiFi.".to_string(), "Valet parking.".to_string()];
        let anchors = vec!["wifi".to_string(), "parking".to_string()];
        let scores = s.score_batch(&segments, &anchors).await.unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].similarity["wifi"], 1.0);
        assert_eq!(scores[1].similarity["parking"], 1.0);
        assert_eq!(scores[1].similarity["wifi"], 0.0);
        assert!(scores[0].sentiment > NEUTRAL_SENTIMENT);
    }
}
