//! Per-document pipeline and the bounded-parallel batch runner.
//!
//! The three extractors run concurrently. Adapter calls go through
//! [`innsight_ai::guard`], so a failed or late adapter just contributes no
//! candidates. Reconciliation and building are synchronous.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use innsight_ai::guard::{self, Availability};
use innsight_ai::{EntityRecognizer, LexiconScorer, RuleRecognizer, SemanticScorer, NEUTRAL_SENTIMENT};
use innsight_core::{Candidate, CanonicalRecord, EngineConfig, RawDocument};
use tracing::{info, warn};

use crate::audience::AudienceRules;
use crate::builder::{RecordBuilder, SourceMeta};
use crate::evidence::{anchor_phrases, entity_candidates, semantic_evidence};
use crate::pattern::PatternExtractor;
use crate::reconcile::reconcile;
use crate::segment::segments;
use crate::EngineError;

/// Everything the extractors said about one document, before reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Gathered {
    pub candidates: Vec<Candidate>,
    pub matched_anchors: BTreeSet<String>,
    pub sentiment: f32,
    pub recognizer: Availability,
    pub scorer: Availability,
}

pub struct Pipeline {
    patterns: PatternExtractor,
    recognizer: Arc<dyn EntityRecognizer>,
    scorer: Arc<dyn SemanticScorer>,
    audience: AudienceRules,
    builder: RecordBuilder,
    config: EngineConfig,
}

impl Pipeline {
    pub fn new(
        recognizer: Arc<dyn EntityRecognizer>,
        scorer: Arc<dyn SemanticScorer>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            patterns: PatternExtractor::new(),
            recognizer,
            scorer,
            audience: AudienceRules::default(),
            builder: RecordBuilder::new(&config),
            config,
        })
    }

    /// Pipeline with the model-free recognizer and scorer.
    pub fn rule_based(config: EngineConfig) -> Result<Self, EngineError> {
        Self::new(
            Arc::new(RuleRecognizer::new()),
            Arc::new(LexiconScorer::new()),
            config,
        )
    }

    pub fn with_audience_rules(mut self, rules: AudienceRules) -> Self {
        self.audience = rules;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run all three extractors over `doc` and collect their candidates.
    pub async fn gather(&self, doc: &RawDocument) -> Gathered {
        let text = doc.text();
        let segs = segments(doc);
        let seg_texts: Vec<String> = segs.iter().map(|s| s.text.clone()).collect();
        let anchors = anchor_phrases();
        let deadline = self.config.adapter_timeout();

        let (mut candidates, entities, scores) = tokio::join!(
            async { self.patterns.extract(text) },
            guard::recognize(self.recognizer.as_ref(), text, deadline),
            guard::score(self.scorer.as_ref(), &seg_texts, &anchors, deadline),
        );

        candidates.extend(entity_candidates(text, &entities.value, &self.config));
        let semantic = semantic_evidence(&segs, &scores.value, &self.config);
        candidates.extend(semantic.candidates);

        Gathered {
            candidates,
            matched_anchors: semantic.matched_anchors,
            sentiment: semantic.sentiment,
            recognizer: entities.availability,
            scorer: scores.availability,
        }
    }

    /// Extract, reconcile and build one record.
    ///
    /// Blank or undecodable text yields an all-unknown record with zero
    /// confidence. Only a [`SchemaViolation`](innsight_core::SchemaViolation)
    /// is an error.
    pub async fn run(&self, doc: &RawDocument) -> Result<CanonicalRecord, EngineError> {
        let source = SourceMeta::from(doc);
        if doc.is_blank() {
            warn!(url = doc.source_url(), "document has no text, emitting unknown record");
            let empty = reconcile(&[])?;
            return Ok(self.builder.build(
                &empty.slots,
                empty.confidence_score,
                NEUTRAL_SENTIMENT,
                BTreeSet::new(),
                &source,
            )?);
        }

        let gathered = self.gather(doc).await;
        let reconciled = reconcile(&gathered.candidates)?;
        let audience = self
            .audience
            .evaluate(&reconciled.slots, &gathered.matched_anchors);
        let record = self.builder.build(
            &reconciled.slots,
            reconciled.confidence_score,
            gathered.sentiment,
            audience,
            &source,
        )?;

        info!(
            url = doc.source_url(),
            candidates = gathered.candidates.len(),
            resolved = record.resolved_count(),
            confidence = record.confidence_score,
            "extracted record"
        );
        Ok(record)
    }

    /// Run many documents with at most `max_concurrency` in flight. Results
    /// come back in input order.
    pub async fn run_batch(&self, docs: &[RawDocument]) -> Vec<Result<CanonicalRecord, EngineError>> {
        let results: Vec<_> = stream::iter(docs)
            .map(|doc| self.run(doc))
            .buffered(self.config.max_concurrency)
            .collect()
            .await;
        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(documents = docs.len(), failed, "batch complete");
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use innsight_ai::{AdapterError, Entity};
    use innsight_core::{ExtractorSource, FieldName, FieldState};

    const SAMPLE: &str = "Check-in: 3:00 PM, Check-out: 11:00 AM. Call (555) 123-4567. Free WiFi and valet parking $25/night.";

    fn doc(text: &str) -> RawDocument {
        RawDocument::new(
            "https://harbor.test",
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            text,
        )
    }

    struct NoEntities;

    #[async_trait]
    impl EntityRecognizer for NoEntities {
        fn name(&self) -> &str {
            "none"
        }

        async fn recognize_entities(&self, _text: &str) -> Result<Vec<Entity>, AdapterError> {
            Ok(Vec::new())
        }
    }

    struct Hanging;

    #[async_trait]
    impl EntityRecognizer for Hanging {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn recognize_entities(&self, _text: &str) -> Result<Vec<Entity>, AdapterError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl SemanticScorer for Hanging {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn score_segments(
            &self,
            _text: &str,
            _anchors: &[String],
        ) -> Result<BTreeMap<String, f32>, AdapterError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(BTreeMap::new())
        }

        async fn sentiment(&self, _text: &str) -> Result<f32, AdapterError> {
            Ok(1.0)
        }
    }

    /// Records how many recognizer calls overlap.
    #[derive(Default)]
    struct InFlight {
        current: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EntityRecognizer for InFlight {
        fn name(&self) -> &str {
            "in-flight"
        }

        async fn recognize_entities(&self, _text: &str) -> Result<Vec<Entity>, AdapterError> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    fn fast_timeout() -> EngineConfig {
        EngineConfig {
            adapter_timeout_ms: 50,
            ..EngineConfig::default()
        }
    }

    #[tokio::test]
    async fn sample_document_end_to_end() {
        let pipeline = Pipeline::rule_based(EngineConfig::default()).unwrap();
        let record = pipeline.run(&doc(SAMPLE)).await.unwrap();

        assert_eq!(record.checkin_time, FieldState::Known("3:00 PM".into()));
        assert_eq!(record.checkout_time, FieldState::Known("11:00 AM".into()));
        assert_eq!(record.contact.phone, FieldState::Known("(555) 123-4567".into()));
        assert_eq!(record.wifi, FieldState::Known("available".into()));
        assert_eq!(record.parking.available, FieldState::Known(true));
        assert_eq!(record.parking.cost, FieldState::Known("$25/night".into()));
        assert_eq!(record.parking.kind, FieldState::Known("Valet".into()));
        assert_eq!(record.contact.email, FieldState::Unknown);
        assert_eq!(record.pool, FieldState::Unknown);

        let checkin = &record.fields[&FieldName::CheckinTime];
        assert_eq!(checkin.source, FieldState::Known(ExtractorSource::Pattern));
        assert_eq!(checkin.confidence, 1.0);

        assert!(record.confidence_score > 0.5, "got {}", record.confidence_score);
        assert!(record.target_audience.contains("Luxury"));
        assert!(record.sentiment_score >= 0.5);
    }

    #[tokio::test]
    async fn empty_text_is_all_unknown() {
        let pipeline = Pipeline::rule_based(EngineConfig::default()).unwrap();
        let record = pipeline.run(&doc("")).await.unwrap();
        assert_eq!(record.confidence_score, 0.0);
        assert!(record.confidence_score.is_sign_positive());
        let line = serde_json::to_string(&record).unwrap();
        assert!(line.contains(r#""confidence_score":0.0"#), "{line}");
        assert_eq!(record.resolved_count(), 0);
        assert_eq!(record.sentiment_score, NEUTRAL_SENTIMENT);
        assert!(record.target_audience.is_empty());

        let json = serde_json::to_value(&record).unwrap();
        innsight_core::check_required_keys(&json).unwrap();
        for key in ["checkin_time", "checkout_time", "wifi", "fitness_center", "pool", "pet_policy"] {
            assert_eq!(json[key], "unknown", "{key}");
        }
        assert_eq!(json["contact"]["phone"], "unknown");
        assert_eq!(json["parking"]["type"], "unknown");
    }

    #[tokio::test]
    async fn missing_entities_fall_back_to_patterns() {
        let pipeline = Pipeline::new(
            Arc::new(NoEntities),
            Arc::new(LexiconScorer::new()),
            EngineConfig::default(),
        )
        .unwrap();
        let record = pipeline.run(&doc(SAMPLE)).await.unwrap();
        assert_eq!(record.checkin_time, FieldState::Known("3:00 PM".into()));
        let checkin = &record.fields[&FieldName::CheckinTime];
        assert!((checkin.confidence - 0.9).abs() < 1e-6);
    }

    #[tokio::test]
    async fn timed_out_adapters_leave_pattern_evidence() {
        let pipeline =
            Pipeline::new(Arc::new(Hanging), Arc::new(Hanging), fast_timeout()).unwrap();
        let gathered = pipeline.gather(&doc(SAMPLE)).await;
        assert_eq!(gathered.recognizer, Availability::Unavailable);
        assert_eq!(gathered.scorer, Availability::Unavailable);
        assert!(gathered
            .candidates
            .iter()
            .all(|c| c.source() == ExtractorSource::Pattern));

        let record = pipeline.run(&doc(SAMPLE)).await.unwrap();
        // 7 pattern fields at 0.9, no agreement possible
        let expected = 7.0 * 0.9 / 13.0;
        assert!((record.confidence_score - expected).abs() < 1e-5);
        assert_eq!(record.sentiment_score, NEUTRAL_SENTIMENT);
    }

    #[tokio::test]
    async fn reruns_are_byte_identical() {
        let pipeline = Pipeline::rule_based(EngineConfig::default()).unwrap();
        let a = serde_json::to_string(&pipeline.run(&doc(SAMPLE)).await.unwrap()).unwrap();
        let b = serde_json::to_string(&pipeline.run(&doc(SAMPLE)).await.unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let pipeline = Pipeline::rule_based(EngineConfig {
            max_concurrency: 2,
            ..EngineConfig::default()
        })
        .unwrap();
        let docs = vec![doc(SAMPLE), doc(""), doc("Heated pool and gym.")];
        let results = pipeline.run_batch(&docs).await;
        assert_eq!(results.len(), 3);
        let records: Vec<_> = results.into_iter().map(Result::unwrap).collect();
        assert!(records[0].confidence_score > 0.5);
        assert_eq!(records[1].confidence_score, 0.0);
        assert_eq!(records[2].pool, FieldState::Known("heated".into()));
        assert_eq!(records[2].fitness_center, FieldState::Known("available".into()));
    }

    #[tokio::test]
    async fn batch_never_exceeds_max_concurrency() {
        let recognizer = Arc::new(InFlight::default());
        let pipeline = Pipeline::new(
            recognizer.clone(),
            Arc::new(LexiconScorer::new()),
            EngineConfig {
                max_concurrency: 2,
                ..EngineConfig::default()
            },
        )
        .unwrap();
        let docs: Vec<_> = (0..8).map(|_| doc(SAMPLE)).collect();
        let results = pipeline.run_batch(&docs).await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 8);
        assert_eq!(recognizer.peak.load(Ordering::SeqCst), 2);
        assert_eq!(recognizer.current.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = EngineConfig {
            max_concurrency: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            Pipeline::rule_based(config),
            Err(EngineError::Config(_))
        ));
    }
}
