use async_trait::async_trait;
use innsight_core::{EntityKind, Span};

use crate::AdapterError;

/// A typed span found by an entity recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub kind: EntityKind,
    pub span: Span,
    pub text: String,
}

impl Entity {
    pub fn new(kind: EntityKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

/// Named-entity recognition capability.
///
/// Implementations must return spans as byte offsets into `text`, and should
/// return the same entities for the same text within a session.
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    async fn recognize_entities(&self, text: &str) -> Result<Vec<Entity>, AdapterError>;
}
