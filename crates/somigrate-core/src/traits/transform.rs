use crate::models::Document;

/// A per-document migration failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct TransformError {
    pub reason: String,
}

impl TransformError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Per-document transform applied during reindex. Must keep `id` stable so
/// that replays overwrite instead of duplicating.
pub trait DocumentTransform: Send + Sync {
    fn transform(&self, doc: Document) -> Result<Document, TransformError>;
}

impl<F> DocumentTransform for F
where
    F: Fn(Document) -> Result<Document, TransformError> + Send + Sync,
{
    fn transform(&self, doc: Document) -> Result<Document, TransformError> {
        self(doc)
    }
}

/// Copies documents unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl DocumentTransform for IdentityTransform {
    fn transform(&self, doc: Document) -> Result<Document, TransformError> {
        Ok(doc)
    }
}
