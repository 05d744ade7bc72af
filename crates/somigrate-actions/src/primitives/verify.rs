use std::cmp::Ordering;
use std::collections::VecDeque;
use std::time::Duration;

use somigrate_core::errors::ActionError;
use somigrate_core::models::Document;
use somigrate_core::traits::DocumentStore;

use super::{bounded, resolve_timeout};
use crate::classifier::{index_not_found, to_action_error};

/// What [`verify_index_equality`] compares for each source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyMode {
    /// The id must be present; used after a transforming reindex.
    Ids,
    /// The id must be present with an identical source; used after a clone,
    /// which copies bytes.
    Contents,
}

/// Source document count and digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOutcome {
    pub documents: u64,
    pub digest: String,
}

/// Check that `target` holds every document of `source`.
///
/// Both indices are walked side by side in id order. Documents only the
/// target has are accepted: once the target is published, other instances
/// and users may add to it. A source document that is missing (or differs,
/// in [`VerifyMode::Contents`]) is `index_content_mismatch`, which is fatal:
/// replaying the copy step is the operator's call, not the driver's.
pub async fn verify_index_equality<S: DocumentStore>(
    store: &S,
    source: &str,
    target: &str,
    mode: VerifyMode,
    batch_size: usize,
    timeout: Option<Duration>,
) -> Result<VerifyOutcome, ActionError> {
    let timeout = resolve_timeout(timeout);
    let mut source_docs = Pager::new(source, batch_size, timeout);
    let mut target_docs = Pager::new(target, batch_size, timeout);
    let mut hasher = blake3::Hasher::new();
    let mut first_mismatch: Option<String> = None;

    while let Some(doc) = source_docs.next(store).await? {
        hasher.update(doc.id.as_bytes());
        hasher.update(&[0]);
        if mode == VerifyMode::Contents {
            hasher.update(doc.source.to_string().as_bytes());
            hasher.update(&[0]);
        }

        let found = loop {
            let head = target_docs
                .peek(store)
                .await?
                .map(|t| (t.id.cmp(&doc.id), mode == VerifyMode::Ids || t.source == doc.source));
            match head {
                Some((Ordering::Less, _)) => target_docs.advance(),
                Some((Ordering::Equal, same)) => {
                    target_docs.advance();
                    break same;
                }
                _ => break false,
            }
        };
        if !found && first_mismatch.is_none() {
            first_mismatch = Some(doc.id);
        }
    }

    if let Some(document_id) = first_mismatch {
        while target_docs.next(store).await?.is_some() {}
        return Err(ActionError::IndexContentMismatch {
            source_index: source.to_string(),
            target: target.to_string(),
            source_count: source_docs.seen,
            target_count: target_docs.seen,
            document_id,
        });
    }
    Ok(VerifyOutcome {
        documents: source_docs.seen,
        digest: hasher.finalize().to_hex().to_string(),
    })
}

/// Reads one index page by page in id order.
struct Pager<'a> {
    index: &'a str,
    batch_size: usize,
    timeout: Duration,
    buffer: VecDeque<Document>,
    after: Option<String>,
    exhausted: bool,
    seen: u64,
}

impl<'a> Pager<'a> {
    fn new(index: &'a str, batch_size: usize, timeout: Duration) -> Self {
        Self {
            index,
            batch_size: batch_size.max(1),
            timeout,
            buffer: VecDeque::new(),
            after: None,
            exhausted: false,
            seen: 0,
        }
    }

    async fn fill<S: DocumentStore>(&mut self, store: &S) -> Result<(), ActionError> {
        if !self.buffer.is_empty() || self.exhausted {
            return Ok(());
        }
        let index = self.index;
        let batch = bounded(
            self.timeout,
            store.search_after(index, self.after.as_deref(), self.batch_size),
        )
        .await
        .map_err(|e| to_action_error(e, |e| index_not_found(e, index)))?;
        self.exhausted = batch.len() < self.batch_size;
        if let Some(last) = batch.last() {
            self.after = Some(last.id.clone());
        }
        self.buffer.extend(batch);
        Ok(())
    }

    async fn peek<S: DocumentStore>(&mut self, store: &S) -> Result<Option<&Document>, ActionError> {
        self.fill(store).await?;
        Ok(self.buffer.front())
    }

    async fn next<S: DocumentStore>(&mut self, store: &S) -> Result<Option<Document>, ActionError> {
        self.fill(store).await?;
        let doc = self.buffer.pop_front();
        if doc.is_some() {
            self.seen += 1;
        }
        Ok(doc)
    }

    fn advance(&mut self) {
        if self.buffer.pop_front().is_some() {
            self.seen += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use somigrate_store::{empty_mappings, InMemoryStore, MemIndex};
    use test_fixtures::saved_objects;

    fn store() -> InMemoryStore {
        let docs = saved_objects("dashboard", 5);
        InMemoryStore::new()
            .with_index(
                "kibana_1",
                MemIndex::new(empty_mappings()).with_documents(docs.clone()),
            )
            .with_index("kibana_2", MemIndex::new(empty_mappings()).with_documents(docs))
    }

    #[tokio::test]
    async fn identical_indices_verify_in_both_modes() {
        let store = store();
        for mode in [VerifyMode::Ids, VerifyMode::Contents] {
            let outcome = verify_index_equality(&store, "kibana_1", "kibana_2", mode, 2, None)
                .await
                .unwrap();
            assert_eq!(outcome.documents, 5);
        }
    }

    #[tokio::test]
    async fn transformed_sources_pass_ids_but_fail_contents() {
        let store = store();
        store.modify(|indices| {
            let target = indices.get_mut("kibana_2").unwrap();
            for source in target.docs.values_mut() {
                source["migrated"] = json!(true);
            }
        });

        verify_index_equality(&store, "kibana_1", "kibana_2", VerifyMode::Ids, 10, None)
            .await
            .unwrap();
        let err = verify_index_equality(&store, "kibana_1", "kibana_2", VerifyMode::Contents, 10, None)
            .await
            .unwrap_err();
        assert_eq!(err.tag(), "index_content_mismatch");
    }

    #[tokio::test]
    async fn missing_document_is_a_mismatch() {
        let store = store();
        store.modify(|indices| {
            let target = indices.get_mut("kibana_2").unwrap();
            let first = target.docs.keys().next().cloned().unwrap();
            target.docs.remove(&first);
        });
        let err = verify_index_equality(&store, "kibana_1", "kibana_2", VerifyMode::Ids, 2, None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ActionError::IndexContentMismatch {
                source_index: "kibana_1".into(),
                target: "kibana_2".into(),
                source_count: 5,
                target_count: 4,
                document_id: "dashboard:1".into(),
            }
        );
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn documents_added_to_the_target_are_accepted() {
        let store = store();
        store.modify(|indices| {
            let target = indices.get_mut("kibana_2").unwrap();
            for extra in ["config:8.8.0", "dashboard:0", "dashboard:9"] {
                target.docs.insert(extra.to_string(), json!({"type": "extra"}));
            }
        });
        for mode in [VerifyMode::Ids, VerifyMode::Contents] {
            let outcome = verify_index_equality(&store, "kibana_1", "kibana_2", mode, 2, None)
                .await
                .unwrap();
            assert_eq!(outcome.documents, 5);
        }
    }

    #[tokio::test]
    async fn digest_depends_on_the_source_only() {
        let store = store();
        let before = verify_index_equality(&store, "kibana_1", "kibana_2", VerifyMode::Ids, 3, None)
            .await
            .unwrap();
        store.modify(|indices| {
            let target = indices.get_mut("kibana_2").unwrap();
            target.docs.insert("visualization:1".into(), json!({}));
        });
        let after = verify_index_equality(&store, "kibana_1", "kibana_2", VerifyMode::Ids, 3, None)
            .await
            .unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn missing_target_is_index_not_found() {
        let store = store();
        let err = verify_index_equality(&store, "kibana_1", "kibana_9", VerifyMode::Ids, 2, None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ActionError::IndexNotFound {
                index: "kibana_9".into()
            }
        );
    }
}
