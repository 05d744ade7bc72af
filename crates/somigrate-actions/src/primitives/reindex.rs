use std::time::Duration;

use somigrate_core::constants::es_error_types as es;
use somigrate_core::errors::{ActionError, StoreError};
use somigrate_core::models::{BulkItemFailure, BulkOp, Document};
use somigrate_core::traits::{DocumentStore, DocumentTransform};
use somigrate_observability::events;

use super::{bounded, refresh_index, resolve_timeout};
use crate::classifier::{classify, index_not_found, to_action_error, Classified};

/// Inputs of a client-side reindex.
pub struct ReindexParams<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub transform: &'a dyn DocumentTransform,
    pub batch_size: usize,
    pub timeout: Option<Duration>,
}

/// Counters from a completed reindex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReindexSummary {
    pub read: u64,
    pub indexed: u64,
    /// Ids the target already held and were left as they are.
    pub existing: u64,
}

/// Copy every document of `source` into `target` through `transform`.
///
/// Documents are read in ascending id order and written create-only under
/// the same id. An id the target already holds is skipped: either an
/// earlier attempt copied it, or another instance published the target and
/// it may since have been edited. A re-run after a partial failure therefore
/// only fills in what is missing. The target is refreshed at the end.
pub async fn reindex<S: DocumentStore>(
    store: &S,
    params: ReindexParams<'_>,
) -> Result<ReindexSummary, ActionError> {
    let timeout = resolve_timeout(params.timeout);
    let batch_size = params.batch_size.max(1);
    let mut summary = ReindexSummary::default();
    let mut after: Option<String> = None;

    loop {
        let batch = bounded(
            timeout,
            store.search_after(params.source, after.as_deref(), batch_size),
        )
        .await
        .map_err(|e| to_action_error(e, |e| index_not_found(e, params.source)))?;

        let Some(last) = batch.last() else {
            break;
        };
        after = Some(last.id.clone());
        let exhausted = batch.len() < batch_size;
        summary.read += batch.len() as u64;

        let transformed = transform_batch(params.transform, batch)?;
        let response = bounded(
            timeout,
            store.bulk_index(params.target, &transformed, BulkOp::Create),
        )
        .await
        .map_err(|e| to_action_error(e, |e| index_not_found(e, params.target)))?;
        let (existing, failures): (Vec<_>, Vec<_>) = response
            .failures
            .into_iter()
            .partition(|f| f.error_type == es::VERSION_CONFLICT);
        if !failures.is_empty() {
            return Err(bulk_failure(params.target, &failures));
        }
        summary.indexed += response.indexed as u64;
        summary.existing += existing.len() as u64;
        events::reindex_progress(params.source, params.target, summary.indexed);

        if exhausted {
            break;
        }
    }

    refresh_index(store, params.target, Some(timeout)).await?;
    Ok(summary)
}

fn transform_batch(
    transform: &dyn DocumentTransform,
    batch: Vec<Document>,
) -> Result<Vec<Document>, ActionError> {
    batch
        .into_iter()
        .map(|doc| {
            let id = doc.id.clone();
            let out = transform
                .transform(doc)
                .map_err(|e| ActionError::DocumentTransformFailed {
                    document_id: id.clone(),
                    reason: e.reason,
                })?;
            if out.id != id {
                return Err(ActionError::DocumentTransformFailed {
                    document_id: id,
                    reason: format!("transform changed the document id to {}", out.id),
                });
            }
            Ok(out)
        })
        .collect()
}

/// A rejected item is retryable when its own status is; the whole batch is
/// replayed, which is safe because writes are by id.
fn bulk_failure(target: &str, failures: &[BulkItemFailure]) -> ActionError {
    let first = &failures[0];
    let item_error = StoreError::response(first.status, &first.error_type, first.reason.clone());
    match classify(item_error) {
        Classified::Retryable(e) => e,
        Classified::Other(_) => ActionError::BulkIndexFailed {
            index: target.to_string(),
            failures: failures.len(),
            first_reason: format!("[{}] {}: {}", first.id, first.error_type, first.reason),
        },
    }
}
