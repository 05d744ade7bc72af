//! DocumentStore: the backend seam the migration runs against.
//!
//! Every call is asynchronous and reports failures as a raw [`StoreError`]
//! (transport problem or HTTP status + body). Classification into retryable
//! and fatal failures happens in the actions layer, never here.

use std::time::Duration;

use crate::errors::StoreError;
use crate::models::{
    Acknowledged, AliasAction, BulkOp, BulkResponse, Document, HealthResponse, IndexMap, IndexSpec,
    IndexStatus,
};

/// Document-store client consumed by the migration actions.
///
/// `timeout` arguments are forwarded to the backend as the request's own
/// timeout; the caller bounds how long it waits separately.
#[allow(async_fn_in_trait)]
pub trait DocumentStore: Send + Sync {
    /// Metadata for every index matching one of `names` (index or alias).
    /// Unknown names are ignored.
    async fn get_indices(&self, names: &[String]) -> Result<IndexMap, StoreError>;

    /// Make `index` read-only.
    async fn add_write_block(&self, index: &str, timeout: Duration)
        -> Result<Acknowledged, StoreError>;

    /// Clear the read-only flag of `index`.
    async fn remove_write_block(
        &self,
        index: &str,
        timeout: Duration,
    ) -> Result<Acknowledged, StoreError>;

    async fn create_index(
        &self,
        index: &str,
        spec: &IndexSpec,
        timeout: Duration,
    ) -> Result<Acknowledged, StoreError>;

    /// Clone a write-blocked `source` into a new `target`.
    async fn clone_index(
        &self,
        source: &str,
        target: &str,
        timeout: Duration,
    ) -> Result<Acknowledged, StoreError>;

    /// Wait up to `timeout` for `index` to reach `wait_for`.
    async fn cluster_health(
        &self,
        index: &str,
        wait_for: IndexStatus,
        timeout: Duration,
    ) -> Result<HealthResponse, StoreError>;

    /// Up to `size` documents with id strictly greater than `after`, in
    /// ascending id order.
    async fn search_after(
        &self,
        index: &str,
        after: Option<&str>,
        size: usize,
    ) -> Result<Vec<Document>, StoreError>;

    /// Write every document by id with `op` semantics.
    async fn bulk_index(
        &self,
        index: &str,
        docs: &[Document],
        op: BulkOp,
    ) -> Result<BulkResponse, StoreError>;

    async fn refresh(&self, index: &str) -> Result<(), StoreError>;

    /// Apply all alias actions atomically or none of them.
    async fn update_aliases(
        &self,
        actions: &[AliasAction],
        timeout: Duration,
    ) -> Result<Acknowledged, StoreError>;
}
