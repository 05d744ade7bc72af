//! InMemoryStore: a [`DocumentStore`] that keeps every index in process.
//!
//! Mirrors the backend's observable behavior closely enough for the
//! migration to run against it: atomic alias batches, write blocks that
//! reject bulk items, clone preconditions, and the same error types in the
//! response bodies. Faults, latency and concurrent mutations can be scripted
//! per operation.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use somigrate_core::constants::es_error_types as es;
use somigrate_core::errors::StoreError;
use somigrate_core::models::{
    Acknowledged, AliasAction, BulkItemFailure, BulkOp, BulkResponse, Document, HealthResponse, IndexInfo,
    IndexMap, IndexSpec, IndexStatus,
};
use somigrate_core::traits::DocumentStore;

use crate::faults::{take_fault, Fault, Hook, StoreOp};
use crate::indices::{Indices, MemIndex};

/// In-process document store.
pub struct InMemoryStore {
    indices: Mutex<Indices>,
    faults: Mutex<Vec<Fault>>,
    hooks: Mutex<Vec<Hook>>,
    calls: DashMap<StoreOp, usize>,
    latency: DashMap<StoreOp, Duration>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            indices: Mutex::new(Indices::default()),
            faults: Mutex::new(Vec::new()),
            hooks: Mutex::new(Vec::new()),
            calls: DashMap::new(),
            latency: DashMap::new(),
        }
    }

    /// Add (or replace) an index.
    pub fn with_index(self, name: impl Into<String>, index: MemIndex) -> Self {
        self.lock().insert(name, index);
        self
    }

    // --- scripting ---

    /// Fail every call of `op` with `error`.
    pub fn fail(&self, op: StoreOp, error: StoreError) {
        self.push_fault(op, error, None);
    }

    /// Fail the next `times` calls of `op` with `error`.
    pub fn fail_times(&self, op: StoreOp, error: StoreError, times: usize) {
        if times > 0 {
            self.push_fault(op, error, Some(times));
        }
    }

    /// Stop failing `op`.
    pub fn clear_faults(&self, op: StoreOp) {
        lock(&self.faults).retain(|f| f.op != op);
    }

    /// Delay every call of `op` by `delay` before it runs.
    pub fn set_latency(&self, op: StoreOp, delay: Duration) {
        self.latency.insert(op, delay);
    }

    /// Mutate the indices right before the `call`-th invocation of `op`
    /// (1-based), as if another node had acted in between.
    pub fn on_call<F>(&self, op: StoreOp, call: usize, action: F)
    where
        F: FnOnce(&mut Indices) + Send + 'static,
    {
        lock(&self.hooks).push(Hook {
            op,
            at_call: call,
            action: Box::new(action),
        });
    }

    /// Mutate the indices right before the next invocation of `op`.
    pub fn on_next_call<F>(&self, op: StoreOp, action: F)
    where
        F: FnOnce(&mut Indices) + Send + 'static,
    {
        let next = self.calls(op) + 1;
        self.on_call(op, next, action);
    }

    /// Mutate the indices now.
    pub fn modify<F: FnOnce(&mut Indices)>(&self, action: F) {
        action(&mut *self.lock());
    }

    pub fn set_status(&self, index: &str, status: IndexStatus) {
        if let Some(i) = self.lock().get_mut(index) {
            i.status = status;
        }
    }

    // --- inspection ---

    /// Number of calls made to `op` so far, including failed ones.
    pub fn calls(&self, op: StoreOp) -> usize {
        self.calls.get(&op).map(|c| *c).unwrap_or(0)
    }

    pub fn index(&self, name: &str) -> Option<IndexInfo> {
        self.lock().get(name).map(MemIndex::info)
    }

    pub fn index_names(&self) -> Vec<String> {
        self.lock().names().cloned().collect()
    }

    /// All documents of `index` in id order; empty when the index is missing.
    pub fn documents(&self, index: &str) -> Vec<Document> {
        self.lock()
            .get(index)
            .map(|i| {
                i.docs
                    .iter()
                    .map(|(id, source)| Document::new(id.clone(), source.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Indices `alias` is bound to.
    pub fn alias_targets(&self, alias: &str) -> Vec<String> {
        let indices = self.lock();
        indices
            .names()
            .filter(|n| indices.get(n).is_some_and(|i| i.aliases.contains(alias)))
            .cloned()
            .collect()
    }

    // --- internals ---

    fn lock(&self) -> MutexGuard<'_, Indices> {
        lock(&self.indices)
    }

    fn push_fault(&self, op: StoreOp, error: StoreError, remaining: Option<usize>) {
        lock(&self.faults).push(Fault {
            op,
            error,
            remaining,
        });
    }

    /// Common prologue of every operation: count, delay, run due hooks,
    /// then return a scripted fault if one applies.
    async fn enter(&self, op: StoreOp) -> Result<(), StoreError> {
        let call = {
            let mut count = self.calls.entry(op).or_insert(0);
            *count += 1;
            *count
        };

        let delay = self.latency.get(&op).map(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let due: Vec<Hook> = {
            let mut hooks = lock(&self.hooks);
            let (due, pending): (Vec<Hook>, Vec<Hook>) = hooks
                .drain(..)
                .partition(|h| h.op == op && h.at_call == call);
            *hooks = pending;
            due
        };
        if !due.is_empty() {
            let mut indices = self.lock();
            for hook in due {
                (hook.action)(&mut *indices);
            }
        }

        match take_fault(&mut lock(&self.faults), op) {
            Some(error) => {
                tracing::debug!(op = %op, call, "store: injected fault");
                Err(error)
            }
            None => Ok(()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn index_not_found(index: &str) -> StoreError {
    StoreError::index_response(404, es::INDEX_NOT_FOUND, format!("no such index [{index}]"), index)
}

impl DocumentStore for InMemoryStore {
    async fn get_indices(&self, names: &[String]) -> Result<IndexMap, StoreError> {
        self.enter(StoreOp::GetIndices).await?;
        let indices = self.lock();
        let mut found = BTreeMap::new();
        for name in names {
            for concrete in indices.resolve(name) {
                if let Some(index) = indices.get(&concrete) {
                    found.insert(concrete, index.info());
                }
            }
        }
        Ok(found)
    }

    async fn add_write_block(
        &self,
        index: &str,
        _timeout: Duration,
    ) -> Result<Acknowledged, StoreError> {
        self.enter(StoreOp::AddWriteBlock).await?;
        let mut indices = self.lock();
        let target = indices.get_mut(index).ok_or_else(|| index_not_found(index))?;
        target.write_block = true;
        Ok(Acknowledged::FULL)
    }

    async fn remove_write_block(
        &self,
        index: &str,
        _timeout: Duration,
    ) -> Result<Acknowledged, StoreError> {
        self.enter(StoreOp::RemoveWriteBlock).await?;
        let mut indices = self.lock();
        let target = indices.get_mut(index).ok_or_else(|| index_not_found(index))?;
        target.write_block = false;
        Ok(Acknowledged::FULL)
    }

    async fn create_index(
        &self,
        index: &str,
        spec: &IndexSpec,
        _timeout: Duration,
    ) -> Result<Acknowledged, StoreError> {
        self.enter(StoreOp::CreateIndex).await?;
        let mut indices = self.lock();
        if indices.contains(index) {
            return Err(StoreError::index_response(
                400,
                es::RESOURCE_ALREADY_EXISTS,
                format!("index [{index}] already exists"),
                index,
            ));
        }
        if !spec.mappings.is_object() {
            return Err(StoreError::response(
                400,
                es::MAPPER_PARSING,
                "mappings must be an object",
            ));
        }
        let mut created = MemIndex::new(spec.mappings.clone());
        created.number_of_shards = spec.number_of_shards;
        indices.insert(index, created);
        Ok(Acknowledged::FULL)
    }

    async fn clone_index(
        &self,
        source: &str,
        target: &str,
        _timeout: Duration,
    ) -> Result<Acknowledged, StoreError> {
        self.enter(StoreOp::CloneIndex).await?;
        let mut indices = self.lock();
        let src = indices.get(source).ok_or_else(|| index_not_found(source))?;
        if !src.write_block {
            return Err(StoreError::index_response(
                400,
                es::ILLEGAL_STATE,
                format!("index {source} must be read-only to clone it"),
                source,
            ));
        }
        if indices.contains(target) {
            return Err(StoreError::index_response(
                400,
                es::RESOURCE_ALREADY_EXISTS,
                format!("index [{target}] already exists"),
                target,
            ));
        }
        let mut cloned = src.clone();
        cloned.aliases.clear();
        indices.insert(target, cloned);
        Ok(Acknowledged::FULL)
    }

    async fn cluster_health(
        &self,
        index: &str,
        wait_for: IndexStatus,
        timeout: Duration,
    ) -> Result<HealthResponse, StoreError> {
        self.enter(StoreOp::ClusterHealth).await?;
        let status = self
            .lock()
            .get(index)
            .map(|i| i.status)
            .ok_or_else(|| index_not_found(index))?;
        if status.satisfies(wait_for) {
            return Ok(HealthResponse {
                status,
                timed_out: false,
            });
        }
        // The backend holds the request open for the whole timeout.
        tokio::time::sleep(timeout).await;
        Ok(HealthResponse {
            status,
            timed_out: true,
        })
    }

    async fn search_after(
        &self,
        index: &str,
        after: Option<&str>,
        size: usize,
    ) -> Result<Vec<Document>, StoreError> {
        self.enter(StoreOp::SearchAfter).await?;
        let indices = self.lock();
        let src = indices.get(index).ok_or_else(|| index_not_found(index))?;
        let page = src
            .docs
            .iter()
            .filter(|(id, _)| after.map_or(true, |a| id.as_str() > a))
            .take(size)
            .map(|(id, source)| Document::new(id.clone(), source.clone()))
            .collect();
        Ok(page)
    }

    async fn bulk_index(
        &self,
        index: &str,
        docs: &[Document],
        op: BulkOp,
    ) -> Result<BulkResponse, StoreError> {
        self.enter(StoreOp::BulkIndex).await?;
        let mut indices = self.lock();
        let target = indices.get_mut(index).ok_or_else(|| index_not_found(index))?;
        let mut response = BulkResponse::default();
        for doc in docs {
            if target.write_block {
                response.failures.push(BulkItemFailure {
                    id: doc.id.clone(),
                    status: 403,
                    error_type: es::CLUSTER_BLOCK.to_string(),
                    reason: format!(
                        "index [{index}] blocked by: [FORBIDDEN/8/index write (api)];"
                    ),
                });
                continue;
            }
            if op == BulkOp::Create && target.docs.contains_key(&doc.id) {
                response.failures.push(BulkItemFailure {
                    id: doc.id.clone(),
                    status: 409,
                    error_type: es::VERSION_CONFLICT.to_string(),
                    reason: format!("[{}]: version conflict, document already exists", doc.id),
                });
                continue;
            }
            target.docs.insert(doc.id.clone(), doc.source.clone());
            response.indexed += 1;
        }
        Ok(response)
    }

    async fn refresh(&self, index: &str) -> Result<(), StoreError> {
        self.enter(StoreOp::Refresh).await?;
        if self.lock().contains(index) {
            Ok(())
        } else {
            Err(index_not_found(index))
        }
    }

    async fn update_aliases(
        &self,
        actions: &[AliasAction],
        _timeout: Duration,
    ) -> Result<Acknowledged, StoreError> {
        self.enter(StoreOp::UpdateAliases).await?;
        let mut indices = self.lock();

        // Validate the whole batch first; nothing is applied on error.
        for action in actions {
            match action {
                AliasAction::Add { index, .. } => {
                    if !indices.contains(index) {
                        return Err(index_not_found(index));
                    }
                }
                AliasAction::Remove {
                    index,
                    alias,
                    must_exist,
                } => {
                    let Some(target) = indices.get(index) else {
                        return Err(index_not_found(index));
                    };
                    if *must_exist && !target.aliases.contains(alias) {
                        return Err(StoreError::response(
                            404,
                            es::ALIASES_NOT_FOUND,
                            format!("aliases [{alias}] missing"),
                        ));
                    }
                }
                AliasAction::RemoveIndex { index } => {
                    if indices.contains(index) {
                        continue;
                    }
                    if indices.is_alias(index) {
                        return Err(StoreError::response(
                            400,
                            es::ILLEGAL_ARGUMENT,
                            format!(
                                "The provided expression [{index}] matches an alias, specify the corresponding concrete indices instead."
                            ),
                        ));
                    }
                    return Err(index_not_found(index));
                }
            }
        }

        for action in actions {
            match action {
                AliasAction::Add { index, alias } => indices.add_alias(index, alias),
                AliasAction::Remove { index, alias, .. } => {
                    indices.remove_alias(index, alias);
                }
                AliasAction::RemoveIndex { index } => {
                    indices.remove(index);
                }
            }
        }
        Ok(Acknowledged::FULL)
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("indices", &self.index_names())
            .finish_non_exhaustive()
    }
}

/// Empty-object mappings, the default for seeded indices.
pub fn empty_mappings() -> Value {
    serde_json::json!({ "properties": {} })
}
