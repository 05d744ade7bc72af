//! Retryable vs. fatal classification of raw store errors.

use somigrate_core::constants::es_error_types as es;
use somigrate_core::errors::{ActionError, StoreError};

/// HTTP statuses that signal a transient backend condition.
pub const RETRYABLE_STATUSES: [u16; 5] = [408, 429, 502, 503, 504];

/// Response error types that clear up on their own.
pub const RETRYABLE_ERROR_TYPES: [&str; 2] = [es::SNAPSHOT_IN_PROGRESS, es::CLUSTER_EVENT_TIMEOUT];

/// Result of classifying a store error.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// Tagged `retryable_es_client_error`.
    Retryable(ActionError),
    /// Returned unmodified; the caller maps it or treats it as fatal.
    Other(StoreError),
}

/// Classify a raw store error. Total: every input yields exactly one
/// variant, and 4xx logic errors are never retryable.
pub fn classify(err: StoreError) -> Classified {
    if is_retryable(&err) {
        Classified::Retryable(ActionError::RetryableEsClientError {
            message: err.message(),
            status: err.status(),
        })
    } else {
        Classified::Other(err)
    }
}

fn is_retryable(err: &StoreError) -> bool {
    match err {
        StoreError::Transport { .. } => true,
        StoreError::Response { status, .. } => {
            if RETRYABLE_STATUSES.contains(status) {
                return true;
            }
            match err.error_type() {
                Some(t) if RETRYABLE_ERROR_TYPES.contains(&t) => true,
                // A block that is lifted automatically, e.g. the disk
                // flood-stage read-only block.
                Some(es::CLUSTER_BLOCK) => err
                    .reason()
                    .is_some_and(|r| r.contains("TOO_MANY_REQUESTS")),
                _ => false,
            }
        }
    }
}

/// Classify, then let `map` turn a known non-retryable error into its tag.
/// Anything neither retryable nor mapped becomes fatal `request_failed`.
pub fn to_action_error<F>(err: StoreError, map: F) -> ActionError
where
    F: FnOnce(&StoreError) -> Option<ActionError>,
{
    match classify(err) {
        Classified::Retryable(e) => e,
        Classified::Other(err) => map(&err).unwrap_or_else(|| request_failed(&err)),
    }
}

/// The fatal default for an unclassified store error.
pub fn request_failed(err: &StoreError) -> ActionError {
    ActionError::RequestFailed {
        status: err.status(),
        error_type: err.error_type().map(str::to_string),
        reason: err.message(),
    }
}

/// Map `index_not_found_exception` to its tag, naming `fallback` when the
/// response does not carry the index.
pub fn index_not_found(err: &StoreError, fallback: &str) -> Option<ActionError> {
    (err.error_type() == Some(es::INDEX_NOT_FOUND)).then(|| ActionError::IndexNotFound {
        index: err.index().unwrap_or(fallback).to_string(),
    })
}
