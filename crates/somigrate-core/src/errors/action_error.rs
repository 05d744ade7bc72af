use serde::Serialize;

/// Tagged failure of a migration action. The serialized `type` field is the
/// tag the driver dispatches on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionError {
    #[error("retryable backend error: {message}")]
    RetryableEsClientError {
        message: String,
        status: Option<u16>,
    },

    #[error("index not found: {index}")]
    #[serde(rename = "index_not_found_exception")]
    IndexNotFound { index: String },

    #[error("source and target index are the same: {index}")]
    SourceEqualsTarget { index: String },

    #[error("alias not found: {reason}")]
    #[serde(rename = "alias_not_found_exception")]
    AliasNotFound { reason: String },

    #[error("alias action removes {index}, which is an alias, not a concrete index")]
    RemoveIndexNotAConcreteIndex { index: String },

    #[error("index {index} did not reach green status: {message}")]
    IndexNotGreenTimeout { index: String, message: String },

    #[error("index {index} did not reach yellow status: {message}")]
    IndexNotYellowTimeout { index: String, message: String },

    #[error("gave up waiting for another instance to publish alias {version_alias}")]
    MigrationInProgress { version_alias: String },

    #[error("clone target {target} already exists with different settings: {reason}")]
    CloneTargetMismatch { target: String, reason: String },

    #[error("transform failed for document {document_id}: {reason}")]
    DocumentTransformFailed { document_id: String, reason: String },

    #[error("bulk write to {index} rejected {failures} documents, first: {first_reason}")]
    BulkIndexFailed {
        index: String,
        failures: usize,
        first_reason: String,
    },

    #[error(
        "index {target} is missing documents of {source_index}: {source_count} source docs, \
         {target_count} target docs, first mismatch {document_id}"
    )]
    IndexContentMismatch {
        source_index: String,
        target: String,
        source_count: u64,
        target_count: u64,
        document_id: String,
    },

    #[error("alias {alias} is bound to unexpected index {index}")]
    AliasConflict { alias: String, index: String },

    #[error("request failed: {reason}")]
    RequestFailed {
        status: Option<u16>,
        error_type: Option<String>,
        reason: String,
    },
}

impl ActionError {
    /// The snake_case tag, identical to the serialized `type` field.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::RetryableEsClientError { .. } => "retryable_es_client_error",
            Self::IndexNotFound { .. } => "index_not_found_exception",
            Self::SourceEqualsTarget { .. } => "source_equals_target",
            Self::AliasNotFound { .. } => "alias_not_found_exception",
            Self::RemoveIndexNotAConcreteIndex { .. } => "remove_index_not_a_concrete_index",
            Self::IndexNotGreenTimeout { .. } => "index_not_green_timeout",
            Self::IndexNotYellowTimeout { .. } => "index_not_yellow_timeout",
            Self::MigrationInProgress { .. } => "migration_in_progress",
            Self::CloneTargetMismatch { .. } => "clone_target_mismatch",
            Self::DocumentTransformFailed { .. } => "document_transform_failed",
            Self::BulkIndexFailed { .. } => "bulk_index_failed",
            Self::IndexContentMismatch { .. } => "index_content_mismatch",
            Self::AliasConflict { .. } => "alias_conflict",
            Self::RequestFailed { .. } => "request_failed",
        }
    }

    /// Whether the driver may replay the same step after a backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RetryableEsClientError { .. }
                | Self::IndexNotGreenTimeout { .. }
                | Self::IndexNotYellowTimeout { .. }
        )
    }
}
