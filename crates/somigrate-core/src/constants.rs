//! Wire-level constants shared by the actions and the in-memory store.

/// Shard count used for every index the migration creates.
pub const INDEX_NUMBER_OF_SHARDS: u32 = 1;

/// Replica policy used for every index the migration creates.
pub const INDEX_AUTO_EXPAND_REPLICAS: &str = "0-1";

/// Extra time the client waits on top of a request's own timeout before
/// giving up locally. Lets the backend report its own timeout first.
pub const REQUEST_TIMEOUT_GRACE_MS: u64 = 5_000;

/// Key under `_meta` where the target mapping version is recorded.
pub const MAPPING_VERSION_META_KEY: &str = "mappingVersion";

/// Backend error types, as reported in `error.type` of a response body.
pub mod es_error_types {
    pub const INDEX_NOT_FOUND: &str = "index_not_found_exception";
    pub const ALIASES_NOT_FOUND: &str = "aliases_not_found_exception";
    pub const RESOURCE_ALREADY_EXISTS: &str = "resource_already_exists_exception";
    pub const SNAPSHOT_IN_PROGRESS: &str = "snapshot_in_progress_exception";
    pub const CLUSTER_EVENT_TIMEOUT: &str = "process_cluster_event_timeout_exception";
    pub const CLUSTER_BLOCK: &str = "cluster_block_exception";
    pub const ILLEGAL_ARGUMENT: &str = "illegal_argument_exception";
    pub const ILLEGAL_STATE: &str = "illegal_state_exception";
    pub const MAPPER_PARSING: &str = "mapper_parsing_exception";
    pub const VERSION_CONFLICT: &str = "version_conflict_engine_exception";
}
