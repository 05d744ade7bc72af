//! Index metadata and request/response shapes exchanged with the document store.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{INDEX_AUTO_EXPAND_REPLICAS, INDEX_NUMBER_OF_SHARDS};

/// Metadata of one concrete index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub aliases: BTreeSet<String>,
    pub write_block: bool,
    pub number_of_shards: u32,
    pub mappings: Value,
}

/// Concrete index name -> metadata. Missing indices are simply absent.
pub type IndexMap = BTreeMap<String, IndexInfo>;

/// Alias name -> indices it is bound to, derived from an [`IndexMap`].
pub fn alias_bindings(indices: &IndexMap) -> BTreeMap<String, Vec<String>> {
    let mut bindings: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (index, info) in indices {
        for alias in &info.aliases {
            bindings.entry(alias.clone()).or_default().push(index.clone());
        }
    }
    bindings
}

/// Index health, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexStatus {
    Red,
    Yellow,
    Green,
}

impl IndexStatus {
    /// `self` is at least as healthy as `wanted`.
    pub fn satisfies(&self, wanted: IndexStatus) -> bool {
        *self >= wanted
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
        }
    }
}

/// One entry of an atomic alias update batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasAction {
    Add {
        index: String,
        alias: String,
    },
    Remove {
        index: String,
        alias: String,
        must_exist: bool,
    },
    RemoveIndex {
        index: String,
    },
}

impl AliasAction {
    pub fn add(index: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::Add {
            index: index.into(),
            alias: alias.into(),
        }
    }

    pub fn remove(index: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::Remove {
            index: index.into(),
            alias: alias.into(),
            must_exist: true,
        }
    }

    /// Index this action binds or unbinds.
    pub fn index(&self) -> &str {
        match self {
            Self::Add { index, .. } | Self::Remove { index, .. } | Self::RemoveIndex { index } => {
                index
            }
        }
    }
}

/// Settings and mappings for a new index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub mappings: Value,
    pub number_of_shards: u32,
    pub auto_expand_replicas: String,
}

impl IndexSpec {
    pub fn with_mappings(mappings: Value) -> Self {
        Self {
            mappings,
            number_of_shards: INDEX_NUMBER_OF_SHARDS,
            auto_expand_replicas: INDEX_AUTO_EXPAND_REPLICAS.to_string(),
        }
    }
}

/// Acknowledgement of a metadata write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledged {
    pub acknowledged: bool,
    pub shards_acknowledged: bool,
}

impl Acknowledged {
    pub const FULL: Acknowledged = Acknowledged {
        acknowledged: true,
        shards_acknowledged: true,
    };
}

/// Result of a health wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: IndexStatus,
    pub timed_out: bool,
}

/// How a bulk write treats ids that already exist in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkOp {
    /// Create or overwrite.
    Index,
    /// Create only; an existing id is rejected with a 409
    /// `version_conflict_engine_exception` and left untouched.
    Create,
}

/// One rejected item of a bulk write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItemFailure {
    pub id: String,
    pub status: u16,
    pub error_type: String,
    pub reason: String,
}

/// Outcome of a bulk write. The request itself succeeded; individual items
/// may still have been rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkResponse {
    pub indexed: usize,
    pub failures: Vec<BulkItemFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(aliases: &[&str]) -> IndexInfo {
        IndexInfo {
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            write_block: false,
            number_of_shards: 1,
            mappings: Value::Null,
        }
    }

    #[test]
    fn alias_bindings_inverts_index_map() {
        let mut indices = IndexMap::new();
        indices.insert("kibana_1".into(), info(&[".kibana", ".kibana_8.7.0"]));
        indices.insert("kibana_2".into(), info(&[".kibana_8.8.0"]));

        let bindings = alias_bindings(&indices);
        assert_eq!(bindings[".kibana"], vec!["kibana_1".to_string()]);
        assert_eq!(bindings[".kibana_8.8.0"], vec!["kibana_2".to_string()]);
        assert_eq!(bindings.len(), 3);
    }

    #[test]
    fn status_ordering() {
        assert!(IndexStatus::Green.satisfies(IndexStatus::Yellow));
        assert!(IndexStatus::Yellow.satisfies(IndexStatus::Yellow));
        assert!(!IndexStatus::Red.satisfies(IndexStatus::Yellow));
        assert!(!IndexStatus::Yellow.satisfies(IndexStatus::Green));
    }

    #[test]
    fn alias_action_serializes_like_the_backend_api() {
        let json = serde_json::to_value(AliasAction::add("kibana_2", ".kibana")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"add": {"index": "kibana_2", "alias": ".kibana"}})
        );
    }
}
