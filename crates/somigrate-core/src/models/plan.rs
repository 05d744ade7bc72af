use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::traits::{DocumentTransform, IdentityTransform};

/// How the target index is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStrategy {
    /// Create the target with new mappings and copy every document through
    /// the transform.
    #[default]
    Reindex,
    /// Clone the write-blocked source as-is. Only valid when neither
    /// mappings nor documents change.
    Clone,
}

/// What to migrate: the index pair, the aliases to move, and the target
/// mappings/transform. Supplied by the orchestrating caller.
#[derive(Clone)]
pub struct MigrationPlan {
    /// Alias the application reads and writes through, e.g. `.kibana`.
    pub current_alias: String,
    /// Alias marking a completed migration to this version, e.g. `.kibana_8.8.0`.
    pub version_alias: String,
    pub source_index: String,
    pub target_index: String,
    pub target_mappings: Value,
    /// Overrides `pipeline.strategy` from the config when set.
    pub strategy: Option<MigrationStrategy>,
    pub transform: Arc<dyn DocumentTransform>,
}

impl MigrationPlan {
    pub fn new(
        current_alias: impl Into<String>,
        version_alias: impl Into<String>,
        source_index: impl Into<String>,
        target_index: impl Into<String>,
    ) -> Self {
        Self {
            current_alias: current_alias.into(),
            version_alias: version_alias.into(),
            source_index: source_index.into(),
            target_index: target_index.into(),
            target_mappings: serde_json::json!({ "dynamic": false, "properties": {} }),
            strategy: None,
            transform: Arc::new(IdentityTransform),
        }
    }

    pub fn with_mappings(mut self, mappings: Value) -> Self {
        self.target_mappings = mappings;
        self
    }

    pub fn with_transform(mut self, transform: Arc<dyn DocumentTransform>) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_strategy(mut self, strategy: MigrationStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// blake3 digest of the target mappings. serde_json objects are
    /// key-sorted, so equal mappings always hash equally.
    pub fn mapping_version(&self) -> String {
        let bytes = serde_json::to_vec(&self.target_mappings).unwrap_or_default();
        blake3::hash(&bytes).to_hex().to_string()
    }
}

impl fmt::Debug for MigrationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationPlan")
            .field("current_alias", &self.current_alias)
            .field("version_alias", &self.version_alias)
            .field("source_index", &self.source_index)
            .field("target_index", &self.target_index)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}
