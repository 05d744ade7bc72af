//! Plain in-memory index data. Mutated only under the store's lock.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use somigrate_core::constants::INDEX_NUMBER_OF_SHARDS;
use somigrate_core::models::{Document, IndexInfo, IndexStatus};

/// One concrete index.
#[derive(Debug, Clone)]
pub struct MemIndex {
    pub docs: BTreeMap<String, Value>,
    pub aliases: BTreeSet<String>,
    pub write_block: bool,
    pub number_of_shards: u32,
    pub mappings: Value,
    pub status: IndexStatus,
}

impl MemIndex {
    pub fn new(mappings: Value) -> Self {
        Self {
            docs: BTreeMap::new(),
            aliases: BTreeSet::new(),
            write_block: false,
            number_of_shards: INDEX_NUMBER_OF_SHARDS,
            mappings,
            status: IndexStatus::Green,
        }
    }

    pub fn with_documents(mut self, docs: impl IntoIterator<Item = Document>) -> Self {
        for doc in docs {
            self.docs.insert(doc.id, doc.source);
        }
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.insert(alias.into());
        self
    }

    pub fn write_blocked(mut self) -> Self {
        self.write_block = true;
        self
    }

    pub fn info(&self) -> IndexInfo {
        IndexInfo {
            aliases: self.aliases.clone(),
            write_block: self.write_block,
            number_of_shards: self.number_of_shards,
            mappings: self.mappings.clone(),
        }
    }
}

/// All indices of the store, by name.
#[derive(Debug, Clone, Default)]
pub struct Indices {
    pub(crate) by_name: BTreeMap<String, MemIndex>,
}

impl Indices {
    pub fn get(&self, index: &str) -> Option<&MemIndex> {
        self.by_name.get(index)
    }

    pub fn get_mut(&mut self, index: &str) -> Option<&mut MemIndex> {
        self.by_name.get_mut(index)
    }

    pub fn insert(&mut self, name: impl Into<String>, index: MemIndex) {
        self.by_name.insert(name.into(), index);
    }

    pub fn remove(&mut self, index: &str) -> Option<MemIndex> {
        self.by_name.remove(index)
    }

    pub fn contains(&self, index: &str) -> bool {
        self.by_name.contains_key(index)
    }

    /// Whether some index carries `alias`.
    pub fn is_alias(&self, name: &str) -> bool {
        self.by_name.values().any(|i| i.aliases.contains(name))
    }

    /// Bind `alias` to `index`. No-op when the index is missing.
    pub fn add_alias(&mut self, index: &str, alias: &str) {
        if let Some(i) = self.by_name.get_mut(index) {
            i.aliases.insert(alias.to_string());
        }
    }

    /// Unbind `alias` from `index`. Returns whether it was bound.
    pub fn remove_alias(&mut self, index: &str, alias: &str) -> bool {
        self.by_name
            .get_mut(index)
            .map(|i| i.aliases.remove(alias))
            .unwrap_or(false)
    }

    /// Concrete indices addressed by `name`: the index itself, or every
    /// index carrying `name` as an alias.
    pub fn resolve(&self, name: &str) -> Vec<String> {
        if self.by_name.contains_key(name) {
            return vec![name.to_string()];
        }
        self.by_name
            .iter()
            .filter(|(_, i)| i.aliases.contains(name))
            .map(|(n, _)| n.clone())
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.by_name.keys()
    }
}
