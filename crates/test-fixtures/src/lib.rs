//! Shared fixtures for migration tests: seeded index layouts loaded from the
//! `golden/` JSON files, saved-object builders and sample transforms.

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use somigrate_core::models::Document;
use somigrate_core::traits::{DocumentTransform, TransformError};
use somigrate_store::{InMemoryStore, MemIndex};

/// The pre-8.8 layout: `kibana_1` behind `.kibana` with 3 saved objects.
pub const KIBANA_1: &str = "golden/kibana_1.json";
/// An index that already carries the version alias of the next release.
pub const KIBANA_1_MIGRATED: &str = "golden/kibana_1_migrated.json";

/// Absolute path of a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative_path)
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixture_path(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// One seeded index as stored in a fixture file.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexFixture {
    pub index: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub mappings: Value,
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl IndexFixture {
    pub fn load(relative_path: &str) -> Self {
        load_fixture(relative_path)
    }

    pub fn to_mem_index(&self) -> MemIndex {
        self.aliases.iter().fold(
            MemIndex::new(self.mappings.clone()).with_documents(self.documents.clone()),
            |index, alias| index.with_alias(alias.clone()),
        )
    }
}

/// A store holding the indices of the given fixture files.
pub fn seeded_store(fixtures: &[&str]) -> InMemoryStore {
    fixtures.iter().fold(InMemoryStore::new(), |store, path| {
        let fixture = IndexFixture::load(path);
        let index = fixture.to_mem_index();
        store.with_index(fixture.index, index)
    })
}

/// The standard starting point: `kibana_1` (3 documents) behind `.kibana`.
pub fn kibana_1_store() -> InMemoryStore {
    seeded_store(&[KIBANA_1])
}

/// A saved object `{type}:{id}` with `attributes` under its type key.
pub fn saved_object(object_type: &str, id: &str, attributes: Value) -> Document {
    Document::new(
        format!("{object_type}:{id}"),
        json!({
            "type": object_type,
            object_type: attributes,
            "references": [],
        }),
    )
}

/// `count` saved objects of one type, ids `{type}:1` to `{type}:{count}`.
pub fn saved_objects(object_type: &str, count: usize) -> Vec<Document> {
    (1..=count)
        .map(|i| saved_object(object_type, &i.to_string(), json!({ "title": format!("{object_type} {i}") })))
        .collect()
}

/// Transform that sets `attributes[key] = value` on every saved object.
/// Documents without a `type` are rejected, like a real migration would.
pub fn set_attribute(key: &str, value: Value) -> impl DocumentTransform {
    let key = key.to_string();
    move |mut doc: Document| -> Result<Document, TransformError> {
        let object_type = doc
            .object_type()
            .ok_or_else(|| TransformError::new(format!("document {} has no type", doc.id)))?
            .to_string();
        match doc.source.get_mut(&object_type).and_then(Value::as_object_mut) {
            Some(attributes) => {
                attributes.insert(key.clone(), value.clone());
                Ok(doc)
            }
            None => Err(TransformError::new(format!(
                "document {} has no {object_type} attributes",
                doc.id
            ))),
        }
    }
}

/// Transform that fails on every document of `object_type`, the shape of a
/// migration function that does not understand old data.
pub fn reject_type(object_type: &str) -> impl DocumentTransform {
    let object_type = object_type.to_string();
    move |doc: Document| -> Result<Document, TransformError> {
        if doc.object_type() == Some(object_type.as_str()) {
            Err(TransformError::new(format!(
                "cannot migrate {object_type}: unexpected attribute layout"
            )))
        } else {
            Ok(doc)
        }
    }
}
