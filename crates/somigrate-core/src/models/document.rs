use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored document: its stable id and JSON source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub source: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, source: Value) -> Self {
        Self {
            id: id.into(),
            source,
        }
    }

    /// Saved-object type (`source.type`), if present.
    pub fn object_type(&self) -> Option<&str> {
        self.source.get("type").and_then(Value::as_str)
    }
}
