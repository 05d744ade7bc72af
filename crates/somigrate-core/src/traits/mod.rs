pub mod document_store;
pub mod transform;

pub use document_store::DocumentStore;
pub use transform::{DocumentTransform, IdentityTransform, TransformError};
