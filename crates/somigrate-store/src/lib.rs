//! # somigrate-store
//!
//! In-memory [`somigrate_core::DocumentStore`] used to run the migration
//! without a live backend, with per-operation fault injection, latency, and
//! scripted concurrent mutations.

pub mod faults;
pub mod indices;
pub mod memory_store;

pub use faults::StoreOp;
pub use indices::{Indices, MemIndex};
pub use memory_store::{empty_mappings, InMemoryStore};
