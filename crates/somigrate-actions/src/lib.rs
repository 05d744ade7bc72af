//! # somigrate-actions
//!
//! The building blocks of an index migration: a classifier that sorts raw
//! store errors into retryable and fatal, the idempotent primitive actions,
//! and the guarded composites the driver calls.

pub mod classifier;
pub mod primitives;
pub mod safe_write_block;

pub use classifier::{classify, Classified};
pub use primitives::*;
pub use safe_write_block::{safe_update_aliases, safe_write_block, SafeWriteBlockParams};
