//! # somigrate-core
//!
//! Foundation crate for the saved objects index migration engine.
//! Defines the migration state, index metadata, errors, config, and the
//! document-store seam. Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::MigrationConfig;
pub use errors::{ActionError, MigrateError, MigrateResult, StoreError};
pub use models::{ControlState, Document, MigrationOutcome, MigrationPlan, MigrationState};
pub use traits::{DocumentStore, DocumentTransform};
