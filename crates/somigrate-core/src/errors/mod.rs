//! Error hierarchy. Each layer has its own enum; [`MigrateError`] unifies
//! them for callers that only want a single error type.

pub mod action_error;
pub mod config_error;
pub mod store_error;

pub use action_error::ActionError;
pub use config_error::ConfigError;
pub use store_error::{StoreError, TransportErrorKind};

/// Umbrella error for the workspace.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid transition table: {reason}")]
    InvalidTransitionTable { reason: String },
}

pub type MigrateResult<T> = Result<T, MigrateError>;
