//! # somigrate-observability
//!
//! Tracing subscriber setup plus the structured events and spans emitted
//! while a migration runs.

pub mod tracing_setup;

pub use tracing_setup::events;
pub use tracing_setup::init_tracing_from_config;
