//! # somigrate-engine
//!
//! The migration state machine: a validated transition table mapping each
//! control state to one action, a bounded exponential backoff for retryable
//! failures, and the driver that runs a plan to DONE or FATAL.

pub mod backoff;
pub mod decisions;
pub mod driver;
pub mod steps;
pub mod transitions;

pub use backoff::RetryPolicy;
pub use driver::{migrate, Migrator};
pub use steps::Step;
pub use transitions::{DecisionInput, Next, Recovery, Transition, TransitionTable};
