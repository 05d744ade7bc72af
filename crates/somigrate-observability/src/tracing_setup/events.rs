//! Structured log events for each migration step.
//!
//! Each function emits a `tracing` event with structured fields.

use std::time::Duration;

use somigrate_core::models::ControlState;

/// Log the start of a step.
pub fn step_started(state: ControlState, attempt: u32) {
    tracing::debug!(
        event = "step_started",
        state = %state,
        attempt = attempt,
        "migration step started"
    );
}

/// Log a successful step and where the pipeline goes next.
pub fn step_succeeded(state: ControlState, next: ControlState, elapsed: Duration) {
    tracing::debug!(
        event = "step_succeeded",
        state = %state,
        next = %next,
        elapsed_ms = millis(elapsed),
        "migration step succeeded"
    );
}

/// Log a retryable failure and the backoff before the next attempt.
pub fn step_retrying(
    state: ControlState,
    retry_count: u32,
    max_retries: u32,
    delay: Duration,
    error_tag: &str,
    message: &str,
) {
    tracing::warn!(
        event = "step_retrying",
        state = %state,
        retry_count = retry_count,
        max_retries = max_retries,
        delay_ms = millis(delay),
        error = %error_tag,
        detail = %message,
        "migration step failed with a retryable error, retrying"
    );
}

/// Log an expected race that was absorbed by a recovery transition.
pub fn step_recovered(state: ControlState, next: ControlState, error_tag: &str) {
    tracing::info!(
        event = "step_recovered",
        state = %state,
        next = %next,
        error = %error_tag,
        "migration step hit an expected race, continuing"
    );
}

/// Log the terminal failure of a migration.
pub fn migration_fatal(state: ControlState, error_tag: &str, reason: &str) {
    tracing::error!(
        event = "migration_fatal",
        state = %state,
        error = %error_tag,
        reason = %reason,
        "migration failed"
    );
}

/// Log a completed migration.
pub fn migration_done(target: &str, steps: usize, documents: u64, elapsed: Duration) {
    tracing::info!(
        event = "migration_done",
        target = %target,
        steps = steps,
        documents = documents,
        elapsed_ms = millis(elapsed),
        "migration completed"
    );
}

/// Log reindex batch progress.
pub fn reindex_progress(source: &str, target: &str, migrated: u64) {
    tracing::debug!(
        event = "reindex_progress",
        source = %source,
        target = %target,
        migrated = migrated,
        "reindex progress"
    );
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
