//! Span definitions for a migration run and its steps.

/// Create the span wrapping a whole migration run.
#[macro_export]
macro_rules! migration_span {
    ($run_id:expr, $source:expr, $target:expr) => {
        tracing::info_span!(
            "somigrate.migration",
            run_id = %$run_id,
            source = %$source,
            target = %$target
        )
    };
}

/// Create the span wrapping one step invocation.
#[macro_export]
macro_rules! step_span {
    ($state:expr, $retry_count:expr) => {
        tracing::debug_span!("somigrate.step", state = %$state, retry_count = $retry_count)
    };
}

