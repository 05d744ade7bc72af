//! Migrator: runs a [`MigrationPlan`] through the transition table until
//! DONE or FATAL.

use somigrate_core::config::MigrationConfig;
use somigrate_core::errors::ActionError;
use somigrate_core::models::{
    ControlState, MigrationOutcome, MigrationPlan, MigrationState, StepOutcome,
};
use somigrate_core::traits::DocumentStore;
use somigrate_observability::{events, migration_span, step_span};
use tokio::time::Instant;
use tracing::Instrument;

use crate::backoff::RetryPolicy;
use crate::steps::{self, StepContext};
use crate::transitions::{DecisionInput, TransitionTable};

/// The state machine driver. Holds the store, the table and the config so
/// one instance can run several plans.
pub struct Migrator<'a, S> {
    store: &'a S,
    table: TransitionTable,
    config: MigrationConfig,
    policy: RetryPolicy,
}

impl<'a, S: DocumentStore> Migrator<'a, S> {
    /// A driver using the standard table.
    pub fn new(store: &'a S, config: MigrationConfig) -> Self {
        let policy = RetryPolicy::from(&config.retry);
        Self {
            store,
            table: TransitionTable::default(),
            config,
            policy,
        }
    }

    /// Replace the transition table.
    pub fn with_table(mut self, table: TransitionTable) -> Self {
        self.table = table;
        self
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `plan` to completion. Never panics and never returns early: every
    /// path ends in [`MigrationOutcome::Done`] or [`MigrationOutcome::Fatal`].
    pub async fn run(&self, plan: &MigrationPlan) -> MigrationOutcome {
        let state = MigrationState::new(plan);
        let span = migration_span!(state.run_id, plan.source_index, plan.target_index);
        self.drive(plan, state).instrument(span).await
    }

    async fn drive(&self, plan: &MigrationPlan, mut state: MigrationState) -> MigrationOutcome {
        let strategy = plan.strategy.unwrap_or(self.config.pipeline.strategy);
        let ctx = StepContext {
            plan,
            config: &self.config,
            strategy,
        };
        let input = DecisionInput {
            strategy,
            wait_for_migration_completion: self.config.pipeline.wait_for_migration_completion,
        };
        let started = Instant::now();

        loop {
            let current = state.control_state;
            if current == ControlState::Done {
                events::migration_done(
                    &state.target_index,
                    state.logs.len(),
                    state.documents_migrated,
                    started.elapsed(),
                );
                return MigrationOutcome::Done { state };
            }
            let Some(row) = self.table.row(current) else {
                let error = ActionError::RequestFailed {
                    status: None,
                    error_type: None,
                    reason: format!("no transition defined for {current}"),
                };
                return self.fatal(state, error, format!("{current} has no transition"));
            };

            events::step_started(current, state.retry_count + 1);
            let step_started = Instant::now();
            // Steps never read the step log; keep it out of the copy.
            let logs = std::mem::take(&mut state.logs);
            let result = steps::execute(self.store, &ctx, row.step, state.clone())
                .instrument(step_span!(current, state.retry_count))
                .await;
            state.logs = logs;
            let elapsed = step_started.elapsed();

            let error = match result {
                Ok(mut next_state) => {
                    next_state.logs = std::mem::take(&mut state.logs);
                    let next = row.next.resolve(&next_state, &input);
                    next_state.retry_count = 0;
                    next_state.retry_delay = std::time::Duration::ZERO;
                    next_state.log_step(StepOutcome::Succeeded, elapsed, format!("-> {next}"));
                    next_state.control_state = next;
                    events::step_succeeded(current, next, elapsed);
                    state = next_state;
                    continue;
                }
                Err(error) => error,
            };

            if let Some(next) = row.recovery_for(error.tag()) {
                state.retry_count = 0;
                state.retry_delay = std::time::Duration::ZERO;
                state.log_step(StepOutcome::Recovered, elapsed, error.to_string());
                state.control_state = next;
                events::step_recovered(current, next, error.tag());
                continue;
            }

            if !error.is_retryable() {
                let reason = format!("{current} failed with {}: {error}", error.tag());
                state.log_step(StepOutcome::Failed, elapsed, error.to_string());
                return self.fatal(state, error, reason);
            }

            state.retry_count += 1;
            if self.policy.exhausted(state.retry_count) {
                let reason = format!(
                    "Unable to complete the {current} step after {} attempts, terminating. \
                     The last failure was {}: {error}",
                    self.policy.max_attempts(),
                    error.tag()
                );
                state.log_step(StepOutcome::Failed, elapsed, error.to_string());
                return self.fatal(state, error, reason);
            }

            let delay = self.policy.delay(state.retry_count);
            state.retry_delay = delay;
            state.log_step(StepOutcome::Retrying, elapsed, error.to_string());
            events::step_retrying(
                current,
                state.retry_count,
                self.policy.max_retries,
                delay,
                error.tag(),
                &error.to_string(),
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn fatal(&self, mut state: MigrationState, error: ActionError, reason: String) -> MigrationOutcome {
        let failed_state = state.control_state;
        events::migration_fatal(failed_state, error.tag(), &reason);
        state.control_state = ControlState::Fatal;
        MigrationOutcome::Fatal {
            failed_state,
            error,
            reason,
            state,
        }
    }
}

/// Run `plan` against `store` with the standard table.
pub async fn migrate<S: DocumentStore>(
    store: &S,
    plan: &MigrationPlan,
    config: &MigrationConfig,
) -> MigrationOutcome {
    Migrator::new(store, config.clone()).run(plan).await
}
