//! Step execution: run one action against the store and fold its result
//! into the next [`MigrationState`].

use std::time::Duration;

use somigrate_actions::{
    clone_index, create_index, fetch_indices, reindex, remove_write_block, safe_update_aliases,
    safe_write_block, update_aliases, verify_index_equality, wait_for_index_status,
    with_mapping_version, ReindexParams, SafeWriteBlockParams, VerifyMode,
};
use somigrate_core::config::MigrationConfig;
use somigrate_core::errors::ActionError;
use somigrate_core::models::{
    alias_bindings, AliasAction, IndexStatus, MigrationPlan, MigrationState, MigrationStrategy,
};
use somigrate_core::traits::DocumentStore;
use tokio::time::Instant;

/// The action a control state runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    FetchIndices,
    WaitForMigrationCompletion,
    WaitForYellowSource,
    SetSourceWriteBlock,
    CreateTargetIndex,
    CloneSourceToTarget,
    Reindex,
    VerifyTarget,
    RemoveTargetWriteBlock,
    CreateNewTarget,
    UpdateAliases,
    ResolveAliasConflict,
}

/// Everything a step reads besides the state.
pub struct StepContext<'a> {
    pub plan: &'a MigrationPlan,
    pub config: &'a MigrationConfig,
    pub strategy: MigrationStrategy,
}

impl StepContext<'_> {
    fn timeout(&self) -> Option<Duration> {
        Some(self.config.actions.timeout())
    }

    fn status_timeout(&self) -> Option<Duration> {
        Some(self.config.actions.wait_for_status_timeout())
    }
}

/// Run `step` and return the state it leads to. On error the caller keeps
/// the state it passed in, so a replay starts from the same input.
pub async fn execute<S: DocumentStore>(
    store: &S,
    ctx: &StepContext<'_>,
    step: Step,
    mut state: MigrationState,
) -> Result<MigrationState, ActionError> {
    match step {
        Step::FetchIndices => {
            let names = [
                state.current_alias.clone(),
                state.version_alias.clone(),
                state.source_index.clone(),
                state.target_index.clone(),
            ];
            let indices = fetch_indices(store, &names, ctx.timeout()).await?;
            state.source_exists = indices.contains_key(&state.source_index);
            state.alias_map = alias_bindings(&indices);
        }
        Step::WaitForMigrationCompletion => {
            wait_for_published_target(store, ctx, &mut state).await?;
        }
        Step::WaitForYellowSource => {
            wait_for_index_status(
                store,
                &state.source_index,
                IndexStatus::Yellow,
                ctx.status_timeout(),
            )
            .await?;
        }
        Step::SetSourceWriteBlock => {
            let params = SafeWriteBlockParams {
                source: &state.source_index,
                target: &state.target_index,
                timeout: ctx.timeout(),
            };
            safe_write_block(store, params).await?;
        }
        Step::CreateTargetIndex | Step::CreateNewTarget => {
            let mappings = with_mapping_version(&ctx.plan.target_mappings, &state.mapping_version);
            create_index(
                store,
                &state.target_index,
                &mappings,
                ctx.timeout(),
                ctx.status_timeout(),
            )
            .await?;
        }
        Step::CloneSourceToTarget => {
            clone_index(
                store,
                &state.source_index,
                &state.target_index,
                ctx.timeout(),
                ctx.status_timeout(),
            )
            .await?;
        }
        Step::Reindex => {
            if refresh_version_alias(store, ctx, &mut state).await? {
                return Ok(state);
            }
            let params = ReindexParams {
                source: &state.source_index,
                target: &state.target_index,
                transform: ctx.plan.transform.as_ref(),
                batch_size: ctx.config.actions.batch_size,
                timeout: ctx.timeout(),
            };
            let summary = reindex(store, params).await?;
            state.documents_migrated = summary.indexed + summary.existing;
        }
        Step::VerifyTarget => {
            if refresh_version_alias(store, ctx, &mut state).await? {
                return Ok(state);
            }
            let mode = match ctx.strategy {
                MigrationStrategy::Reindex => VerifyMode::Ids,
                MigrationStrategy::Clone => VerifyMode::Contents,
            };
            let outcome = verify_index_equality(
                store,
                &state.source_index,
                &state.target_index,
                mode,
                ctx.config.actions.batch_size,
                ctx.timeout(),
            )
            .await?;
            state.documents_migrated = outcome.documents;
        }
        Step::RemoveTargetWriteBlock => {
            remove_write_block(store, &state.target_index, ctx.timeout()).await?;
        }
        Step::UpdateAliases => {
            let actions = alias_actions(&state);
            safe_update_aliases(
                store,
                &state.source_index,
                &state.target_index,
                &actions,
                ctx.timeout(),
            )
            .await?;
            state.pending_alias_actions = actions;
        }
        Step::ResolveAliasConflict => {
            let actions = resolve_alias_conflict(store, ctx, &mut state).await?;
            state.pending_alias_actions = actions;
        }
    }
    Ok(state)
}

/// Re-read where the version alias points. Returns whether the target is
/// already published, in which case another instance finished the
/// migration and users may be writing to the target.
async fn refresh_version_alias<S: DocumentStore>(
    store: &S,
    ctx: &StepContext<'_>,
    state: &mut MigrationState,
) -> Result<bool, ActionError> {
    let indices = fetch_indices(store, &[state.version_alias.clone()], ctx.timeout()).await?;
    let bound = alias_bindings(&indices)
        .remove(&state.version_alias)
        .unwrap_or_default();
    state.alias_map.insert(state.version_alias.clone(), bound);
    Ok(state.target_published())
}

/// Poll until the version alias is bound to the target. A version alias on
/// any other index does not count. Polling does not use the retry budget;
/// only `pipeline.migration_wait_timeout_secs` ends it early.
async fn wait_for_published_target<S: DocumentStore>(
    store: &S,
    ctx: &StepContext<'_>,
    state: &mut MigrationState,
) -> Result<(), ActionError> {
    let pipeline = &ctx.config.pipeline;
    let deadline = pipeline
        .migration_wait_timeout()
        .map(|timeout| Instant::now() + timeout);
    loop {
        if refresh_version_alias(store, ctx, state).await? {
            return Ok(());
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(ActionError::MigrationInProgress {
                version_alias: state.version_alias.clone(),
            });
        }
        tracing::debug!(
            version_alias = %state.version_alias,
            target = %state.target_index,
            "waiting for another instance to publish the target"
        );
        tokio::time::sleep(pipeline.migration_poll_interval()).await;
    }
}

/// The alias batch that publishes the target: move the current alias off
/// the source and bind both aliases to the target.
pub fn alias_actions(state: &MigrationState) -> Vec<AliasAction> {
    let mut actions = Vec::with_capacity(3);
    if state.source_exists {
        actions.push(AliasAction::remove(&state.source_index, &state.current_alias));
    }
    actions.push(AliasAction::add(&state.target_index, &state.current_alias));
    actions.push(AliasAction::add(&state.target_index, &state.version_alias));
    actions
}

/// Re-read the aliases after a failed swap and apply only what is still
/// missing. Another instance that moved the aliases first leaves nothing
/// (or only the version alias) to do. An alias held by an index outside
/// the pair is a real conflict.
async fn resolve_alias_conflict<S: DocumentStore>(
    store: &S,
    ctx: &StepContext<'_>,
    state: &mut MigrationState,
) -> Result<Vec<AliasAction>, ActionError> {
    let names = [
        state.current_alias.clone(),
        state.version_alias.clone(),
        state.source_index.clone(),
        state.target_index.clone(),
    ];
    let indices = fetch_indices(store, &names, ctx.timeout()).await?;
    state.alias_map = alias_bindings(&indices);

    for alias in [&state.current_alias, &state.version_alias] {
        if let Some(other) = state
            .alias_targets(alias)
            .iter()
            .find(|i| **i != state.source_index && **i != state.target_index)
        {
            return Err(ActionError::AliasConflict {
                alias: alias.clone(),
                index: other.clone(),
            });
        }
    }

    let remaining: Vec<AliasAction> = alias_actions(state)
        .into_iter()
        .filter(|action| match action {
            AliasAction::Remove { index, alias, .. } => state.alias_points_to(alias, index),
            AliasAction::Add { index, alias } => !state.alias_points_to(alias, index),
            AliasAction::RemoveIndex { .. } => true,
        })
        .collect();
    update_aliases(store, &remaining, ctx.timeout()).await?;
    Ok(remaining)
}
