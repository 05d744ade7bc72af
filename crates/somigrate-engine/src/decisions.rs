//! Branching successors of the default table.

use somigrate_core::models::{ControlState, MigrationState, MigrationStrategy};

use crate::transitions::DecisionInput;

/// After INIT has observed the live aliases.
pub fn after_init(state: &MigrationState, input: &DecisionInput) -> ControlState {
    if state.target_published() {
        ControlState::Done
    } else if input.wait_for_migration_completion {
        ControlState::WaitForMigrationCompletion
    } else if !state.source_exists {
        ControlState::CreateNewTarget
    } else {
        ControlState::WaitForYellowSource
    }
}

/// After the source is write-blocked: populate the target.
pub fn after_source_write_block(_state: &MigrationState, input: &DecisionInput) -> ControlState {
    match input.strategy {
        MigrationStrategy::Reindex => ControlState::CreateTargetIndex,
        MigrationStrategy::Clone => ControlState::CloneSourceToTarget,
    }
}

/// After REINDEX. Another instance may have published the target while
/// this one was copying.
pub fn after_reindex(state: &MigrationState, _input: &DecisionInput) -> ControlState {
    if state.target_published() {
        ControlState::Done
    } else {
        ControlState::VerifyTarget
    }
}

/// After VERIFY_TARGET.
pub fn after_verify(state: &MigrationState, _input: &DecisionInput) -> ControlState {
    if state.target_published() {
        ControlState::Done
    } else {
        ControlState::SetTargetWriteBlockOff
    }
}
