use serde::Serialize;

use super::control_state::ControlState;
use super::state::MigrationState;
use crate::errors::ActionError;

/// Terminal result of a migration run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MigrationOutcome {
    Done {
        state: MigrationState,
    },
    Fatal {
        /// State whose action failed.
        failed_state: ControlState,
        error: ActionError,
        /// Operator-facing diagnostic.
        reason: String,
        state: MigrationState,
    },
}

impl MigrationOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }

    pub fn state(&self) -> &MigrationState {
        match self {
            Self::Done { state } | Self::Fatal { state, .. } => state,
        }
    }
}
