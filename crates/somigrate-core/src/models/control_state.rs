use std::fmt;

use serde::{Deserialize, Serialize};

/// Stage of the migration pipeline. Each non-terminal state maps to exactly
/// one action in the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlState {
    Init,
    WaitForMigrationCompletion,
    WaitForYellowSource,
    SetSourceWriteBlock,
    CreateTargetIndex,
    CloneSourceToTarget,
    Reindex,
    VerifyTarget,
    SetTargetWriteBlockOff,
    CreateNewTarget,
    UpdateAliases,
    UpdateAliasesConflict,
    Done,
    Fatal,
}

impl ControlState {
    pub const ALL: [ControlState; 14] = [
        Self::Init,
        Self::WaitForMigrationCompletion,
        Self::WaitForYellowSource,
        Self::SetSourceWriteBlock,
        Self::CreateTargetIndex,
        Self::CloneSourceToTarget,
        Self::Reindex,
        Self::VerifyTarget,
        Self::SetTargetWriteBlockOff,
        Self::CreateNewTarget,
        Self::UpdateAliases,
        Self::UpdateAliasesConflict,
        Self::Done,
        Self::Fatal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::WaitForMigrationCompletion => "WAIT_FOR_MIGRATION_COMPLETION",
            Self::WaitForYellowSource => "WAIT_FOR_YELLOW_SOURCE",
            Self::SetSourceWriteBlock => "SET_SOURCE_WRITE_BLOCK",
            Self::CreateTargetIndex => "CREATE_TARGET_INDEX",
            Self::CloneSourceToTarget => "CLONE_SOURCE_TO_TARGET",
            Self::Reindex => "REINDEX",
            Self::VerifyTarget => "VERIFY_TARGET",
            Self::SetTargetWriteBlockOff => "SET_TARGET_WRITE_BLOCK_OFF",
            Self::CreateNewTarget => "CREATE_NEW_TARGET",
            Self::UpdateAliases => "UPDATE_ALIASES",
            Self::UpdateAliasesConflict => "UPDATE_ALIASES_CONFLICT",
            Self::Done => "DONE",
            Self::Fatal => "FATAL",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Fatal)
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
