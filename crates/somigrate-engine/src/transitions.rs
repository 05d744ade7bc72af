//! The transition table: which action each control state runs and where the
//! pipeline goes afterwards. Kept as data so the ordering can be audited,
//! tested without a store, and replaced by callers.

use std::collections::BTreeMap;

use somigrate_core::errors::{MigrateError, MigrateResult};
use somigrate_core::models::{ControlState, MigrationState, MigrationStrategy};

use crate::decisions;
use crate::steps::Step;

/// Configuration a decision may consult besides the state itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionInput {
    pub strategy: MigrationStrategy,
    pub wait_for_migration_completion: bool,
}

/// Picks the next state from the state a step produced.
pub type Decision = fn(&MigrationState, &DecisionInput) -> ControlState;

/// Successor of a state after its step succeeded.
#[derive(Clone, Copy)]
pub enum Next {
    To(ControlState),
    Decide(Decision),
}

impl Next {
    pub fn resolve(&self, state: &MigrationState, input: &DecisionInput) -> ControlState {
        match self {
            Self::To(next) => *next,
            Self::Decide(decide) => decide(state, input),
        }
    }
}

impl std::fmt::Debug for Next {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::To(state) => write!(f, "To({state})"),
            Self::Decide(_) => f.write_str("Decide(..)"),
        }
    }
}

/// An error tag that sends the pipeline to `to` instead of FATAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recovery {
    pub tag: &'static str,
    pub to: ControlState,
}

/// One row of the table.
#[derive(Debug, Clone)]
pub struct Transition {
    pub from: ControlState,
    pub step: Step,
    pub next: Next,
    pub recover: Vec<Recovery>,
}

impl Transition {
    pub fn new(from: ControlState, step: Step, next: Next) -> Self {
        Self {
            from,
            step,
            next,
            recover: Vec::new(),
        }
    }

    pub fn recovering(mut self, tag: &'static str, to: ControlState) -> Self {
        self.recover.push(Recovery { tag, to });
        self
    }

    /// Recovery state for an error tag, if this row absorbs it.
    pub fn recovery_for(&self, tag: &str) -> Option<ControlState> {
        self.recover.iter().find(|r| r.tag == tag).map(|r| r.to)
    }
}

/// Validated set of rows, at most one per state.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    rows: BTreeMap<ControlState, Transition>,
}

impl TransitionTable {
    /// Build a table from rows. Rejects duplicate rows, rows for terminal
    /// states, a missing INIT row, transitions into FATAL, and static
    /// targets without a row of their own.
    pub fn new(rows: impl IntoIterator<Item = Transition>) -> MigrateResult<Self> {
        let mut by_state = BTreeMap::new();
        for row in rows {
            if row.from.is_terminal() {
                return Err(invalid(format!("terminal state {} has a row", row.from)));
            }
            let from = row.from;
            if by_state.insert(from, row).is_some() {
                return Err(invalid(format!("{from} has more than one row")));
            }
        }
        let table = Self { rows: by_state };
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> MigrateResult<()> {
        if !self.rows.contains_key(&ControlState::Init) {
            return Err(invalid("no row for INIT".to_string()));
        }
        for row in self.rows.values() {
            let mut targets = row.recover.iter().map(|r| r.to).collect::<Vec<_>>();
            if let Next::To(next) = row.next {
                targets.push(next);
            }
            for target in targets {
                if target == ControlState::Fatal {
                    return Err(invalid(format!(
                        "{} transitions into FATAL; FATAL is reached through errors only",
                        row.from
                    )));
                }
                if target != ControlState::Done && !self.rows.contains_key(&target) {
                    return Err(invalid(format!(
                        "{} transitions to {target}, which has no row",
                        row.from
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn row(&self, state: ControlState) -> Option<&Transition> {
        self.rows.get(&state)
    }

    pub fn rows(&self) -> impl Iterator<Item = &Transition> {
        self.rows.values()
    }

    /// Replace (or add) the row for `row.from`, revalidating the table.
    pub fn with_row(mut self, row: Transition) -> MigrateResult<Self> {
        if row.from.is_terminal() {
            return Err(invalid(format!("terminal state {} has a row", row.from)));
        }
        self.rows.insert(row.from, row);
        self.validate()?;
        Ok(self)
    }
}

impl Default for TransitionTable {
    /// The standard pipeline.
    fn default() -> Self {
        use ControlState as C;
        let rows = [
            Transition::new(C::Init, Step::FetchIndices, Next::Decide(decisions::after_init)),
            Transition::new(
                C::WaitForMigrationCompletion,
                Step::WaitForMigrationCompletion,
                Next::To(C::Done),
            ),
            Transition::new(
                C::WaitForYellowSource,
                Step::WaitForYellowSource,
                Next::To(C::SetSourceWriteBlock),
            ),
            Transition::new(
                C::SetSourceWriteBlock,
                Step::SetSourceWriteBlock,
                Next::Decide(decisions::after_source_write_block),
            ),
            Transition::new(C::CreateTargetIndex, Step::CreateTargetIndex, Next::To(C::Reindex)),
            Transition::new(
                C::CloneSourceToTarget,
                Step::CloneSourceToTarget,
                Next::To(C::VerifyTarget),
            ),
            Transition::new(C::Reindex, Step::Reindex, Next::Decide(decisions::after_reindex)),
            Transition::new(
                C::VerifyTarget,
                Step::VerifyTarget,
                Next::Decide(decisions::after_verify),
            ),
            Transition::new(
                C::SetTargetWriteBlockOff,
                Step::RemoveTargetWriteBlock,
                Next::To(C::UpdateAliases),
            ),
            Transition::new(C::CreateNewTarget, Step::CreateNewTarget, Next::To(C::UpdateAliases)),
            Transition::new(C::UpdateAliases, Step::UpdateAliases, Next::To(C::Done))
                .recovering("alias_not_found_exception", C::UpdateAliasesConflict),
            Transition::new(
                C::UpdateAliasesConflict,
                Step::ResolveAliasConflict,
                Next::To(C::Done),
            ),
        ];
        Self {
            rows: rows.into_iter().map(|row| (row.from, row)).collect(),
        }
    }
}

fn invalid(reason: String) -> MigrateError {
    MigrateError::InvalidTransitionTable { reason }
}
