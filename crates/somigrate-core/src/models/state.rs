use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::control_state::ControlState;
use super::index::AliasAction;
use super::plan::MigrationPlan;

/// How one step invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    Retrying,
    Recovered,
    Failed,
}

/// One entry of the executed-step log.
#[derive(Debug, Clone, Serialize)]
pub struct StepLog {
    pub state: ControlState,
    pub outcome: StepOutcome,
    pub elapsed_ms: u64,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// The unit of progress threaded through every action call. Plain data:
/// the driver owns it and replaces it between steps.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationState {
    /// Identifies this run in logs; concurrent instances get distinct ids.
    pub run_id: Uuid,
    pub control_state: ControlState,
    pub source_index: String,
    pub target_index: String,
    pub current_alias: String,
    pub version_alias: String,
    /// Alias -> indices, as observed by the last metadata fetch.
    pub alias_map: BTreeMap<String, Vec<String>>,
    pub source_exists: bool,
    /// Digest of the target mappings this migration writes.
    pub mapping_version: String,
    pub retry_count: u32,
    pub retry_delay: Duration,
    /// Alias batch last sent by UPDATE_ALIASES, kept for conflict resolution.
    pub pending_alias_actions: Vec<AliasAction>,
    pub documents_migrated: u64,
    pub logs: Vec<StepLog>,
}

impl MigrationState {
    /// Initial state for a plan. Everything the pipeline needs to know about
    /// the live indices is filled in by INIT.
    pub fn new(plan: &MigrationPlan) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            control_state: ControlState::Init,
            source_index: plan.source_index.clone(),
            target_index: plan.target_index.clone(),
            current_alias: plan.current_alias.clone(),
            version_alias: plan.version_alias.clone(),
            alias_map: BTreeMap::new(),
            source_exists: false,
            mapping_version: plan.mapping_version(),
            retry_count: 0,
            retry_delay: Duration::ZERO,
            pending_alias_actions: Vec::new(),
            documents_migrated: 0,
            logs: Vec::new(),
        }
    }

    /// Indices the alias is currently bound to.
    pub fn alias_targets(&self, alias: &str) -> &[String] {
        self.alias_map.get(alias).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `alias` points at `index`.
    pub fn alias_points_to(&self, alias: &str, index: &str) -> bool {
        self.alias_targets(alias).iter().any(|i| i == index)
    }

    /// Whether the version alias is bound to the target, i.e. some instance
    /// already finished this migration.
    pub fn target_published(&self) -> bool {
        self.alias_points_to(&self.version_alias, &self.target_index)
    }

    pub fn log_step(&mut self, outcome: StepOutcome, elapsed: Duration, message: impl Into<String>) {
        self.logs.push(StepLog {
            state: self.control_state,
            outcome,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            message: message.into(),
            at: Utc::now(),
        });
    }
}
