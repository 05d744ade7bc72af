pub mod control_state;
pub mod document;
pub mod index;
pub mod outcome;
pub mod plan;
pub mod state;

pub use control_state::ControlState;
pub use document::Document;
pub use index::{
    alias_bindings, Acknowledged, AliasAction, BulkItemFailure, BulkOp, BulkResponse, HealthResponse,
    IndexInfo, IndexMap, IndexSpec, IndexStatus,
};
pub use outcome::MigrationOutcome;
pub use plan::{MigrationPlan, MigrationStrategy};
pub use state::{MigrationState, StepLog, StepOutcome};
