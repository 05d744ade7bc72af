//! Fault injection: scripted errors and mutations per store operation.

use std::fmt;

use somigrate_core::errors::StoreError;

use crate::indices::Indices;

/// Store operations, one per [`somigrate_core::DocumentStore`] method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    GetIndices,
    AddWriteBlock,
    RemoveWriteBlock,
    CreateIndex,
    CloneIndex,
    ClusterHealth,
    SearchAfter,
    BulkIndex,
    Refresh,
    UpdateAliases,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An error returned for the next `remaining` calls of `op`
/// (`None` = every call).
#[derive(Debug, Clone)]
pub(crate) struct Fault {
    pub op: StoreOp,
    pub error: StoreError,
    pub remaining: Option<usize>,
}

/// Take the error for this call of `op`, if one is scripted.
pub(crate) fn take_fault(faults: &mut Vec<Fault>, op: StoreOp) -> Option<StoreError> {
    let pos = faults.iter().position(|f| f.op == op)?;
    let error = faults[pos].error.clone();
    let exhausted = match faults[pos].remaining.as_mut() {
        Some(remaining) => {
            *remaining = remaining.saturating_sub(1);
            *remaining == 0
        }
        None => false,
    };
    if exhausted {
        faults.remove(pos);
    }
    Some(error)
}

pub(crate) type HookFn = Box<dyn FnOnce(&mut Indices) + Send>;

/// A one-shot mutation applied right before the `at_call`-th call of `op`,
/// used to simulate another node acting concurrently.
pub(crate) struct Hook {
    pub op: StoreOp,
    pub at_call: usize,
    pub action: HookFn,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err() -> StoreError {
        StoreError::response(503, "unavailable", "busy")
    }

    #[test]
    fn bounded_fault_is_consumed() {
        let mut faults = vec![Fault {
            op: StoreOp::Refresh,
            error: err(),
            remaining: Some(2),
        }];
        assert!(take_fault(&mut faults, StoreOp::Refresh).is_some());
        assert!(take_fault(&mut faults, StoreOp::Refresh).is_some());
        assert!(take_fault(&mut faults, StoreOp::Refresh).is_none());
        assert!(faults.is_empty());
    }

    #[test]
    fn unbounded_fault_persists_and_ignores_other_ops() {
        let mut faults = vec![Fault {
            op: StoreOp::BulkIndex,
            error: err(),
            remaining: None,
        }];
        assert!(take_fault(&mut faults, StoreOp::Refresh).is_none());
        for _ in 0..10 {
            assert!(take_fault(&mut faults, StoreOp::BulkIndex).is_some());
        }
    }
}
