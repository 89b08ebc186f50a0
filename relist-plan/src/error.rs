//! Error types for planning.

use relist_types::{ContainerId, ContentId, SlotId, SnapshotId};
use thiserror::Error;

/// Result type for planning operations.
pub type PlanResult<T> = Result<T, PlanError>;

/// A broken planner invariant.
///
/// These signal a defect in the planner or an input shape it does not
/// support. They are fatal: callers must not retry or paper over them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// The two greedy alignment passes matched a different number of elements.
    #[error("alignment mismatch: {in_target} matched in target, {in_current} in current")]
    AlignmentMismatch { in_target: usize, in_current: usize },

    /// A value scheduled for deletion was not found.
    #[error("content {content} scheduled for deletion is not present")]
    DeleteTargetMissing { content: ContentId },

    /// After deletes the working copy is not the matched multiset.
    #[error("working copy after deletes {actual:?} does not match {expected:?}")]
    PostDeleteMismatch {
        expected: Vec<ContentId>,
        actual: Vec<ContentId>,
    },

    /// After inserts the working copy length differs from the target length.
    #[error("working copy has {actual} entries after inserts, target has {expected}")]
    PostInsertLengthMismatch { expected: usize, actual: usize },

    /// The element for a target position could not be found.
    #[error("content {content} for position {position} not found in working copy")]
    MoveSourceMissing { content: ContentId, position: usize },

    /// After moves the working copy does not equal the target.
    #[error("working copy after moves {actual:?} does not equal target {expected:?}")]
    FinalOrderMismatch {
        expected: Vec<ContentId>,
        actual: Vec<ContentId>,
    },
}

/// Errors produced while planning or simulating a plan.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A planner invariant failed.
    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    /// The plan was replayed against a different container.
    #[error("plan belongs to container {expected}, not {actual}")]
    ContainerMismatch {
        expected: ContainerId,
        actual: ContainerId,
    },

    /// The plan was replayed against a different snapshot.
    #[error("plan was computed from snapshot {expected}, got {actual}")]
    SnapshotMismatch {
        expected: SnapshotId,
        actual: SnapshotId,
    },

    /// A delete referenced a slot that does not exist.
    #[error("unknown slot: {0}")]
    UnknownSlot(SlotId),

    /// An insert or move referenced a position out of range.
    #[error("position {position} out of range for length {len}")]
    InvalidPosition { position: usize, len: usize },
}

impl PlanError {
    /// Returns true if this error is a planner invariant violation.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }
}
