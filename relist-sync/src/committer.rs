//! Plan execution against a remote container store.
//!
//! The committer issues one remote call per operation, in plan order, and
//! mirrors each call on a [`ShadowList`]. Move positions in a plan refer to
//! the container as it stands after every earlier operation, and slot ids
//! for moves are resolved from the shadow, so the shadow must track the
//! remote order exactly.

use crate::error::SyncError;
use crate::shadow::ShadowList;
use crate::store::ContainerStore;
use relist_plan::{Plan, PlanError};
use relist_types::Sequence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Result type for commit operations.
pub type CommitResult<T> = Result<T, CommitError>;

/// Progress of a committer.
///
/// `Idle -> DeletesApplied -> InsertsApplied -> MovesApplied -> Done`;
/// any failed remote call moves to `Aborted`, which is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitPhase {
    Idle,
    DeletesApplied,
    InsertsApplied,
    MovesApplied,
    Done,
    Aborted,
}

/// Errors that can occur while committing a plan.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The committer already ran a plan.
    #[error("committer already used (phase {0:?})")]
    AlreadyUsed(CommitPhase),

    /// The plan was computed from a different snapshot.
    #[error("plan does not belong to this snapshot: {0}")]
    StaleSnapshot(#[source] PlanError),

    /// A remote call failed. Operations before it stay applied.
    #[error("{operation} failed after {completed} operation(s), last completed phase {phase:?}: {source}")]
    Remote {
        phase: CommitPhase,
        completed: usize,
        operation: String,
        #[source]
        source: SyncError,
    },

    /// The shadow list disagrees with the plan.
    #[error("shadow list out of step with plan: {0}")]
    ShadowMismatch(String),
}

/// Summary of a finished commit.
#[derive(Debug, Clone)]
pub struct CommitReport {
    pub deleted: usize,
    pub inserted: usize,
    pub moved: usize,
    /// The container order as the committer believes the store now holds it.
    pub shadow: Sequence,
}

/// Executes one plan against a store. Single use.
pub struct Committer {
    store: Arc<dyn ContainerStore>,
    phase: CommitPhase,
    completed: usize,
}

impl Committer {
    /// Creates an idle committer.
    pub fn new(store: Arc<dyn ContainerStore>) -> Self {
        Self {
            store,
            phase: CommitPhase::Idle,
            completed: 0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> CommitPhase {
        self.phase
    }

    /// Number of remote calls that succeeded so far.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Applies `plan` to the store. `current` must be the exact snapshot the
    /// plan was computed from.
    ///
    /// Deletes run first, then inserts, then moves. The first failed call
    /// aborts the commit; nothing is retried or rolled back.
    pub async fn commit(&mut self, plan: &Plan, current: &Sequence) -> CommitResult<CommitReport> {
        if self.phase != CommitPhase::Idle {
            return Err(CommitError::AlreadyUsed(self.phase));
        }
        plan.check_snapshot(current)
            .map_err(CommitError::StaleSnapshot)?;

        info!(
            "Committing plan to {} via {}: {} delete(s), {} insert(s), {} move(s)",
            plan.container_id(),
            self.store.provider_name(),
            plan.deletes().len(),
            plan.inserts().len(),
            plan.moves().len()
        );

        let mut shadow = ShadowList::new(current);
        match self.apply(plan, &mut shadow).await {
            Ok(()) => {
                self.phase = CommitPhase::Done;
                let shadow = shadow
                    .into_sequence()
                    .map_err(|e| CommitError::ShadowMismatch(e.to_string()))?;
                info!("Commit to {} done ({} call(s))", plan.container_id(), self.completed);
                Ok(CommitReport {
                    deleted: plan.deletes().len(),
                    inserted: plan.inserts().len(),
                    moved: plan.moves().len(),
                    shadow,
                })
            }
            Err(e) => {
                warn!("Commit to {} aborted: {}", plan.container_id(), e);
                self.phase = CommitPhase::Aborted;
                Err(e)
            }
        }
    }

    async fn apply(&mut self, plan: &Plan, shadow: &mut ShadowList) -> CommitResult<()> {
        let container = plan.container_id();

        for op in plan.deletes() {
            self.store
                .delete(&op.slot_id)
                .await
                .map_err(|e| self.remote(format!("delete slot {}", op.slot_id), e))?;
            shadow.remove_slot(&op.slot_id).ok_or_else(|| {
                CommitError::ShadowMismatch(format!("slot {} not in shadow", op.slot_id))
            })?;
            self.completed += 1;
            debug!("Deleted slot {}", op.slot_id);
        }
        self.phase = CommitPhase::DeletesApplied;

        for op in plan.inserts() {
            let entry = self
                .store
                .insert_at(container, &op.content_id, op.position)
                .await
                .map_err(|e| {
                    self.remote(format!("insert {} at {}", op.content_id, op.position), e)
                })?;
            debug!("Inserted {} at {} (slot {})", op.content_id, op.position, entry.slot_id);
            if !shadow.insert(op.position, entry) {
                return Err(CommitError::ShadowMismatch(format!(
                    "insert position {} beyond shadow length {}",
                    op.position,
                    shadow.len()
                )));
            }
            self.completed += 1;
        }
        self.phase = CommitPhase::InsertsApplied;

        for op in plan.moves() {
            // Relocate locally first: the moved entry's slot is read from its
            // new position.
            if !shadow.relocate(op.from, op.to) {
                return Err(CommitError::ShadowMismatch(format!(
                    "move {} -> {} outside shadow length {}",
                    op.from,
                    op.to,
                    shadow.len()
                )));
            }
            let slot = shadow
                .slot_at(op.to, &op.content_id)
                .cloned()
                .ok_or_else(|| {
                    CommitError::ShadowMismatch(format!(
                        "no {} at position {} after move",
                        op.content_id, op.to
                    ))
                })?;
            self.store
                .update_position(&slot, container, &op.content_id, op.to)
                .await
                .map_err(|e| {
                    self.remote(
                        format!("move {} (slot {}) {} -> {}", op.content_id, slot, op.from, op.to),
                        e,
                    )
                })?;
            self.completed += 1;
            debug!("Moved {} (slot {}) {} -> {}", op.content_id, slot, op.from, op.to);
        }
        self.phase = CommitPhase::MovesApplied;

        Ok(())
    }

    fn remote(&self, operation: String, source: SyncError) -> CommitError {
        CommitError::Remote {
            phase: self.phase,
            completed: self.completed,
            operation,
            source,
        }
    }
}
