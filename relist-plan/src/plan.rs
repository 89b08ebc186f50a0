//! Plan records: the delete/insert/move operations for one snapshot.

use crate::error::{PlanError, PlanResult};
use relist_types::{ContainerId, ContentId, Entry, Sequence, SlotId, SnapshotId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Remove one physical entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delete {
    pub slot_id: SlotId,
}

/// Insert `content_id` so that it ends up at `position`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insert {
    pub content_id: ContentId,
    pub position: usize,
}

/// Move the entry at `from` to `to`.
///
/// Positions refer to the container as it stands after every earlier
/// operation of the plan has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: usize,
    pub to: usize,
    pub content_id: ContentId,
}

/// The operations that reconcile one snapshot into a target order.
///
/// Operations must run as all deletes, then all inserts, then all moves.
/// A plan is bound to the snapshot it was computed from and is never
/// mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    container_id: ContainerId,
    snapshot: SnapshotId,
    deletes: Vec<Delete>,
    inserts: Vec<Insert>,
    moves: Vec<Move>,
}

impl Plan {
    pub(crate) fn new(
        current: &Sequence,
        deletes: Vec<Delete>,
        inserts: Vec<Insert>,
        moves: Vec<Move>,
    ) -> Self {
        Self {
            container_id: current.container_id().clone(),
            snapshot: current.fingerprint(),
            deletes,
            inserts,
            moves,
        }
    }

    /// The container the plan targets.
    pub fn container_id(&self) -> &ContainerId {
        &self.container_id
    }

    /// Fingerprint of the snapshot the plan was computed from.
    pub fn snapshot(&self) -> &SnapshotId {
        &self.snapshot
    }

    pub fn deletes(&self) -> &[Delete] {
        &self.deletes
    }

    pub fn inserts(&self) -> &[Insert] {
        &self.inserts
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Total number of operations.
    pub fn len(&self) -> usize {
        self.deletes.len() + self.inserts.len() + self.moves.len()
    }

    /// Returns true if the container already has the target order.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks that `current` is the snapshot this plan was computed from.
    pub fn check_snapshot(&self, current: &Sequence) -> PlanResult<()> {
        if current.container_id() != &self.container_id {
            return Err(PlanError::ContainerMismatch {
                expected: self.container_id.clone(),
                actual: current.container_id().clone(),
            });
        }
        let actual = current.fingerprint();
        if actual != self.snapshot {
            return Err(PlanError::SnapshotMismatch {
                expected: self.snapshot.clone(),
                actual,
            });
        }
        Ok(())
    }

    /// Replays the plan on a copy of `current` and returns the resulting
    /// content order.
    ///
    /// Inserted entries get placeholder slot ids; only the order matters.
    pub fn simulate(&self, current: &Sequence) -> PlanResult<Vec<ContentId>> {
        self.check_snapshot(current)?;
        let mut entries: Vec<Entry> = current.entries().to_vec();

        for op in &self.deletes {
            let index = entries
                .iter()
                .position(|e| e.slot_id == op.slot_id)
                .ok_or_else(|| PlanError::UnknownSlot(op.slot_id.clone()))?;
            entries.remove(index);
        }

        for (n, op) in self.inserts.iter().enumerate() {
            if op.position > entries.len() {
                return Err(PlanError::InvalidPosition {
                    position: op.position,
                    len: entries.len(),
                });
            }
            let entry = Entry::new(format!("simulated/{n}"), op.content_id.clone(), "");
            entries.insert(op.position, entry);
        }

        for op in &self.moves {
            let len = entries.len();
            for position in [op.from, op.to] {
                if position >= len {
                    return Err(PlanError::InvalidPosition { position, len });
                }
            }
            let entry = entries.remove(op.from);
            entries.insert(op.to, entry);
        }

        Ok(entries.into_iter().map(|e| e.content_id).collect())
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "plan for {}: {} delete(s), {} insert(s), {} move(s)",
            self.container_id,
            self.deletes.len(),
            self.inserts.len(),
            self.moves.len()
        )?;
        for op in &self.deletes {
            writeln!(f, "  delete slot {}", op.slot_id)?;
        }
        for op in &self.inserts {
            writeln!(f, "  insert {} at {}", op.content_id, op.position)?;
        }
        for op in &self.moves {
            writeln!(f, "  move {} {} -> {}", op.content_id, op.from, op.to)?;
        }
        Ok(())
    }
}
