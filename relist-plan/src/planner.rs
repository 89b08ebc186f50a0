//! The operation planner.
//!
//! Planning runs in three phases over a [`WorkingCopy`] seeded with the
//! current content ids:
//!
//! 1. **Delete** every unmatched current element (first remaining copy of
//!    each value), recording the true slot id of the original entry.
//! 2. **Insert** every unmatched target element at position 0, in reverse,
//!    so the additions land at the front in target order. Real positioning
//!    is left to the move phase.
//! 3. **Move** elements into place left to right. After position `i` is
//!    settled the prefix `0..=i` equals the target prefix and is never
//!    touched again.
//!
//! The working copy is checked after every phase. Any mismatch is an
//! [`InvariantViolation`] and aborts planning.

use crate::alignment::align;
use crate::error::{InvariantViolation, PlanResult};
use crate::observer::PlanObserver;
use crate::plan::{Delete, Insert, Move, Plan};
use crate::working_copy::WorkingCopy;
use relist_types::{ContentId, Sequence, TargetOrder};
use std::collections::HashMap;
use std::hash::Hash;
use tracing::{debug, error, info};

/// Computes plans. Stateless apart from the optional observer.
#[derive(Default)]
pub struct Planner {
    observer: Option<Box<dyn PlanObserver>>,
}

impl Planner {
    /// Creates a planner without an observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an observer that is told about every emitted operation.
    pub fn with_observer(mut self, observer: impl PlanObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Computes the plan that turns `current` into `target`.
    ///
    /// The returned plan is only valid for this exact snapshot of `current`.
    pub fn plan(&self, target: &TargetOrder, current: &Sequence) -> PlanResult<Plan> {
        let target = target.as_slice();
        let source = current.content_ids();

        let alignment = align(target, source.as_slice());
        if !alignment.is_balanced() {
            return Err(fatal(InvariantViolation::AlignmentMismatch {
                in_target: alignment.matched_in_target.len(),
                in_current: alignment.matched_in_current.len(),
            }));
        }
        debug!(
            "Aligning {} -> {}: add {:?}, delete {:?}",
            current.container_id(),
            target.len(),
            alignment.only_in_target,
            alignment.only_in_current
        );
        if let Some(observer) = &self.observer {
            observer.on_alignment(&alignment);
        }

        let mut working = WorkingCopy::new(source);

        let deletes = self.delete_phase(&alignment.only_in_current, current, &mut working)?;
        if working.len() != alignment.matched_in_current.len()
            || !same_multiset(working.as_slice(), &alignment.matched_in_current)
        {
            return Err(fatal(InvariantViolation::PostDeleteMismatch {
                expected: alignment.matched_in_current.clone(),
                actual: working.into_inner(),
            }));
        }

        let inserts = self.insert_phase(&alignment.only_in_target, current, &mut working);
        if working.len() != target.len() {
            return Err(fatal(InvariantViolation::PostInsertLengthMismatch {
                expected: target.len(),
                actual: working.len(),
            }));
        }

        let moves = self.move_phase(target, current, &mut working)?;
        if working.as_slice() != target {
            return Err(fatal(InvariantViolation::FinalOrderMismatch {
                expected: target.to_vec(),
                actual: working.into_inner(),
            }));
        }

        let plan = Plan::new(current, deletes, inserts, moves);
        info!(
            "Planned {}: {} delete(s), {} insert(s), {} move(s)",
            current.container_id(),
            plan.deletes().len(),
            plan.inserts().len(),
            plan.moves().len()
        );
        Ok(plan)
    }

    fn delete_phase(
        &self,
        to_delete: &[ContentId],
        current: &Sequence,
        working: &mut WorkingCopy,
    ) -> PlanResult<Vec<Delete>> {
        let mut deletes = Vec::with_capacity(to_delete.len());
        // Per value, the first original index not yet consumed by a delete.
        let mut consumed: HashMap<&ContentId, usize> = HashMap::new();

        for value in to_delete {
            let missing = || {
                fatal(InvariantViolation::DeleteTargetMissing {
                    content: value.clone(),
                })
            };
            let index = working.find_from(value, 0).ok_or_else(missing)?;
            let cursor = consumed.entry(value).or_insert(0);
            let original = current.position_of(value, *cursor).ok_or_else(missing)?;
            *cursor = original + 1;
            working.remove(index).ok_or_else(missing)?;

            let entry = &current.entries()[original];
            let op = Delete {
                slot_id: entry.slot_id.clone(),
            };
            if let Some(observer) = &self.observer {
                observer.on_delete(&op, entry);
            }
            deletes.push(op);
        }
        Ok(deletes)
    }

    fn insert_phase(
        &self,
        to_add: &[ContentId],
        current: &Sequence,
        working: &mut WorkingCopy,
    ) -> Vec<Insert> {
        let mut inserts = Vec::with_capacity(to_add.len());
        for value in to_add.iter().rev() {
            working.insert(0, value.clone());
            let op = Insert {
                content_id: value.clone(),
                position: 0,
            };
            if let Some(observer) = &self.observer {
                observer.on_insert(&op, current.title_of(value));
            }
            inserts.push(op);
        }
        inserts
    }

    fn move_phase(
        &self,
        target: &[ContentId],
        current: &Sequence,
        working: &mut WorkingCopy,
    ) -> PlanResult<Vec<Move>> {
        let mut moves = Vec::new();
        // Per value, one past the last target position it was settled at.
        let mut cursors: HashMap<&ContentId, usize> = HashMap::new();

        for (i, value) in target.iter().enumerate() {
            let start = cursors.get(value).copied().unwrap_or(0);
            let missing = || {
                fatal(InvariantViolation::MoveSourceMissing {
                    content: value.clone(),
                    position: i,
                })
            };
            let j = working.find_from(value, start).ok_or_else(missing)?;
            if j != i {
                if !working.relocate(j, i) {
                    return Err(missing());
                }
                let op = Move {
                    from: j,
                    to: i,
                    content_id: value.clone(),
                };
                if let Some(observer) = &self.observer {
                    observer.on_move(&op, current.title_of(value));
                }
                moves.push(op);
            }
            cursors.insert(value, i + 1);
        }
        Ok(moves)
    }
}

/// Logs an invariant violation loudly before it is returned.
fn fatal(violation: InvariantViolation) -> crate::PlanError {
    error!("Planner invariant violated: {violation}");
    violation.into()
}

fn same_multiset<T: Eq + Hash>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut counts: HashMap<&T, isize> = HashMap::new();
    for x in a {
        *counts.entry(x).or_insert(0) += 1;
    }
    for x in b {
        *counts.entry(x).or_insert(0) -= 1;
    }
    counts.values().all(|&n| n == 0)
}
