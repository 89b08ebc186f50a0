//! Diagnostic hooks invoked while a plan is built.

use crate::alignment::Alignment;
use crate::plan::{Delete, Insert, Move};
use relist_types::{ContentId, Entry};
use tracing::debug;

/// Receives each operation as the planner emits it.
///
/// All methods default to no-ops. Titles are looked up from the current
/// snapshot and are `None` for content the container does not hold yet.
pub trait PlanObserver: Send + Sync {
    fn on_alignment(&self, _alignment: &Alignment<ContentId>) {}

    fn on_delete(&self, _op: &Delete, _entry: &Entry) {}

    fn on_insert(&self, _op: &Insert, _title: Option<&str>) {}

    fn on_move(&self, _op: &Move, _title: Option<&str>) {}
}

/// Logs every operation, with titles, at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PlanObserver for TracingObserver {
    fn on_alignment(&self, alignment: &Alignment<ContentId>) {
        debug!(
            "Aligned {} matched, {} to add, {} to delete",
            alignment.matched_in_target.len(),
            alignment.only_in_target.len(),
            alignment.only_in_current.len()
        );
    }

    fn on_delete(&self, op: &Delete, entry: &Entry) {
        debug!("delete {} ({}) slot {}", entry.content_id, entry.title, op.slot_id);
    }

    fn on_insert(&self, op: &Insert, title: Option<&str>) {
        debug!(
            "insert {} ({}) at {}",
            op.content_id,
            title.unwrap_or("untitled"),
            op.position
        );
    }

    fn on_move(&self, op: &Move, title: Option<&str>) {
        debug!(
            "move {} ({}) {} -> {}",
            op.content_id,
            title.unwrap_or("untitled"),
            op.from,
            op.to
        );
    }
}
