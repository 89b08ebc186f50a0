//! Fetch, plan, commit and verify in one call.

use crate::committer::{CommitError, CommitReport, Committer};
use crate::error::SyncError;
use crate::store::ContainerStore;
use relist_plan::{Plan, PlanError, Planner, TracingObserver};
use relist_types::{ContainerId, ContentId, Sequence, TargetOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Result type for reconciliation.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Errors that can occur during reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("store error: {0}")]
    Store(#[from] SyncError),

    #[error("planning failed: {0}")]
    Plan(#[from] PlanError),

    #[error("commit failed: {0}")]
    Commit(#[from] CommitError),

    /// The container does not hold the target order after a commit.
    #[error("verification failed: expected {expected:?}, found {actual:?}")]
    VerifyMismatch {
        expected: Vec<ContentId>,
        actual: Vec<ContentId>,
    },
}

impl ReconcileError {
    /// Returns true if planning hit an internal invariant violation.
    pub fn is_invariant_violation(&self) -> bool {
        match self {
            Self::Plan(e) => e.is_invariant_violation(),
            _ => false,
        }
    }
}

/// Reconciliation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Plan and simulate only; issue no mutating calls.
    pub dry_run: bool,
    /// Re-list the container after committing and compare with the target.
    pub verify: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            verify: true,
        }
    }
}

/// What a reconciliation did.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub plan: Plan,
    /// `None` for dry runs.
    pub committed: Option<CommitReport>,
    /// Simulated order for dry runs, otherwise the order the committer
    /// left behind (or the re-listed order when verifying).
    pub final_order: Vec<ContentId>,
    /// True if the container was re-listed and matched the target.
    pub verified: bool,
}

/// Brings a remote container into a target order.
pub struct Reconciler {
    store: Arc<dyn ContainerStore>,
    config: ReconcileConfig,
    planner: Planner,
}

impl Reconciler {
    /// Creates a reconciler whose planner logs every operation.
    pub fn new(store: Arc<dyn ContainerStore>, config: ReconcileConfig) -> Self {
        Self {
            store,
            config,
            planner: Planner::new().with_observer(TracingObserver),
        }
    }

    /// Replaces the planner, e.g. to attach a different observer.
    pub fn with_planner(mut self, planner: Planner) -> Self {
        self.planner = planner;
        self
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Lists the container.
    pub async fn fetch(&self, container: &ContainerId) -> ReconcileResult<Sequence> {
        Ok(self.store.list(container).await?)
    }

    /// Fetches the container and plans against it without mutating anything.
    pub async fn plan(
        &self,
        container: &ContainerId,
        target: &TargetOrder,
    ) -> ReconcileResult<(Sequence, Plan)> {
        let current = self.fetch(container).await?;
        let plan = self.planner.plan(target, &current)?;
        Ok((current, plan))
    }

    /// Fetches, plans, commits and (optionally) verifies.
    ///
    /// Failures are not retried. After an aborted commit the container holds
    /// a mix of old and new order; calling this again plans from that state.
    pub async fn reconcile(
        &self,
        container: &ContainerId,
        target: &TargetOrder,
    ) -> ReconcileResult<ReconcileOutcome> {
        let (current, plan) = self.plan(container, target).await?;
        info!("{}", plan);

        if self.config.dry_run {
            let final_order = plan.simulate(&current)?;
            info!("Dry run for {}: no changes made", container);
            return Ok(ReconcileOutcome {
                plan,
                committed: None,
                final_order,
                verified: false,
            });
        }

        let mut committer = Committer::new(Arc::clone(&self.store));
        let report = committer.commit(&plan, &current).await?;
        let mut final_order = report.shadow.content_ids();

        let verified = if self.config.verify {
            let actual = self.store.list(container).await?.content_ids();
            if actual.as_slice() != target.as_slice() {
                warn!("Container {} does not match target after commit", container);
                return Err(ReconcileError::VerifyMismatch {
                    expected: target.as_slice().to_vec(),
                    actual,
                });
            }
            final_order = actual;
            true
        } else {
            false
        };

        info!(
            "Reconciled {}: {} item(s), verified: {}",
            container,
            final_order.len(),
            verified
        );
        Ok(ReconcileOutcome {
            plan,
            committed: Some(report),
            final_order,
            verified,
        })
    }
}
