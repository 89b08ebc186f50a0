//! Remote container stores and plan execution for Relist.
//!
//! # Architecture
//!
//! Remote stores expose index-based, one-call-at-a-time primitives that do
//! not report how other entries shift. This crate executes a
//! [`relist_plan::Plan`] against such a store while keeping a local
//! [`ShadowList`] in lock-step with the remote order.
//!
//! ## Components
//!
//! - **Store**: the [`ContainerStore`] trait, with [`InMemoryStore`] for
//!   tests and offline use and [`YouTubeStore`] for YouTube playlists
//! - **Committer**: runs one plan, phase by phase, aborting on the first
//!   failed call
//! - **Reconciler**: fetch, plan, report, commit and verify in one call
//!
//! ## Failure model
//!
//! A failed remote call aborts the commit. Nothing is retried or rolled
//! back; the container is left between the old and the new order. Running
//! [`Reconciler::reconcile`] again from a fresh fetch completes the work.
//!
//! # Example
//!
//! ```
//! use relist_sync::{InMemoryStore, ReconcileConfig, Reconciler};
//! use relist_types::{ContainerId, TargetOrder};
//! use std::sync::Arc;
//!
//! # async fn demo() {
//! let playlist = ContainerId::from("PL1");
//! let store = Arc::new(InMemoryStore::new().with_container(playlist.clone(), ["a", "b", "c"]));
//! let reconciler = Reconciler::new(store, ReconcileConfig::default());
//!
//! let target: TargetOrder = ["c", "a", "d"].into_iter().collect();
//! let outcome = reconciler.reconcile(&playlist, &target).await.unwrap();
//! assert!(outcome.verified);
//! # }
//! ```

mod committer;
mod error;
mod memory;
mod reconcile;
mod shadow;
mod store;
pub mod youtube;

pub use committer::{CommitError, CommitPhase, CommitReport, CommitResult, Committer};
pub use error::{SyncError, SyncResult};
pub use memory::{InMemoryStore, StoreCall};
pub use reconcile::{ReconcileConfig, ReconcileError, ReconcileOutcome, ReconcileResult, Reconciler};
pub use shadow::ShadowList;
pub use store::{ContainerStore, ContainerSummary};
pub use youtube::{YouTubeConfig, YouTubeStore, MAX_PAGE_SIZE};
