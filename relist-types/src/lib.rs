//! Core type definitions for Relist.
//!
//! This crate defines the types shared by the planner and the sync layer:
//! - Identifier newtypes for containers, store slots and content
//! - [`Entry`] and [`Sequence`], the fetched state of a container
//! - [`TargetOrder`], the desired order expressed as bare content ids
//! - [`SnapshotId`], the fingerprint that binds a plan to one snapshot
//!
//! Nothing here talks to a remote store.

mod ids;
mod sequence;

pub use ids::{ContainerId, ContentId, SlotId};
pub use sequence::{Entry, Sequence, SnapshotId, TargetOrder};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building sequences.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("duplicate slot id {slot} in container {container}")]
    DuplicateSlot { container: ContainerId, slot: SlotId },
}
