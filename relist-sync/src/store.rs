//! Container store abstraction trait.
//!
//! Defines the primitives a remote ordered container must offer.

use crate::error::SyncResult;
use async_trait::async_trait;
use relist_types::{ContainerId, ContentId, Entry, Sequence, SlotId};
use serde::{Deserialize, Serialize};

/// One container as shown in a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub container_id: ContainerId,
    pub title: String,
    pub item_count: usize,
}

/// Abstract remote container store.
///
/// Every mutating call acts on one entry and shifts the others implicitly;
/// the store never reports the resulting positions.
#[async_trait]
pub trait ContainerStore: Send + Sync {
    /// Returns the name of the store provider.
    fn provider_name(&self) -> &'static str;

    /// Lists the containers owned by `owner`, or by the authenticated
    /// account when `owner` is `None`.
    async fn containers(&self, owner: Option<&str>) -> SyncResult<Vec<ContainerSummary>>;

    /// Fetches the full, ordered contents of a container.
    async fn list(&self, container: &ContainerId) -> SyncResult<Sequence>;

    /// Deletes one entry by slot id.
    async fn delete(&self, slot: &SlotId) -> SyncResult<()>;

    /// Inserts `content` at `position` and returns the new entry with its
    /// freshly assigned slot id.
    async fn insert_at(
        &self,
        container: &ContainerId,
        content: &ContentId,
        position: usize,
    ) -> SyncResult<Entry>;

    /// Moves the entry `slot` so that it ends up at `position`.
    async fn update_position(
        &self,
        slot: &SlotId,
        container: &ContainerId,
        content: &ContentId,
        position: usize,
    ) -> SyncResult<()>;
}
