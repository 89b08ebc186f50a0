//! In-memory container store.
//!
//! Behaves like a remote playlist service: slot ids are assigned on insert,
//! positions shift implicitly, nothing reports the resulting order. Used as
//! the test double and for offline dry runs.

use crate::error::{SyncError, SyncResult};
use crate::store::{ContainerStore, ContainerSummary};
use async_trait::async_trait;
use relist_types::{ContainerId, ContentId, Entry, Sequence, SlotId};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// A mutating call received by an [`InMemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Delete {
        slot: SlotId,
    },
    InsertAt {
        container: ContainerId,
        content: ContentId,
        position: usize,
    },
    UpdatePosition {
        slot: SlotId,
        container: ContainerId,
        content: ContentId,
        position: usize,
    },
}

#[derive(Debug, Default)]
struct MemoryState {
    containers: HashMap<ContainerId, Vec<Entry>>,
    titles: HashMap<ContentId, String>,
    calls: Vec<StoreCall>,
    /// Mutating calls left before injected failure. `None` never fails.
    fail_after: Option<usize>,
}

impl MemoryState {
    fn admit(&mut self, call: StoreCall) -> SyncResult<()> {
        if let Some(left) = self.fail_after.as_mut() {
            if *left == 0 {
                return Err(SyncError::Network(format!("injected failure on {call:?}")));
            }
            *left -= 1;
        }
        self.calls.push(call);
        Ok(())
    }

    fn container_mut(&mut self, container: &ContainerId) -> SyncResult<&mut Vec<Entry>> {
        self.containers
            .get_mut(container)
            .ok_or_else(|| SyncError::NotFound(format!("container {container}")))
    }
}

/// Container store that keeps everything in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a container holding `contents`, each with a fresh slot id.
    pub fn with_container<I, C>(self, container: ContainerId, contents: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ContentId>,
    {
        let mut state = self.state.into_inner();
        let entries = contents
            .into_iter()
            .map(|c| {
                let content = c.into();
                let title = state.titles.get(&content).cloned().unwrap_or_default();
                Entry {
                    slot_id: new_slot(),
                    content_id: content,
                    title,
                }
            })
            .collect();
        state.containers.insert(container, entries);
        Self {
            state: Mutex::new(state),
        }
    }

    /// Registers a display title used for entries of `content`.
    pub fn with_title(self, content: impl Into<ContentId>, title: impl Into<String>) -> Self {
        let mut state = self.state.into_inner();
        let content = content.into();
        let title = title.into();
        for entry in state.containers.values_mut().flatten() {
            if entry.content_id == content {
                entry.title = title.clone();
            }
        }
        state.titles.insert(content, title);
        Self {
            state: Mutex::new(state),
        }
    }

    /// Lets `calls` more mutating calls succeed, then fails every later one
    /// with a network error.
    pub async fn fail_after(&self, calls: usize) {
        self.state.lock().await.fail_after = Some(calls);
    }

    /// Stops injecting failures.
    pub async fn heal(&self) {
        self.state.lock().await.fail_after = None;
    }

    /// Mutating calls received so far, in order. Failed calls are not recorded.
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().await.calls.clone()
    }

    /// Forgets the recorded calls.
    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }

    /// Raw entries of a container, bypassing [`ContainerStore::list`].
    pub async fn entries(&self, container: &ContainerId) -> Option<Vec<Entry>> {
        self.state.lock().await.containers.get(container).cloned()
    }
}

fn new_slot() -> SlotId {
    SlotId::new(Uuid::now_v7().to_string())
}

#[async_trait]
impl ContainerStore for InMemoryStore {
    fn provider_name(&self) -> &'static str {
        "In-memory"
    }

    // Owners are not modelled: every container is listed, sorted by id.
    async fn containers(&self, _owner: Option<&str>) -> SyncResult<Vec<ContainerSummary>> {
        let state = self.state.lock().await;
        let mut summaries: Vec<ContainerSummary> = state
            .containers
            .iter()
            .map(|(id, entries)| ContainerSummary {
                container_id: id.clone(),
                title: String::new(),
                item_count: entries.len(),
            })
            .collect();
        summaries.sort_by(|a, b| a.container_id.cmp(&b.container_id));
        Ok(summaries)
    }

    async fn list(&self, container: &ContainerId) -> SyncResult<Sequence> {
        let state = self.state.lock().await;
        let entries = state
            .containers
            .get(container)
            .cloned()
            .ok_or_else(|| SyncError::NotFound(format!("container {container}")))?;
        Sequence::new(container.clone(), entries).map_err(|e| SyncError::Protocol(e.to_string()))
    }

    async fn delete(&self, slot: &SlotId) -> SyncResult<()> {
        let mut state = self.state.lock().await;
        let found = state.containers.iter().find_map(|(id, entries)| {
            entries
                .iter()
                .position(|e| &e.slot_id == slot)
                .map(|i| (id.clone(), i))
        });
        let (container, index) = found.ok_or_else(|| SyncError::NotFound(format!("slot {slot}")))?;

        state.admit(StoreCall::Delete { slot: slot.clone() })?;
        state.container_mut(&container)?.remove(index);
        debug!("Deleted slot {} from {}", slot, container);
        Ok(())
    }

    async fn insert_at(
        &self,
        container: &ContainerId,
        content: &ContentId,
        position: usize,
    ) -> SyncResult<Entry> {
        let mut state = self.state.lock().await;
        let len = state.container_mut(container)?.len();
        if position > len {
            return Err(SyncError::InvalidPosition { position, len });
        }

        state.admit(StoreCall::InsertAt {
            container: container.clone(),
            content: content.clone(),
            position,
        })?;
        let entry = Entry {
            slot_id: new_slot(),
            content_id: content.clone(),
            title: state.titles.get(content).cloned().unwrap_or_default(),
        };
        state.container_mut(container)?.insert(position, entry.clone());
        debug!("Inserted {} at {} in {} (slot {})", content, position, container, entry.slot_id);
        Ok(entry)
    }

    async fn update_position(
        &self,
        slot: &SlotId,
        container: &ContainerId,
        content: &ContentId,
        position: usize,
    ) -> SyncResult<()> {
        let mut state = self.state.lock().await;
        let entries = state.container_mut(container)?;
        let len = entries.len();
        let index = entries
            .iter()
            .position(|e| &e.slot_id == slot)
            .ok_or_else(|| SyncError::NotFound(format!("slot {slot} in {container}")))?;
        if entries[index].content_id != *content {
            return Err(SyncError::Api {
                status: 400,
                message: format!(
                    "slot {slot} holds {}, not {content}",
                    entries[index].content_id
                ),
            });
        }
        if position >= len {
            return Err(SyncError::InvalidPosition { position, len });
        }

        state.admit(StoreCall::UpdatePosition {
            slot: slot.clone(),
            container: container.clone(),
            content: content.clone(),
            position,
        })?;
        let entries = state.container_mut(container)?;
        let entry = entries.remove(index);
        entries.insert(position, entry);
        debug!("Moved slot {} to {} in {}", slot, position, container);
        Ok(())
    }
}
