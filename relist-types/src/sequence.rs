//! Ordered container state: fetched sequences and target orders.

use crate::{ContainerId, ContentId, Error, Result, SlotId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;

/// One physical entry in a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Store-assigned identity, unique within the container.
    pub slot_id: SlotId,
    /// The referenced content. May repeat within a container.
    pub content_id: ContentId,
    /// Display title. Diagnostic only, never used for matching.
    #[serde(default)]
    pub title: String,
}

impl Entry {
    /// Creates a new entry.
    pub fn new(
        slot_id: impl Into<SlotId>,
        content_id: impl Into<ContentId>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            slot_id: slot_id.into(),
            content_id: content_id.into(),
            title: title.into(),
        }
    }
}

/// Fingerprint of one fetched snapshot of a container.
///
/// Hex-encoded SHA-256 over the container id and the ordered
/// `(slot_id, content_id)` pairs. Titles do not participate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(String);

impl SnapshotId {
    /// Returns the fingerprint as a hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The current state of a container, as fetched from the store.
///
/// Every entry carries a slot id and slot ids are unique. Deserialization
/// goes through [`Sequence::new`] and enforces the same rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SequenceRepr")]
pub struct Sequence {
    container_id: ContainerId,
    entries: Vec<Entry>,
}

/// Wire form of a [`Sequence`], before the slot check.
#[derive(Deserialize)]
struct SequenceRepr {
    container_id: ContainerId,
    entries: Vec<Entry>,
}

impl TryFrom<SequenceRepr> for Sequence {
    type Error = Error;

    fn try_from(repr: SequenceRepr) -> Result<Self> {
        Self::new(repr.container_id, repr.entries)
    }
}

impl Sequence {
    /// Builds a sequence, rejecting duplicate slot ids.
    pub fn new(container_id: ContainerId, entries: Vec<Entry>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(&entry.slot_id) {
                return Err(Error::DuplicateSlot {
                    container: container_id,
                    slot: entry.slot_id.clone(),
                });
            }
        }
        Ok(Self {
            container_id,
            entries,
        })
    }

    /// An empty container.
    #[must_use]
    pub fn empty(container_id: ContainerId) -> Self {
        Self {
            container_id,
            entries: Vec::new(),
        }
    }

    /// Builds a sequence from bare content ids, assigning slot ids of the
    /// form `<container>/<index>`.
    ///
    /// Useful for offline planning where the store was never consulted.
    pub fn synthetic<I, C>(container_id: ContainerId, contents: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ContentId>,
    {
        let entries = contents
            .into_iter()
            .enumerate()
            .map(|(i, c)| Entry::new(format!("{container_id}/{i}"), c, ""))
            .collect();
        Self {
            container_id,
            entries,
        }
    }

    /// Returns the container this snapshot belongs to.
    pub fn container_id(&self) -> &ContainerId {
        &self.container_id
    }

    /// Returns the entries in container order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Consumes the sequence, returning its entries.
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the container is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Content ids in container order, duplicates included.
    pub fn content_ids(&self) -> Vec<ContentId> {
        self.entries.iter().map(|e| e.content_id.clone()).collect()
    }

    /// Index of the first entry at or after `start` referencing `content`.
    pub fn position_of(&self, content: &ContentId, start: usize) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, e)| &e.content_id == content)
            .map(|(i, _)| i)
    }

    /// Index of the entry with the given slot id.
    pub fn position_of_slot(&self, slot: &SlotId) -> Option<usize> {
        self.entries.iter().position(|e| &e.slot_id == slot)
    }

    /// Title of the first entry referencing `content`, if any.
    pub fn title_of(&self, content: &ContentId) -> Option<&str> {
        self.position_of(content, 0)
            .map(|i| self.entries[i].title.as_str())
    }

    /// Computes the snapshot fingerprint.
    pub fn fingerprint(&self) -> SnapshotId {
        let mut hasher = Sha256::new();
        hasher.update(self.container_id.as_str().as_bytes());
        for entry in &self.entries {
            // Unit separators keep ("ab","c") and ("a","bc") apart.
            hasher.update([0x1f_u8]);
            hasher.update(entry.slot_id.as_str().as_bytes());
            hasher.update([0x1e_u8]);
            hasher.update(entry.content_id.as_str().as_bytes());
        }
        SnapshotId(hex::encode(hasher.finalize()))
    }
}

/// The desired order of a container, as bare content ids.
///
/// Duplicates are legal and their relative order is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetOrder(Vec<ContentId>);

impl TargetOrder {
    /// Creates a target order.
    #[must_use]
    pub fn new(contents: Vec<ContentId>) -> Self {
        Self(contents)
    }

    /// Returns the content ids in order.
    pub fn as_slice(&self) -> &[ContentId] {
        &self.0
    }

    /// Iterates the content ids in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ContentId> {
        self.0.iter()
    }

    /// Number of entries the container should end up with.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the container should end up empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the target, returning the content ids.
    pub fn into_inner(self) -> Vec<ContentId> {
        self.0
    }
}

impl From<Vec<ContentId>> for TargetOrder {
    fn from(contents: Vec<ContentId>) -> Self {
        Self(contents)
    }
}

impl<C: Into<ContentId>> FromIterator<C> for TargetOrder {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a TargetOrder {
    type Item = &'a ContentId;
    type IntoIter = std::slice::Iter<'a, ContentId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
