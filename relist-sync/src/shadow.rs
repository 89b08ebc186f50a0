//! Local mirror of a remote container's order during a commit.

use relist_types::{ContainerId, ContentId, Entry, Sequence, SlotId};

/// Entries in the order the remote container holds them, updated after
/// every issued call so later positions and slot lookups stay correct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowList {
    container_id: ContainerId,
    entries: Vec<Entry>,
}

impl ShadowList {
    /// Seeds the shadow from the snapshot a plan was computed from.
    pub fn new(current: &Sequence) -> Self {
        Self {
            container_id: current.container_id().clone(),
            entries: current.entries().to_vec(),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes the entry with `slot`, returning it.
    pub fn remove_slot(&mut self, slot: &SlotId) -> Option<Entry> {
        let index = self.entries.iter().position(|e| &e.slot_id == slot)?;
        Some(self.entries.remove(index))
    }

    /// Inserts `entry` before `position`.
    pub fn insert(&mut self, position: usize, entry: Entry) -> bool {
        if position > self.entries.len() {
            return false;
        }
        self.entries.insert(position, entry);
        true
    }

    /// Moves the entry at `from` to `to`.
    pub fn relocate(&mut self, from: usize, to: usize) -> bool {
        let len = self.entries.len();
        if from >= len || to >= len {
            return false;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        true
    }

    /// Slot id of the entry at `position`, provided it references `content`.
    ///
    /// Call after [`relocate`](Self::relocate): the moved entry sits at its
    /// new position, which is the slot the remote call has to reposition.
    pub fn slot_at(&self, position: usize, content: &ContentId) -> Option<&SlotId> {
        self.entries
            .get(position)
            .filter(|e| &e.content_id == content)
            .map(|e| &e.slot_id)
    }

    /// Content ids in shadow order.
    pub fn content_ids(&self) -> Vec<ContentId> {
        self.entries.iter().map(|e| e.content_id.clone()).collect()
    }

    /// Converts the shadow back into a sequence.
    pub fn into_sequence(self) -> relist_types::Result<Sequence> {
        Sequence::new(self.container_id, self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shadow(ids: &[&str]) -> ShadowList {
        ShadowList::new(&Sequence::synthetic(
            ContainerId::from("PL"),
            ids.iter().copied(),
        ))
    }

    #[test]
    fn slot_at_resolves_the_relocated_duplicate() {
        // [a0, b1, a2]: moving index 2 to 1 must resolve slot PL/2, not PL/0.
        let mut s = shadow(&["a", "b", "a"]);
        assert!(s.relocate(2, 1));
        let a = ContentId::from("a");
        assert_eq!(s.slot_at(1, &a), Some(&SlotId::from("PL/2")));
        assert_eq!(s.slot_at(2, &a), None);
    }

    #[test]
    fn remove_and_insert() {
        let mut s = shadow(&["a", "b"]);
        let removed = s.remove_slot(&SlotId::from("PL/0")).unwrap();
        assert_eq!(removed.content_id, ContentId::from("a"));
        assert!(s.remove_slot(&SlotId::from("PL/0")).is_none());
        assert!(s.insert(0, Entry::new("new", "c", "")));
        assert!(!s.insert(5, Entry::new("bad", "d", "")));
        assert_eq!(s.content_ids(), vec![ContentId::from("c"), ContentId::from("b")]);
    }

    #[test]
    fn into_sequence_keeps_container() {
        let s = shadow(&["a"]);
        let seq = s.into_sequence().unwrap();
        assert_eq!(seq.container_id(), &ContainerId::from("PL"));
        assert_eq!(seq.len(), 1);
    }
}
