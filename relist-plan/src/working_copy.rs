//! In-memory scratch sequence used to validate a plan while building it.

use relist_types::ContentId;

/// A mutable ordered list of content ids.
///
/// Index edits return `None`/`false` instead of panicking when out of
/// range, so the planner can report them as invariant violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingCopy {
    items: Vec<ContentId>,
}

impl WorkingCopy {
    /// Seeds a working copy.
    pub fn new(items: Vec<ContentId>) -> Self {
        Self { items }
    }

    /// The current contents.
    pub fn as_slice(&self) -> &[ContentId] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the working copy is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the first occurrence of `value` at or after `start`.
    pub fn find_from(&self, value: &ContentId, start: usize) -> Option<usize> {
        self.items
            .iter()
            .skip(start)
            .position(|v| v == value)
            .map(|i| i + start)
    }

    /// Inserts `value` before `index`. `index == len` appends.
    pub fn insert(&mut self, index: usize, value: ContentId) -> bool {
        if index > self.items.len() {
            return false;
        }
        self.items.insert(index, value);
        true
    }

    /// Removes the item at `index`.
    pub fn remove(&mut self, index: usize) -> Option<ContentId> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Moves the item at `from` so that it ends up at `to`.
    pub fn relocate(&mut self, from: usize, to: usize) -> bool {
        let len = self.items.len();
        if from >= len || to >= len {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        true
    }

    /// Consumes the working copy.
    pub fn into_inner(self) -> Vec<ContentId> {
        self.items
    }
}
