// SPDX-License-Identifier: GPL-3.0-only

//! Snapshot collection
//!
//! An ordered list of snapshots behind a shared pointer. Every mutation
//! returns a new collection value and leaves the receiver untouched, so a
//! holder of the old value can detect change with [`SnapshotCollection::same_as`].
//! A mutation with an out-of-range index returns the original value.

use super::snapshot::{Snapshot, SnapshotId};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct SnapshotCollection {
    items: Arc<Vec<Snapshot>>,
}

impl SnapshotCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.items.iter()
    }

    /// Current index of a snapshot
    pub fn position(&self, id: SnapshotId) -> Option<usize> {
        self.items.iter().position(|s| s.id() == id)
    }

    pub fn find(&self, id: SnapshotId) -> Option<&Snapshot> {
        self.items.iter().find(|s| s.id() == id)
    }

    /// True when both values are the same collection instance
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }

    /// Add a snapshot at the end
    pub fn append(&self, snapshot: Snapshot) -> Self {
        let mut items = Vec::with_capacity(self.items.len() + 1);
        items.extend(self.items.iter().cloned());
        items.push(snapshot);
        Self::from_vec(items)
    }

    /// Remove the snapshot at `index`, shifting later ones down
    pub fn delete(&self, index: usize) -> Self {
        if index >= self.items.len() {
            debug!(index, len = self.items.len(), "Delete out of range ignored");
            return self.clone();
        }
        let mut items = self.items.as_ref().clone();
        items.remove(index);
        Self::from_vec(items)
    }

    /// Flip the editing flag of the snapshot at `index`
    pub fn toggle_edit(&self, index: usize) -> Self {
        self.modify(index, Snapshot::toggle_editing)
    }

    /// Replace the metadata text of the snapshot at `index`
    pub fn update_metadata(&self, index: usize, metadata: impl Into<String>) -> Self {
        let metadata = metadata.into();
        self.modify(index, move |snapshot| snapshot.set_metadata(metadata))
    }

    fn modify(&self, index: usize, f: impl FnOnce(&mut Snapshot)) -> Self {
        if index >= self.items.len() {
            debug!(index, len = self.items.len(), "Update out of range ignored");
            return self.clone();
        }
        let mut items = self.items.as_ref().clone();
        f(&mut items[index]);
        Self::from_vec(items)
    }

    fn from_vec(items: Vec<Snapshot>) -> Self {
        Self {
            items: Arc::new(items),
        }
    }
}

impl<'a> IntoIterator for &'a SnapshotCollection {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
