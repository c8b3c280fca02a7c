// SPDX-License-Identifier: GPL-3.0-only

//! A captured frame with its user-editable metadata

use crate::pipelines::photo::EncodedImage;
use chrono::{DateTime, Local};
use std::fmt;
use uuid::Uuid;

/// Stable identity of a snapshot, independent of its list position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotId(Uuid);

impl SnapshotId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SnapshotId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough to tell snapshots apart in logs
        write!(f, "{}", &self.0.simple().to_string()[..8])
    }
}

/// One captured image
///
/// The image, id and timestamp are fixed at capture. Only `metadata` and
/// the `editing` flag change afterwards, and only through the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    id: SnapshotId,
    image: EncodedImage,
    metadata: String,
    timestamp: DateTime<Local>,
    editing: bool,
}

impl Snapshot {
    pub fn new(image: EncodedImage, metadata: impl Into<String>) -> Self {
        Self::captured_at(image, metadata, Local::now())
    }

    pub fn captured_at(
        image: EncodedImage,
        metadata: impl Into<String>,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            id: SnapshotId::new(),
            image,
            metadata: metadata.into(),
            timestamp,
            editing: false,
        }
    }

    pub fn id(&self) -> SnapshotId {
        self.id
    }

    pub fn image(&self) -> &EncodedImage {
        &self.image
    }

    pub fn metadata(&self) -> &str {
        &self.metadata
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub(super) fn set_metadata(&mut self, metadata: String) {
        self.metadata = metadata;
    }

    pub(super) fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }
}
