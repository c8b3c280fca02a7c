// SPDX-License-Identifier: GPL-3.0-only

//! Still image frame source
//!
//! Serves one decoded image file as the live feed, for headless runs and
//! machines without a camera.

use super::FrameSource;
use super::types::{BackendResult, CameraFrame};
use crate::errors::CameraError;
use std::path::Path;
use tracing::info;

pub struct StillImageSource {
    name: String,
    frame: CameraFrame,
}

impl StillImageSource {
    /// Decode an image file into an RGBA frame
    pub fn open(path: &Path) -> BackendResult<Self> {
        info!(path = %path.display(), "Loading image file");

        let img = image::open(path).map_err(|e| {
            CameraError::InitializationFailed(format!(
                "Failed to load image '{}': {}",
                path.display(),
                e
            ))
        })?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        info!(width, height, "Image loaded successfully");

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::from_frame(
            name,
            CameraFrame::from_rgba(width, height, rgba.into_raw()),
        ))
    }

    pub fn from_frame(name: impl Into<String>, frame: CameraFrame) -> Self {
        Self {
            name: name.into(),
            frame,
        }
    }
}

impl FrameSource for StillImageSource {
    fn device_name(&self) -> &str {
        &self.name
    }

    fn latest_frame(&mut self) -> Option<CameraFrame> {
        Some(self.frame.clone())
    }
}
