// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use crate::errors::CameraError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Result type for camera backend operations
pub type BackendResult<T> = Result<T, CameraError>;

/// Frame channel from the pipeline callback to the UI loop
pub type FrameSender = futures::channel::mpsc::Sender<CameraFrame>;
pub type FrameReceiver = futures::channel::mpsc::Receiver<CameraFrame>;

/// Which way the camera faces
///
/// Matches libcamera's `api.libcamera.location` values where available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CameraFacing {
    /// Rear / environment-facing camera
    #[default]
    Back,
    /// Front / user-facing camera
    Front,
}

impl CameraFacing {
    /// Location string used by PipeWire/libcamera
    pub fn location(&self) -> &'static str {
        match self {
            CameraFacing::Back => "back",
            CameraFacing::Front => "front",
        }
    }

    /// Parse a location property value
    pub fn from_location(location: &str) -> Option<Self> {
        match location.trim().to_ascii_lowercase().as_str() {
            "back" | "rear" | "environment" => Some(CameraFacing::Back),
            "front" | "user" => Some(CameraFacing::Front),
            _ => None,
        }
    }
}

impl std::fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.location())
    }
}

/// Represents a camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub name: String,
    /// Source path: `pipewire-serial-N`, `/dev/videoN`, or empty for auto-select
    pub path: String,
    /// Camera location: "front", "back", or "external"
    pub location: Option<String>,
}

impl CameraDevice {
    /// Device that lets PipeWire pick the default camera
    pub fn auto() -> Self {
        Self {
            name: "Default Camera (PipeWire)".to_string(),
            path: String::new(),
            location: None,
        }
    }

    /// Facing derived from the location property, if known
    pub fn facing(&self) -> Option<CameraFacing> {
        self.location.as_deref().and_then(CameraFacing::from_location)
    }
}

/// Pixel format for camera frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// RGBA - 32-bit with alpha (4 bytes per pixel)
    RGBA,
    /// RGB24 - 24-bit RGB (3 bytes per pixel, no alpha)
    RGB24,
    /// Gray8 - 8-bit grayscale (single channel)
    Gray8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::RGBA => 4,
            PixelFormat::RGB24 => 3,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// A single frame from the live feed
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
    pub format: PixelFormat,
    /// Bytes per row, may exceed `width * bytes_per_pixel`
    pub stride: u32,
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Build a tightly packed RGBA frame
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data.into_boxed_slice()),
            format: PixelFormat::RGBA,
            stride: width * 4,
            captured_at: Instant::now(),
        }
    }

    pub fn data_slice(&self) -> &[u8] {
        &self.data
    }

    /// True when the buffer holds every row the dimensions promise
    pub fn is_complete(&self) -> bool {
        if self.width == 0 || self.height == 0 {
            return false;
        }
        let row_bytes = (self.width * self.format.bytes_per_pixel()) as usize;
        let needed = (self.stride as usize) * (self.height as usize - 1) + row_bytes;
        self.stride as usize >= row_bytes && self.data.len() >= needed
    }

    /// RGB value at a pixel, clamped to the frame bounds
    pub fn pixel_rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        let bpp = self.format.bytes_per_pixel();
        let idx = (y * self.stride + x * bpp) as usize;
        let data = self.data_slice();

        match self.format {
            PixelFormat::RGBA | PixelFormat::RGB24 => {
                if idx + 2 < data.len() {
                    (data[idx], data[idx + 1], data[idx + 2])
                } else {
                    (0, 0, 0)
                }
            }
            PixelFormat::Gray8 => match data.get(idx) {
                Some(&v) => (v, v, v),
                None => (0, 0, 0),
            },
        }
    }
}
