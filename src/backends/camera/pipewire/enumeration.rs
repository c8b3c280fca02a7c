// SPDX-License-Identifier: GPL-3.0-only

//! PipeWire camera enumeration
//!
//! Cameras are discovered through `pw-cli ls Node`. When nothing can be
//! discovered the caller falls back to PipeWire's own default camera.

use super::super::types::{BackendResult, CameraDevice, CameraFacing};
use crate::errors::CameraError;
use tracing::{debug, info, warn};

/// Enumerate cameras using PipeWire
///
/// Returns an empty list when PipeWire is reachable but lists no video
/// sources; errors only when GStreamer itself cannot start.
pub fn enumerate_cameras() -> BackendResult<Vec<CameraDevice>> {
    debug!("Attempting to enumerate cameras via PipeWire");

    gstreamer::init().map_err(|e| CameraError::InitializationFailed(e.to_string()))?;

    if gstreamer::ElementFactory::find("pipewiresrc").is_none() {
        warn!("pipewiresrc not available");
        return Ok(Vec::new());
    }

    let output = match std::process::Command::new("pw-cli")
        .args(["ls", "Node"])
        .output()
    {
        Ok(output) if output.status.success() => output,
        Ok(_) | Err(_) => {
            info!("pw-cli unavailable, using PipeWire auto-selection");
            return Ok(Vec::new());
        }
    };

    let cameras = parse_pw_cli_nodes(&String::from_utf8_lossy(&output.stdout));
    debug!(count = cameras.len(), "Enumerated cameras via pw-cli");
    Ok(cameras)
}

/// Pick the camera to open
///
/// An exact path match wins, then the first camera facing the requested
/// way, then the first camera listed.
pub fn select_camera<'a>(
    cameras: &'a [CameraDevice],
    facing: CameraFacing,
    preferred_path: Option<&str>,
) -> Option<&'a CameraDevice> {
    if let Some(path) = preferred_path
        && let Some(camera) = cameras.iter().find(|c| c.path == path)
    {
        return Some(camera);
    }

    cameras
        .iter()
        .find(|c| c.facing() == Some(facing))
        .or_else(|| cameras.first())
}

#[derive(Default)]
struct NodeBuilder {
    id: Option<String>,
    serial: Option<String>,
    name: Option<String>,
    location: Option<String>,
    is_video_source: bool,
}

impl NodeBuilder {
    fn finish(self) -> Option<CameraDevice> {
        if !self.is_video_source {
            return None;
        }
        let name = self.name?;
        let path = match (self.serial, self.id) {
            (Some(serial), _) => format!("pipewire-serial-{}", serial),
            (None, Some(id)) => format!("pipewire-{}", id),
            (None, None) => return None,
        };
        debug!(name = %name, path = %path, location = ?self.location, "Found video camera");
        Some(CameraDevice {
            name,
            path,
            location: self.location,
        })
    }
}

/// Parse `pw-cli ls Node` output into video source devices
pub fn parse_pw_cli_nodes(stdout: &str) -> Vec<CameraDevice> {
    let mut cameras = Vec::new();
    let mut current: Option<NodeBuilder> = None;

    for line in stdout.lines() {
        let trimmed = line.trim();

        // Format: "id 76, type PipeWire:Interface:Node/3"
        if let Some(rest) = trimmed.strip_prefix("id ")
            && trimmed.contains("type PipeWire:Interface:Node")
        {
            if let Some(node) = current.take().and_then(NodeBuilder::finish) {
                cameras.push(node);
            }
            let id = rest.split(',').next().map(|s| s.trim().to_string());
            current = Some(NodeBuilder {
                id,
                ..NodeBuilder::default()
            });
            continue;
        }

        let Some(node) = current.as_mut() else {
            continue;
        };

        if trimmed.contains("media.class") && trimmed.contains("\"Video/Source\"") {
            node.is_video_source = true;
        } else if trimmed.contains("object.serial") {
            node.serial = extract_quoted_value(trimmed);
        } else if trimmed.contains("node.description") {
            node.name = extract_quoted_value(trimmed);
        } else if trimmed.contains("api.libcamera.location") {
            node.location = extract_quoted_value(trimmed);
        }
    }

    if let Some(node) = current.and_then(NodeBuilder::finish) {
        cameras.push(node);
    }

    cameras
}

/// Extract quoted value from a property line (e.g., 'property = "value"' -> "value")
fn extract_quoted_value(line: &str) -> Option<String> {
    let start = line.find('"')?;
    let end = line[start + 1..].find('"')?;
    Some(line[start + 1..start + 1 + end].to_string())
}
