// SPDX-License-Identifier: GPL-3.0-only

//! Capture screen state and dispatcher
//!
//! Every user action, timer tick and background result reaches the screen as
//! a [`Message`]. [`CaptureScreen::update`] applies it and returns the
//! [`Effect`]s the driver has to carry out (ticker control, uploads, saving
//! to the photo library). Nothing in here blocks or spawns.

use super::snapshot::{Snapshot, SnapshotId};
use super::store::SnapshotCollection;
use super::timer::{CaptureTimer, TickOutcome, TimerTransition};
use crate::backends::camera::{CameraFrame, CameraSession};
use crate::constants::CaptureInterval;
use crate::errors::{CameraError, PhotoError, UploadError};
use crate::pipelines::photo::{EncodedImage, encode_frame};
use crate::upload::{CountResponse, count_message};
use chrono::{DateTime, Local};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Shown when the camera refuses access
pub const PERMISSION_DENIED_TEXT: &str =
    "Please allow camera access in your system settings and start the camera again.";

/// Capture behaviour of the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureMode {
    /// Automatic capture every interval with a visible countdown
    #[default]
    Timed,
    /// A capturing toggle plus one shot per request
    Manual,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    StartCamera,
    StopCamera,
    /// Start/stop the timer (timed) or the capturing mode (manual)
    ToggleCapture,
    CycleInterval,
    SetInterval(CaptureInterval),
    /// One second elapsed on the ticker of this generation
    Tick(u64),
    /// Take one picture now (manual mode, while capturing)
    Shoot,
    SetDraftMetadata(String),
    Delete(usize),
    ToggleEdit(usize),
    UpdateMetadata(usize, String),
    /// Submit the snapshot at this index for counting
    CountFlowers(usize),
    CountFinished {
        id: SnapshotId,
        result: Result<CountResponse, UploadError>,
    },
    Persisted {
        id: SnapshotId,
        result: Result<PathBuf, PhotoError>,
    },
}

/// Work the driver performs on behalf of the screen
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Start a ticker whose ticks carry this generation
    StartTicker(u64),
    StopTicker,
    Upload {
        id: SnapshotId,
        image: EncodedImage,
    },
    Persist {
        id: SnapshotId,
        image: EncodedImage,
        timestamp: DateTime<Local>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// Line shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

pub struct CaptureScreen {
    mode: CaptureMode,
    camera: CameraSession,
    timer: CaptureTimer,
    snapshots: SnapshotCollection,
    draft_metadata: String,
    /// Manual mode capturing toggle
    capturing: bool,
    persist_captures: bool,
    status: Option<StatusMessage>,
    /// Generation of the current ticker; ticks from older ones are stale
    tick_generation: u64,
    /// Path of the last camera that started
    camera_path: Option<String>,
}

impl CaptureScreen {
    pub fn new(mode: CaptureMode, camera: CameraSession, interval: CaptureInterval) -> Self {
        Self {
            mode,
            camera,
            timer: CaptureTimer::new(interval),
            snapshots: SnapshotCollection::new(),
            draft_metadata: String::new(),
            capturing: false,
            persist_captures: false,
            status: None,
            tick_generation: 0,
            camera_path: None,
        }
    }

    /// Show this status until something replaces it
    pub fn with_status(mut self, status: StatusMessage) -> Self {
        self.status = Some(status);
        self
    }

    /// Save manual shots to the photo library
    pub fn with_persistence(mut self, persist: bool) -> Self {
        self.persist_captures = persist;
        self
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn timer(&self) -> &CaptureTimer {
        &self.timer
    }

    pub fn snapshots(&self) -> &SnapshotCollection {
        &self.snapshots
    }

    pub fn draft_metadata(&self) -> &str {
        &self.draft_metadata
    }

    pub fn tick_generation(&self) -> u64 {
        self.tick_generation
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn is_camera_active(&self) -> bool {
        self.camera.is_active()
    }

    pub fn camera_name(&self) -> Option<&str> {
        self.camera.device_name()
    }

    /// Device path of the last camera that started, kept after it stops
    pub fn last_camera_path(&self) -> Option<&str> {
        self.camera_path.as_deref()
    }

    /// Timer running (timed) or capturing toggle on (manual)
    pub fn is_capturing(&self) -> bool {
        match self.mode {
            CaptureMode::Timed => self.timer.is_running(),
            CaptureMode::Manual => self.capturing,
        }
    }

    /// Pull the newest frame from the camera for display
    pub fn poll_frame(&mut self) -> Option<&CameraFrame> {
        self.camera.poll_frame()
    }

    pub fn current_frame(&self) -> Option<&CameraFrame> {
        self.camera.current_frame()
    }

    pub fn update(&mut self, message: Message) -> Vec<Effect> {
        match message {
            Message::StartCamera => self.start_camera(),
            Message::StopCamera => self.stop_camera(),
            Message::ToggleCapture => self.toggle_capture(),
            Message::CycleInterval => self.set_interval(self.timer.interval().next()),
            Message::SetInterval(interval) => self.set_interval(interval),
            Message::Tick(generation) => self.tick(generation),
            Message::Shoot => self.shoot(),
            Message::SetDraftMetadata(text) => {
                self.draft_metadata = text;
                Vec::new()
            }
            Message::Delete(index) => {
                self.snapshots = self.snapshots.delete(index);
                Vec::new()
            }
            Message::ToggleEdit(index) => {
                self.snapshots = self.snapshots.toggle_edit(index);
                Vec::new()
            }
            Message::UpdateMetadata(index, text) => {
                self.snapshots = self.snapshots.update_metadata(index, text);
                Vec::new()
            }
            Message::CountFlowers(index) => self.count_flowers(index),
            Message::CountFinished { id, result } => {
                self.count_finished(id, result);
                Vec::new()
            }
            Message::Persisted { id, result } => {
                match result {
                    Ok(path) => info!(snapshot = %id, path = %path.display(), "Snapshot saved"),
                    Err(e) => {
                        error!(snapshot = %id, error = %e, "Failed to save snapshot");
                        self.status = Some(StatusMessage::error(format!(
                            "Failed to save photo: {}",
                            e
                        )));
                    }
                }
                Vec::new()
            }
        }
    }

    /// Stop capturing and release the camera
    pub fn shutdown(&mut self) -> Vec<Effect> {
        let effects = self.stop_camera();
        info!(snapshots = self.snapshots.len(), "Capture screen closed");
        effects
    }

    fn start_camera(&mut self) -> Vec<Effect> {
        match self.camera.start() {
            Ok(()) => {
                if let Some(path) = self.camera.device_path() {
                    self.camera_path = Some(path.to_string());
                }
                let name = self.camera.device_name().unwrap_or("camera").to_string();
                self.status = Some(StatusMessage::info(format!("Camera on: {}", name)));
            }
            Err(CameraError::PermissionDenied(reason)) => {
                warn!(reason = %reason, "Camera access denied");
                self.status = Some(StatusMessage::error(PERMISSION_DENIED_TEXT));
            }
            Err(e) => {
                error!(error = %e, "Failed to start camera");
                self.status = Some(StatusMessage::error(format!("Failed to start camera: {}", e)));
            }
        }
        Vec::new()
    }

    fn stop_camera(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.timer.stop() == TimerTransition::Stopped {
            effects.push(Effect::StopTicker);
        }
        self.capturing = false;
        if self.camera.is_active() {
            self.camera.stop();
            self.status = Some(StatusMessage::info("Camera off"));
        }
        effects
    }

    fn toggle_capture(&mut self) -> Vec<Effect> {
        if !self.camera.is_active() {
            self.status = Some(StatusMessage::error("Start the camera before capturing"));
            return Vec::new();
        }

        match self.mode {
            CaptureMode::Timed => match self.timer.toggle() {
                TimerTransition::Started => {
                    self.status = Some(StatusMessage::info(format!(
                        "Capturing every {}",
                        self.timer.interval()
                    )));
                    vec![self.start_ticker()]
                }
                TimerTransition::Stopped => {
                    self.status = Some(StatusMessage::info("Capture stopped"));
                    vec![Effect::StopTicker]
                }
                TimerTransition::Ignored => Vec::new(),
            },
            CaptureMode::Manual => {
                self.capturing = !self.capturing;
                info!(capturing = self.capturing, "Manual capturing toggled");
                self.status = Some(StatusMessage::info(if self.capturing {
                    "Capturing: take pictures with the shutter"
                } else {
                    "Capture stopped"
                }));
                Vec::new()
            }
        }
    }

    fn set_interval(&mut self, interval: CaptureInterval) -> Vec<Effect> {
        let running = self.timer.is_running();
        self.timer.set_interval(interval);
        // Re-phase the ticker so the restarted countdown gets whole seconds
        if running {
            vec![Effect::StopTicker, self.start_ticker()]
        } else {
            Vec::new()
        }
    }

    fn start_ticker(&mut self) -> Effect {
        self.tick_generation += 1;
        Effect::StartTicker(self.tick_generation)
    }

    fn tick(&mut self, generation: u64) -> Vec<Effect> {
        if generation != self.tick_generation {
            debug!(
                generation,
                current = self.tick_generation,
                "Stale tick from a previous ticker dropped"
            );
            return Vec::new();
        }
        match self.timer.tick() {
            TickOutcome::Capture => {
                self.capture();
            }
            TickOutcome::Counted { remaining } => debug!(remaining, "Capture countdown"),
            TickOutcome::Idle => debug!("Tick while idle ignored"),
        }
        Vec::new()
    }

    fn shoot(&mut self) -> Vec<Effect> {
        if self.mode != CaptureMode::Manual || !self.capturing {
            debug!(mode = ?self.mode, "Shot ignored, not capturing");
            return Vec::new();
        }
        match self.capture() {
            Some(snapshot) if self.persist_captures => vec![Effect::Persist {
                id: snapshot.id(),
                image: snapshot.image().clone(),
                timestamp: snapshot.timestamp(),
            }],
            _ => Vec::new(),
        }
    }

    /// Append a snapshot of the current frame; skipped without a frame
    fn capture(&mut self) -> Option<Snapshot> {
        let Some(frame) = self.camera.poll_frame() else {
            debug!("No frame available, capture skipped");
            return None;
        };

        let image = match encode_frame(frame) {
            Ok(image) => image,
            Err(e) => {
                warn!(error = %e, "Frame encoding failed, capture skipped");
                return None;
            }
        };

        let snapshot = Snapshot::new(image, self.draft_metadata.clone());
        info!(
            snapshot = %snapshot.id(),
            count = self.snapshots.len() + 1,
            "Snapshot captured"
        );
        self.snapshots = self.snapshots.append(snapshot.clone());
        Some(snapshot)
    }

    fn count_flowers(&mut self, index: usize) -> Vec<Effect> {
        let Some(snapshot) = self.snapshots.get(index) else {
            debug!(index, "Count requested for missing snapshot");
            return Vec::new();
        };
        info!(snapshot = %snapshot.id(), "Submitting snapshot for counting");
        self.status = Some(StatusMessage::info("Counting flowers..."));
        vec![Effect::Upload {
            id: snapshot.id(),
            image: snapshot.image().clone(),
        }]
    }

    fn count_finished(&mut self, id: SnapshotId, result: Result<CountResponse, UploadError>) {
        if self.snapshots.position(id).is_none() {
            debug!(snapshot = %id, "Count result for a removed snapshot");
        }
        match result {
            Ok(response) => {
                self.status = Some(StatusMessage::info(count_message(response.flowers_count)));
            }
            Err(e) => {
                error!(snapshot = %id, error = %e, "Error uploading photo");
                self.status = Some(StatusMessage::error(format!(
                    "Failed to count flowers: {}",
                    e
                )));
            }
        }
    }
}
