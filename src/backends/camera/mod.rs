// SPDX-License-Identifier: MPL-2.0

//! Camera backend abstraction
//!
//! ```text
//! ┌─────────────────────┐
//! │  CaptureScreen      │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │   CameraSession     │  ← start/stop, latest frame
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  FrameSource trait  │
//! └──────────┬──────────┘
//!       ┌────┴─────┐
//!       ▼          ▼
//!  ┌─────────┐ ┌─────────┐
//!  │GstCamera│ │  Still  │
//!  └─────────┘ └─────────┘
//! ```

pub mod pipewire;
pub mod still;
pub mod types;

pub use pipewire::{GstCamera, enumerate_cameras, select_camera};
pub use still::StillImageSource;
pub use types::*;

use std::path::PathBuf;
use tracing::{debug, info};

/// A live source of camera frames
pub trait FrameSource: Send {
    /// Human-readable device name
    fn device_name(&self) -> &str;

    /// Device path to reopen the same camera later, if it has one
    fn device_path(&self) -> Option<&str> {
        None
    }

    /// Most recent frame, dropping any older ones still queued
    ///
    /// Returns `None` when no new frame arrived since the last call.
    fn latest_frame(&mut self) -> Option<CameraFrame>;
}

/// Opens a frame source on demand
pub type SourceOpener = Box<dyn FnMut() -> BackendResult<Box<dyn FrameSource>> + Send>;

/// The live camera feed plus its on/off state
///
/// The source is acquired on `start` and released on `stop` or drop.
pub struct CameraSession {
    opener: SourceOpener,
    source: Option<Box<dyn FrameSource>>,
    last_frame: Option<CameraFrame>,
}

impl CameraSession {
    pub fn new(opener: SourceOpener) -> Self {
        Self {
            opener,
            source: None,
            last_frame: None,
        }
    }

    /// Session over the GStreamer/PipeWire camera matching the preferences
    pub fn pipewire(facing: CameraFacing, preferred_path: Option<String>) -> Self {
        Self::new(Box::new(move || {
            let cameras = enumerate_cameras()?;
            let device = select_camera(&cameras, facing, preferred_path.as_deref())
                .cloned()
                .unwrap_or_else(CameraDevice::auto);
            let camera = GstCamera::open(&device)?;
            Ok(Box::new(camera) as Box<dyn FrameSource>)
        }))
    }

    /// Session serving a still image file as the live frame
    pub fn still(path: PathBuf) -> Self {
        Self::new(Box::new(move || {
            let source = StillImageSource::open(&path)?;
            Ok(Box::new(source) as Box<dyn FrameSource>)
        }))
    }

    /// Acquire the feed. Starting an active session is a no-op.
    pub fn start(&mut self) -> BackendResult<()> {
        if self.source.is_some() {
            debug!("Camera session already active");
            return Ok(());
        }
        let source = (self.opener)()?;
        info!(device = %source.device_name(), "Camera session started");
        self.source = Some(source);
        Ok(())
    }

    /// Release the feed
    pub fn stop(&mut self) {
        if let Some(source) = self.source.take() {
            info!(device = %source.device_name(), "Camera session stopped");
        }
        self.last_frame = None;
    }

    pub fn is_active(&self) -> bool {
        self.source.is_some()
    }

    pub fn device_name(&self) -> Option<&str> {
        self.source.as_ref().map(|s| s.device_name())
    }

    pub fn device_path(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.device_path())
    }

    /// Pull new frames from the source and return the latest known one
    pub fn poll_frame(&mut self) -> Option<&CameraFrame> {
        let source = self.source.as_mut()?;
        if let Some(frame) = source.latest_frame() {
            self.last_frame = Some(frame);
        }
        self.last_frame.as_ref()
    }

    /// Latest frame without polling the source
    pub fn current_frame(&self) -> Option<&CameraFrame> {
        self.last_frame.as_ref()
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CameraError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_session(opens: Arc<AtomicUsize>) -> CameraSession {
        CameraSession::new(Box::new(move || {
            opens.fetch_add(1, Ordering::SeqCst);
            let frame = CameraFrame::from_rgba(1, 1, vec![1, 2, 3, 255]);
            Ok(Box::new(StillImageSource::from_frame("test", frame)) as Box<dyn FrameSource>)
        }))
    }

    #[test]
    fn test_start_is_idempotent() {
        let opens = Arc::new(AtomicUsize::new(0));
        let mut session = counting_session(opens.clone());
        session.start().unwrap();
        session.start().unwrap();
        assert_eq!(opens.load(Ordering::SeqCst), 1);
        assert!(session.is_active());
    }

    #[test]
    fn test_stop_clears_frame() {
        let mut session = counting_session(Arc::new(AtomicUsize::new(0)));
        session.start().unwrap();
        assert!(session.poll_frame().is_some());
        session.stop();
        assert!(!session.is_active());
        assert!(session.current_frame().is_none());
        assert!(session.poll_frame().is_none());
    }

    #[test]
    fn test_failed_start_leaves_session_inactive() {
        let mut session = CameraSession::new(Box::new(|| {
            Err(CameraError::PermissionDenied("portal refused".into()))
        }));
        let err = session.start().err();
        assert!(matches!(err, Some(CameraError::PermissionDenied(_))));
        assert!(!session.is_active());
    }
}
