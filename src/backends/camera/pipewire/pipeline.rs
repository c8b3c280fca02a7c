// SPDX-License-Identifier: MPL-2.0

//! PipeWire GStreamer pipeline for camera capture

use super::super::FrameSource;
use super::super::types::*;
use crate::constants::{pipeline, timing};
use crate::errors::CameraError;
use futures::channel::mpsc;
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Live camera pipeline
///
/// `<source> ! videoconvert ! video/x-raw,format=RGBA ! appsink`. The appsink
/// callback pushes frames into a small channel; the UI loop drains it and
/// keeps the newest one.
pub struct GstCamera {
    pipeline: gstreamer::Pipeline,
    appsink: AppSink,
    receiver: FrameReceiver,
    name: String,
    path: String,
}

impl GstCamera {
    /// Open the camera and wait for the pipeline to start playing
    pub fn open(device: &CameraDevice) -> BackendResult<Self> {
        info!(device = %device.name, path = %device.path, "Creating camera pipeline");

        gstreamer::init().map_err(|e| CameraError::InitializationFailed(e.to_string()))?;

        let description = build_pipeline_string(&source_element(&device.path));
        debug!(pipeline = %description, "Launching pipeline");

        let pipeline = gstreamer::parse::launch(&description)
            .map_err(|e| classify_error(&e.to_string()))?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(|_| {
                CameraError::InitializationFailed("Launch result is not a pipeline".to_string())
            })?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| CameraError::InitializationFailed("Failed to get appsink".to_string()))?
            .dynamic_cast::<AppSink>()
            .map_err(|_| CameraError::InitializationFailed("Failed to cast appsink".to_string()))?;

        appsink.set_property("sync", false);
        appsink.set_property("max-buffers", pipeline::MAX_BUFFERS);
        appsink.set_property("drop", true);
        appsink.set_property("enable-last-sample", false);

        let (sender, receiver) = mpsc::channel(pipeline::FRAME_CHANNEL_CAPACITY);
        install_frame_callback(&appsink, sender);

        pipeline
            .set_state(gstreamer::State::Playing)
            .map_err(|e| start_failure(&pipeline, &e.to_string()))?;

        let (result, state, pending) = pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::START_TIMEOUT_SECS,
        ));
        debug!(result = ?result, state = ?state, pending = ?pending, "Pipeline state");

        if let Some(message) = pop_bus_error(&pipeline) {
            let _ = pipeline.set_state(gstreamer::State::Null);
            return Err(classify_error(&message));
        }
        if result.is_err() {
            return Err(start_failure(&pipeline, "state change failed"));
        }
        if state != gstreamer::State::Playing {
            warn!("Pipeline is not in PLAYING state yet");
        }

        info!(device = %device.name, "Camera pipeline running");

        Ok(Self {
            pipeline,
            appsink,
            receiver,
            name: device.name.clone(),
            path: device.path.clone(),
        })
    }
}

impl FrameSource for GstCamera {
    fn device_name(&self) -> &str {
        &self.name
    }

    fn device_path(&self) -> Option<&str> {
        // Empty means PipeWire picked the camera
        (!self.path.is_empty()).then_some(self.path.as_str())
    }

    fn latest_frame(&mut self) -> Option<CameraFrame> {
        let mut latest = None;
        while let Ok(frame) = self.receiver.try_recv() {
            latest = Some(frame);
        }
        latest
    }
}

impl Drop for GstCamera {
    fn drop(&mut self) {
        info!(device = %self.name, "Stopping camera pipeline");
        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
        let _ = self.pipeline.set_state(gstreamer::State::Null);
        let (result, state, _) = self.pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::STOP_TIMEOUT_SECS,
        ));
        debug!(result = ?result, state = ?state, "Camera pipeline released");
    }
}

/// Source element for a device path
pub fn source_element(path: &str) -> String {
    if path.is_empty() {
        "pipewiresrc".to_string()
    } else if let Some(serial) = path.strip_prefix("pipewire-serial-") {
        format!("pipewiresrc target-object={}", serial)
    } else if let Some(node_id) = path.strip_prefix("pipewire-") {
        format!("pipewiresrc target-object={}", node_id)
    } else if path.starts_with("/dev/video") {
        format!("v4l2src device={}", path)
    } else {
        format!("pipewiresrc path={}", path)
    }
}

fn build_pipeline_string(source: &str) -> String {
    format!(
        "{} do-timestamp=true ! \
         queue max-size-buffers={} leaky=downstream ! \
         videoconvert ! \
         video/x-raw,format={} ! \
         appsink name=sink",
        source,
        pipeline::MAX_BUFFERS,
        pipeline::OUTPUT_FORMAT
    )
}

/// Map a GStreamer error message to a camera error
///
/// Portal refusals and device node permission errors are reported as
/// `PermissionDenied` so the UI can ask the user to grant access.
pub fn classify_error(message: &str) -> CameraError {
    let lower = message.to_ascii_lowercase();
    let denied = ["permission", "not authorized", "not permitted", "access denied"]
        .iter()
        .any(|needle| lower.contains(needle));
    if denied {
        CameraError::PermissionDenied(message.to_string())
    } else {
        CameraError::InitializationFailed(message.to_string())
    }
}

fn start_failure(pipeline: &gstreamer::Pipeline, fallback: &str) -> CameraError {
    let message = pop_bus_error(pipeline).unwrap_or_else(|| fallback.to_string());
    let _ = pipeline.set_state(gstreamer::State::Null);
    error!(error = %message, "Failed to start camera pipeline");
    classify_error(&message)
}

fn pop_bus_error(pipeline: &gstreamer::Pipeline) -> Option<String> {
    let bus = pipeline.bus()?;
    let msg = bus.timed_pop_filtered(
        gstreamer::ClockTime::ZERO,
        &[gstreamer::MessageType::Error],
    )?;
    match msg.view() {
        gstreamer::MessageView::Error(err) => Some(match err.debug() {
            Some(debug) => format!("{} ({})", err.error(), debug),
            None => err.error().to_string(),
        }),
        _ => None,
    }
}

fn install_frame_callback(appsink: &AppSink, frame_sender: FrameSender) {
    appsink.set_callbacks(
        gstreamer_app::AppSinkCallbacks::builder()
            .new_sample(move |appsink| {
                let frame_start = Instant::now();
                let frame_num = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);

                let sample = appsink
                    .pull_sample()
                    .map_err(|_| gstreamer::FlowError::Eos)?;
                let buffer = sample.buffer().ok_or(gstreamer::FlowError::Error)?;

                if buffer.flags().contains(gstreamer::BufferFlags::CORRUPTED) {
                    if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                        warn!(frame = frame_num, "Buffer marked as corrupted, skipping frame");
                    }
                    return Ok(gstreamer::FlowSuccess::Ok);
                }

                let caps = sample.caps().ok_or(gstreamer::FlowError::Error)?;
                let video_info =
                    VideoInfo::from_caps(caps).map_err(|_| gstreamer::FlowError::Error)?;
                let map = buffer
                    .map_readable()
                    .map_err(|_| gstreamer::FlowError::Error)?;

                let frame = CameraFrame {
                    width: video_info.width(),
                    height: video_info.height(),
                    data: Arc::from(map.as_slice()),
                    format: PixelFormat::RGBA,
                    stride: video_info.stride()[0] as u32,
                    captured_at: frame_start,
                };

                let mut sender = frame_sender.clone();
                if let Err(e) = sender.try_send(frame) {
                    if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                        debug!(frame = frame_num, error = ?e, "Frame dropped (channel full)");
                    }
                } else if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                    debug!(
                        frame = frame_num,
                        width = video_info.width(),
                        height = video_info.height(),
                        elapsed_us = frame_start.elapsed().as_micros(),
                        "Frame delivered"
                    );
                }

                Ok(gstreamer::FlowSuccess::Ok)
            })
            .build(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_element_for_paths() {
        assert_eq!(source_element(""), "pipewiresrc");
        assert_eq!(
            source_element("pipewire-serial-2146"),
            "pipewiresrc target-object=2146"
        );
        assert_eq!(source_element("pipewire-60"), "pipewiresrc target-object=60");
        assert_eq!(source_element("/dev/video2"), "v4l2src device=/dev/video2");
    }

    #[test]
    fn test_classify_permission_errors() {
        assert!(matches!(
            classify_error("Could not open device: Permission denied"),
            CameraError::PermissionDenied(_)
        ));
        assert!(matches!(
            classify_error("Camera access not authorized by portal"),
            CameraError::PermissionDenied(_)
        ));
        assert!(matches!(
            classify_error("no element \"pipewiresrc\""),
            CameraError::InitializationFailed(_)
        ));
    }

    #[test]
    fn test_pipeline_string_ends_in_named_appsink() {
        let description = build_pipeline_string("pipewiresrc");
        assert!(description.starts_with("pipewiresrc do-timestamp=true"));
        assert!(description.contains("format=RGBA"));
        assert!(description.ends_with("appsink name=sink"));
    }
}
