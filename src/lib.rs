// SPDX-License-Identifier: MPL-2.0

//! flowercam - capture flower photos and have them counted
//!
//! This library provides the core functionality of the flowercam client:
//! a live camera session, a timed (or manual) capture loop that collects
//! snapshots with user metadata, and a client for the remote flower
//! counting service.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Camera backend abstraction (PipeWire/GStreamer, still image)
//! - [`capture`]: Capture timer, snapshot collection and the capture screen
//! - [`pipelines`]: Frame to PNG encoding
//! - [`upload`]: Counting service client
//! - [`config`]: User configuration handling
//! - [`storage`]: Photo library and log file locations
//! - [`terminal`]: Interactive terminal client
//!
//! # Example
//!
//! ```ignore
//! // Typically run via:
//! // flowercam terminal
//! ```

pub mod backends;
pub mod capture;
pub mod config;
pub mod constants;
pub mod errors;
pub mod pipelines;
pub mod storage;
pub mod terminal;
pub mod upload;

// Re-export commonly used types
pub use capture::{CaptureMode, CaptureScreen, Effect, Message, Snapshot, SnapshotCollection};
pub use config::Config;
pub use constants::CaptureInterval;
pub use errors::{AppError, AppResult};
