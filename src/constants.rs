// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Automatic capture interval
///
/// Only a small fixed set of intervals is offered. The value is persisted as
/// its number of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum CaptureInterval {
    /// Capture every second
    One,
    /// Capture every 2 seconds
    Two,
    /// Capture every 5 seconds (default)
    #[default]
    Five,
    /// Capture every 10 seconds
    Ten,
}

impl CaptureInterval {
    /// All intervals in ascending order, for UI iteration
    pub const ALL: [CaptureInterval; 4] = [
        CaptureInterval::One,
        CaptureInterval::Two,
        CaptureInterval::Five,
        CaptureInterval::Ten,
    ];

    /// Interval length in seconds
    pub fn seconds(&self) -> u64 {
        match self {
            CaptureInterval::One => 1,
            CaptureInterval::Two => 2,
            CaptureInterval::Five => 5,
            CaptureInterval::Ten => 10,
        }
    }

    /// Look up the interval for a number of seconds, if it is one of the allowed values
    pub fn from_seconds(seconds: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.seconds() == seconds)
    }

    /// Next interval in the cycle (wraps from 10 back to 1)
    pub fn next(&self) -> Self {
        match self {
            CaptureInterval::One => CaptureInterval::Two,
            CaptureInterval::Two => CaptureInterval::Five,
            CaptureInterval::Five => CaptureInterval::Ten,
            CaptureInterval::Ten => CaptureInterval::One,
        }
    }

    /// Label shown in the interval selector
    pub fn display_name(&self) -> &'static str {
        match self {
            CaptureInterval::One => "1 second",
            CaptureInterval::Two => "2 seconds",
            CaptureInterval::Five => "5 seconds",
            CaptureInterval::Ten => "10 seconds",
        }
    }
}

impl TryFrom<u64> for CaptureInterval {
    type Error = String;

    fn try_from(seconds: u64) -> Result<Self, Self::Error> {
        Self::from_seconds(seconds).ok_or_else(|| {
            format!(
                "unsupported capture interval {}s (allowed: 1, 2, 5, 10)",
                seconds
            )
        })
    }
}

impl From<CaptureInterval> for u64 {
    fn from(interval: CaptureInterval) -> Self {
        interval.seconds()
    }
}

impl std::fmt::Display for CaptureInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Application directory name used under config, cache and picture directories
pub const APP_DIR: &str = "flowercam";

pub mod timing {
    use super::Duration;

    /// Period of the capture countdown tick
    pub const TICK_PERIOD: Duration = Duration::from_secs(1);

    /// Terminal input poll timeout (one frame at ~60 fps)
    pub const INPUT_POLL_MS: u64 = 16;

    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;

    /// Pipeline state change timeout on stop
    pub const STOP_TIMEOUT_SECS: u64 = 2;

    /// Pipeline playing state timeout on start
    pub const START_TIMEOUT_SECS: u64 = 5;
}

pub mod pipeline {
    /// Frames buffered between the appsink callback and the UI loop
    pub const FRAME_CHANNEL_CAPACITY: usize = 4;

    /// Maximum buffer queue size on the appsink (keep small for low latency)
    pub const MAX_BUFFERS: u32 = 2;

    /// Output pixel format for appsink
    pub const OUTPUT_FORMAT: &str = "RGBA";
}

pub mod upload {
    /// Counting service base URL when nothing else is configured
    pub const DEFAULT_API_URL: &str = "http://localhost:8000";

    /// Upload route, relative to the base URL
    pub const UPLOAD_PATH: &str = "upload/";

    /// Health check route, relative to the base URL
    pub const PING_PATH: &str = "ping/";

    /// Multipart field carrying the image
    pub const FILE_FIELD: &str = "file";

    /// Request timeout
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
}

pub mod env {
    /// Overrides the counting service base URL
    pub const API_URL: &str = "FLOWERCAM_API_URL";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_cycle_visits_every_value() {
        let mut interval = CaptureInterval::One;
        let mut seen = Vec::new();
        for _ in 0..CaptureInterval::ALL.len() {
            seen.push(interval);
            interval = interval.next();
        }
        assert_eq!(seen, CaptureInterval::ALL.to_vec());
        assert_eq!(interval, CaptureInterval::One);
    }

    #[test]
    fn test_interval_rejects_unlisted_seconds() {
        assert_eq!(CaptureInterval::from_seconds(5), Some(CaptureInterval::Five));
        assert!(CaptureInterval::try_from(3).is_err());
        assert!(CaptureInterval::try_from(0).is_err());
    }
}
