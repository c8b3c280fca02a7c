// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for photos and logs

use crate::constants::APP_DIR;
use crate::errors::PhotoError;
use crate::pipelines::photo::EncodedImage;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default photo directory: `~/Pictures/flowercam`
pub fn default_photo_directory() -> PathBuf {
    dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Log file used while the terminal UI owns the screen
pub fn log_file_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
        .join("flowercam.log")
}

/// Photo filename for a capture time, e.g. `IMG_20240315_142501_042.png`
pub fn photo_filename(image: &EncodedImage, timestamp: DateTime<Local>) -> String {
    format!(
        "IMG_{}.{}",
        timestamp.format("%Y%m%d_%H%M%S_%3f"),
        image.format.extension()
    )
}

/// Write an encoded snapshot into the photo directory
///
/// Shots within the same millisecond get a numeric suffix instead of
/// overwriting each other. Blocking; run it off the UI loop.
pub fn persist_snapshot(
    dir: &Path,
    image: &EncodedImage,
    timestamp: DateTime<Local>,
) -> Result<PathBuf, PhotoError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| PhotoError::SaveFailed(format!("{}: {}", dir.display(), e)))?;

    let filename = photo_filename(image, timestamp);
    let mut path = dir.join(&filename);
    let mut suffix = 1;
    while path.exists() {
        let stem = filename.trim_end_matches(&format!(".{}", image.format.extension()));
        path = dir.join(format!("{}_{}.{}", stem, suffix, image.format.extension()));
        suffix += 1;
    }

    debug!(path = %path.display(), size = image.data.len(), "Writing photo");
    std::fs::write(&path, &image.data)?;
    info!(path = %path.display(), "Photo saved");
    Ok(path)
}
