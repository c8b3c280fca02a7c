// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Headless timed capture
//! - Counting the flowers in an image file
//! - Checking the counting service

use flowercam::backends::camera::{CameraSession, enumerate_cameras, select_camera};
use flowercam::capture::{CaptureMode, CaptureScreen, EffectRunner, Message};
use flowercam::config::Config;
use flowercam::constants::CaptureInterval;
use flowercam::pipelines::photo::load_image_file;
use flowercam::storage;
use flowercam::upload::{CountingClient, count_message};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// List all available cameras
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    let cameras = enumerate_cameras()?;

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    let config = Config::load().unwrap_or_default();
    let preferred = select_camera(
        &cameras,
        config.camera_facing,
        config.last_camera_path.as_deref(),
    );

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        let marker = if preferred.is_some_and(|p| p.path == camera.path) {
            "*"
        } else {
            " "
        };
        let facing = camera
            .facing()
            .map(|f| f.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!("{} [{}] {}", marker, index, camera.name);
        println!("      Facing: {}  Path: {}", facing, camera.path);
    }
    println!();
    println!("* = used for capture");

    Ok(())
}

pub struct CaptureArgs {
    pub interval: CaptureInterval,
    pub shots: Option<usize>,
    pub metadata: String,
    pub output: Option<PathBuf>,
    pub count: bool,
    pub source: Option<PathBuf>,
}

/// Run the timed capture loop without the UI
pub fn capture(config: &Config, args: CaptureArgs) -> Result<(), Box<dyn std::error::Error>> {
    let CaptureArgs {
        interval,
        shots,
        metadata,
        output,
        count,
        source,
    } = args;

    let runtime = tokio::runtime::Runtime::new()?;
    let client = Arc::new(CountingClient::new(&config.upload_config())?);

    let camera = match source {
        Some(path) => CameraSession::still(path),
        None => CameraSession::pipewire(config.camera_facing, config.last_camera_path.clone()),
    };
    let mut screen = CaptureScreen::new(CaptureMode::Timed, camera, interval);

    let photo_dir = output.clone().unwrap_or_else(|| config.photo_directory());
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let mut runner = EffectRunner::new(client, runtime.handle().clone(), sender, photo_dir);

    runner.run(screen.update(Message::StartCamera));
    if !screen.is_camera_active() {
        let reason = screen
            .status()
            .map(|s| s.text.clone())
            .unwrap_or_else(|| "Camera unavailable".to_string());
        return Err(reason.into());
    }
    println!("Using camera: {}", screen.camera_name().unwrap_or("camera"));

    runner.run(screen.update(Message::SetDraftMetadata(metadata)));
    runner.run(screen.update(Message::ToggleCapture));

    // Set up Ctrl+C handler
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();
    ctrlc::set_handler(move || {
        stop_flag_clone.store(true, Ordering::SeqCst);
    })?;

    println!("Capturing every {} (press Ctrl+C to stop early)", interval);

    let mut captured = 0usize;
    let mut pending_counts = 0usize;

    runtime.block_on(async {
        loop {
            if stop_flag.load(Ordering::SeqCst) {
                println!();
                println!("Stopping early...");
                break;
            }

            let done = shots.is_some_and(|n| captured >= n);
            if done {
                if screen.timer().is_running() {
                    runner.run(screen.update(Message::ToggleCapture));
                }
                if pending_counts == 0 {
                    break;
                }
            }

            let message =
                match tokio::time::timeout(Duration::from_millis(100), receiver.recv()).await {
                    Ok(Some(message)) => message,
                    Ok(None) => break,
                    Err(_) => continue,
                };

            if let Message::CountFinished { result, .. } = &message {
                pending_counts = pending_counts.saturating_sub(1);
                match result {
                    Ok(response) => println!("  {}", count_message(response.flowers_count)),
                    Err(e) => println!("  Failed to count flowers: {}", e),
                }
            }

            let before = screen.snapshots().len();
            runner.run(screen.update(message));
            if screen.snapshots().len() <= before {
                continue;
            }

            captured += 1;
            let index = screen.snapshots().len() - 1;
            let Some(snapshot) = screen.snapshots().get(index) else {
                continue;
            };
            println!(
                "[{}] Captured {}x{} at {}",
                captured,
                snapshot.image().width,
                snapshot.image().height,
                snapshot.timestamp().format("%H:%M:%S")
            );

            if let Some(dir) = &output {
                match storage::persist_snapshot(dir, snapshot.image(), snapshot.timestamp()) {
                    Ok(path) => println!("  Saved: {}", path.display()),
                    Err(e) => println!("  Failed to save: {}", e),
                }
            }

            if count {
                runner.run(screen.update(Message::CountFlowers(index)));
                pending_counts += 1;
            }
        }
    });

    runner.run(screen.shutdown());
    info!(captured, "Headless capture finished");
    println!("Captured {} snapshot(s)", captured);
    Ok(())
}

/// Count the flowers in an image file
pub fn count_file(config: &Config, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let image = load_image_file(path)?;
    debug!(format = ?image.format, width = image.width, height = image.height, "Image loaded");

    let client = CountingClient::new(&config.upload_config())?;
    let runtime = tokio::runtime::Runtime::new()?;
    let response = runtime.block_on(client.count_flowers(&image))?;

    println!("{}", count_message(response.flowers_count));
    if let Some(message) = response.message {
        println!("{}", message);
    }
    Ok(())
}

/// Check that the counting service answers
pub fn ping(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let client = CountingClient::new(&config.upload_config())?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(client.ping())?;
    println!("Counting service at {} is reachable", client.config().api_url);
    Ok(())
}
