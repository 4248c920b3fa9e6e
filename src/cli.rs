// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Asking about a single picture without the terminal UI

use camera_ask::backends::camera::{
    CameraBackend, GStreamerCamera, StillImageCamera, enumerate_cameras,
};
use camera_ask::constants::timing;
use camera_ask::{AnalysisPipeline, CaptureController, Config, InferenceClient};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

/// List all available cameras
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    let cameras = enumerate_cameras()?;

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for camera in &cameras {
        println!("  [{}] {} ({})", camera.index, camera.name, camera.device_class);
    }

    Ok(())
}

/// Take one picture (or load `image`), upload it and print the answer
pub fn ask(config: &Config, image: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let camera: Box<dyn CameraBackend> = match image {
        Some(path) => {
            println!("Using image: {}", path.display());
            Box::new(StillImageCamera::open(&path)?)
        }
        None => {
            let camera = GStreamerCamera::open(config.camera_index)?;
            println!("Using camera: {}", camera.name());
            wait_for_frame(&camera)?;
            Box::new(camera)
        }
    };

    let client = InferenceClient::new(&config.endpoint, config.request_timeout())?;
    let pipeline = AnalysisPipeline::new(
        CaptureController::with_camera(camera),
        client,
        config.capture_options(),
    );

    println!("Asking {} ...", pipeline.client().endpoint());
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(pipeline.take_picture())?;

    println!();
    println!("{}", result.answer_text());
    Ok(())
}

/// Wait for frames to stabilize (camera warm-up)
fn wait_for_frame(camera: &GStreamerCamera) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();

    while start.elapsed() < timing::FIRST_FRAME_TIMEOUT {
        if camera.is_warmed_up() {
            info!(
                frames = camera.frames_received(),
                waited_ms = start.elapsed().as_millis() as u64,
                "Camera ready"
            );
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(16));
    }

    Err("Timed out waiting for a frame from the camera".into())
}
