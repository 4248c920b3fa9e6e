// SPDX-License-Identifier: GPL-3.0-only

//! Live camera backend built on GStreamer
//!
//! Devices are discovered with a `Video/Source` device monitor, so PipeWire,
//! libcamera and plain V4L2 cameras all show up through whichever GStreamer
//! provider is installed. The preview pipeline converts to RGBA and keeps the
//! most recent frame around for rendering and capture.

use super::types::*;
use super::CameraBackend;
use crate::constants::timing;
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::{VideoCapsBuilder, VideoFormat, VideoInfo};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const VIDEO_SOURCE_CLASS: &str = "Video/Source";

fn init_gstreamer() -> BackendResult<()> {
    gstreamer::init()
        .map_err(|e| BackendError::NotAvailable(format!("GStreamer init failed: {}", e)))
}

/// Run the device monitor once and collect video sources
fn monitor_devices() -> BackendResult<Vec<gstreamer::Device>> {
    init_gstreamer()?;

    let monitor = gstreamer::DeviceMonitor::new();
    if monitor.add_filter(Some(VIDEO_SOURCE_CLASS), None).is_none() {
        warn!("Device monitor rejected the video source filter");
    }
    monitor
        .start()
        .map_err(|e| BackendError::NotAvailable(format!("Device monitor failed: {}", e)))?;
    let devices: Vec<gstreamer::Device> = monitor.devices().into_iter().collect();
    monitor.stop();

    debug!(count = devices.len(), "Device monitor finished");
    Ok(devices)
}

/// Enumerate available cameras
pub fn enumerate_cameras() -> BackendResult<Vec<CameraDevice>> {
    let cameras = monitor_devices()?
        .iter()
        .enumerate()
        .map(|(index, device)| CameraDevice {
            name: device.display_name().to_string(),
            device_class: device.device_class().to_string(),
            index,
        })
        .collect();
    Ok(cameras)
}

/// Latest frame slot shared with the appsink callback
type FrameSlot = Arc<Mutex<Option<CameraFrame>>>;

/// GStreamer preview pipeline for one camera
pub struct GStreamerCamera {
    name: String,
    pipeline: gstreamer::Pipeline,
    appsink: AppSink,
    latest: FrameSlot,
    frames_received: Arc<AtomicU64>,
    started_at: Instant,
    paused: bool,
}

impl GStreamerCamera {
    /// Open the camera at `index` (see [`enumerate_cameras`]) and start the preview
    pub fn open(index: usize) -> BackendResult<Self> {
        let devices = monitor_devices()?;
        if devices.is_empty() {
            return Err(BackendError::DeviceNotFound("No cameras found".to_string()));
        }
        let count = devices.len();
        let device = devices.into_iter().nth(index).ok_or_else(|| {
            BackendError::DeviceNotFound(format!(
                "Camera index {} out of range (0-{})",
                index,
                count - 1
            ))
        })?;

        Self::from_device(&device)
    }

    fn from_device(device: &gstreamer::Device) -> BackendResult<Self> {
        let name = device.display_name().to_string();
        info!(device = %name, "Creating camera pipeline");

        let source = device.create_element(Some("source")).map_err(|e| {
            BackendError::InitializationFailed(format!("Failed to create source element: {}", e))
        })?;
        let convert = gstreamer::ElementFactory::make("videoconvert")
            .build()
            .map_err(|e| {
                BackendError::InitializationFailed(format!("videoconvert not available: {}", e))
            })?;
        let caps = VideoCapsBuilder::new().format(VideoFormat::Rgba).build();

        // One buffer, dropped when stale: the preview only cares about the newest frame
        let appsink = AppSink::builder()
            .caps(&caps)
            .max_buffers(1)
            .drop(true)
            .sync(false)
            .build();

        let pipeline = gstreamer::Pipeline::new();
        let elements = [&source, &convert, appsink.upcast_ref::<gstreamer::Element>()];
        pipeline
            .add_many(elements)
            .map_err(|e| BackendError::InitializationFailed(e.to_string()))?;
        gstreamer::Element::link_many(elements)
            .map_err(|e| BackendError::InitializationFailed(format!("Failed to link: {}", e)))?;

        let latest: FrameSlot = Arc::new(Mutex::new(None));
        let frames_received = Arc::new(AtomicU64::new(0));
        install_frame_callback(&appsink, Arc::clone(&latest), Arc::clone(&frames_received));

        pipeline.set_state(gstreamer::State::Playing).map_err(|e| {
            BackendError::InitializationFailed(format!("Failed to start pipeline: {}", e))
        })?;

        let (result, state, pending) = pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::START_TIMEOUT_SECS,
        ));
        debug!(result = ?result, state = ?state, pending = ?pending, "Pipeline state");
        if state != gstreamer::State::Playing {
            warn!("Pipeline is not in PLAYING state");
        }

        info!(device = %name, "Camera preview started");

        Ok(Self {
            name,
            pipeline,
            appsink,
            latest,
            frames_received,
            started_at: Instant::now(),
            paused: false,
        })
    }

    /// Number of frames delivered since the pipeline started
    pub fn frames_received(&self) -> u64 {
        self.frames_received.load(Ordering::Relaxed)
    }

    /// Whether the camera has delivered a frame after the warm-up window
    pub fn is_warmed_up(&self) -> bool {
        warmed_up(self.started_at.elapsed(), self.latest_frame().is_some())
    }

    fn set_state(&self, state: gstreamer::State) -> BackendResult<()> {
        self.pipeline
            .set_state(state)
            .map(|_| ())
            .map_err(|e| BackendError::StateChange(format!("{:?}: {}", state, e)))
    }
}

/// Frames before the warm-up window ends are shown but never captured
fn warmed_up(since_start: Duration, has_frame: bool) -> bool {
    has_frame && since_start >= timing::CAMERA_WARMUP
}

fn install_frame_callback(appsink: &AppSink, latest: FrameSlot, frames_received: Arc<AtomicU64>) {
    appsink.set_callbacks(
        gstreamer_app::AppSinkCallbacks::builder()
            .new_sample(move |appsink| {
                let frame_num = frames_received.fetch_add(1, Ordering::Relaxed);

                let sample = appsink.pull_sample().map_err(|_| gstreamer::FlowError::Eos)?;
                let buffer = sample.buffer().ok_or(gstreamer::FlowError::Error)?;
                let caps = sample.caps().ok_or(gstreamer::FlowError::Error)?;
                let video_info = VideoInfo::from_caps(caps).map_err(|e| {
                    error!(frame = frame_num, error = ?e, "Failed to get video info");
                    gstreamer::FlowError::Error
                })?;
                let map = buffer.map_readable().map_err(|_| gstreamer::FlowError::Error)?;

                let frame = CameraFrame {
                    width: video_info.width(),
                    height: video_info.height(),
                    data: Arc::from(map.as_slice()),
                    stride: video_info.stride()[0] as u32,
                    captured_at: Instant::now(),
                };

                if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                    debug!(
                        frame = frame_num,
                        width = frame.width,
                        height = frame.height,
                        stride = frame.stride,
                        "Preview frame"
                    );
                }

                *latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame);
                Ok(gstreamer::FlowSuccess::Ok)
            })
            .build(),
    );
}

impl CameraBackend for GStreamerCamera {
    fn name(&self) -> &str {
        &self.name
    }

    fn latest_frame(&self) -> Option<CameraFrame> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn capture_photo(&mut self) -> BackendResult<CameraFrame> {
        if !self.is_warmed_up() {
            debug!(device = %self.name, "Capture requested during camera warm-up");
            return Err(BackendError::NoFrameAvailable);
        }
        let frame = self.latest_frame().ok_or(BackendError::NoFrameAvailable)?;
        debug!(
            width = frame.width,
            height = frame.height,
            age_ms = frame.captured_at.elapsed().as_millis() as u64,
            "Captured frame"
        );
        Ok(frame)
    }

    fn pause_preview(&mut self) -> BackendResult<()> {
        if self.paused {
            return Ok(());
        }
        self.set_state(gstreamer::State::Paused)?;
        self.paused = true;
        debug!(device = %self.name, "Preview paused");
        Ok(())
    }

    fn resume_preview(&mut self) -> BackendResult<()> {
        if !self.paused {
            return Ok(());
        }
        self.set_state(gstreamer::State::Playing)?;
        self.paused = false;
        debug!(device = %self.name, "Preview resumed");
        Ok(())
    }

    fn is_preview_paused(&self) -> bool {
        self.paused
    }
}

impl Drop for GStreamerCamera {
    fn drop(&mut self) {
        info!(device = %self.name, "Stopping camera pipeline");
        // Clear callbacks first so the frame slot is released
        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
        let _ = self.pipeline.set_state(gstreamer::State::Null);
        let (result, state, _) = self.pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::STOP_TIMEOUT_SECS,
        ));
        if let Err(e) = result {
            debug!(error = ?e, state = ?state, "Pipeline state change had issues");
        }
    }
}
