// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! ```text
//! ┌─────────────────────┐
//! │  CaptureController  │  ← capture, preview pause/resume
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  CameraBackend Trait│  ← Common interface
//! └──────────┬──────────┘
//!            │
//!      ┌─────┴──────┐
//!      ▼            ▼
//! ┌─────────┐ ┌───────────┐
//! │GStreamer│ │Still image│
//! └─────────┘ └───────────┘
//! ```

pub mod live;
pub mod still_image;
pub mod types;

pub use live::{GStreamerCamera, enumerate_cameras};
pub use still_image::StillImageCamera;
pub use types::*;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Camera backend trait
///
/// Backends own a live preview stream. Capture hands out a copy of the most
/// recent frame so the preview is never blocked by encoding or upload.
pub trait CameraBackend: Send {
    /// Display name of the opened device
    fn name(&self) -> &str;

    /// Most recent preview frame, if any has arrived yet
    fn latest_frame(&self) -> Option<CameraFrame>;

    /// Freeze one frame for a photo
    ///
    /// # Returns
    /// * `Ok(CameraFrame)` - Frame captured
    /// * `Err(BackendError::NoFrameAvailable)` - Camera has not produced a frame yet
    fn capture_photo(&mut self) -> BackendResult<CameraFrame>;

    /// Stop updating the live preview
    fn pause_preview(&mut self) -> BackendResult<()>;

    /// Restart the live preview after [`CameraBackend::pause_preview`]
    fn resume_preview(&mut self) -> BackendResult<()>;

    /// Whether the preview is currently paused
    fn is_preview_paused(&self) -> bool;
}

/// Camera handle shared between the UI loop and capture tasks
pub type SharedCamera = Arc<Mutex<Box<dyn CameraBackend>>>;

/// Wrap a backend for sharing
pub fn share(camera: Box<dyn CameraBackend>) -> SharedCamera {
    Arc::new(Mutex::new(camera))
}

/// Lock a shared camera, recovering the guard if a previous holder panicked
pub fn lock(camera: &SharedCamera) -> MutexGuard<'_, Box<dyn CameraBackend>> {
    camera.lock().unwrap_or_else(PoisonError::into_inner)
}
