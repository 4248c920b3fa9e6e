// SPDX-License-Identifier: GPL-3.0-only

//! Photo capture
//!
//! The [`CaptureController`] owns the (optional) camera handle. It freezes a
//! frame, encodes it and controls the live preview around the upload.

use super::encoding::PhotoEncoder;
use crate::backends::camera::{self, BackendError, CameraBackend, CameraFrame, SharedCamera};
use crate::constants::DEFAULT_CAPTURE_QUALITY;
use crate::errors::CaptureError;
use tracing::{debug, info, warn};

/// Per-capture settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    quality: f32,
    encode_as_text: bool,
}

impl CaptureOptions {
    /// Quality is clamped to [0, 1] (NaN becomes 0)
    pub fn new(quality: f32, encode_as_text: bool) -> Self {
        let quality = if quality.is_nan() {
            0.0
        } else {
            quality.clamp(0.0, 1.0)
        };
        Self {
            quality,
            encode_as_text,
        }
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    pub fn encode_as_text(&self) -> bool {
        self.encode_as_text
    }
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self::new(DEFAULT_CAPTURE_QUALITY, true)
    }
}

/// An encoded photo waiting to be uploaded
///
/// Not `Clone`: the upload consumes it, so no copy outlives the attempt.
#[derive(Debug)]
pub struct CapturedFrame {
    encoded_payload: String,
    width: u32,
    height: u32,
}

impl CapturedFrame {
    pub(crate) fn new(encoded_payload: String, width: u32, height: u32) -> Self {
        Self {
            encoded_payload,
            width,
            height,
        }
    }

    /// Wrap an already encoded payload (dimensions unknown)
    pub fn from_encoded(payload: impl Into<String>) -> Self {
        Self::new(payload.into(), 0, 0)
    }

    pub fn payload(&self) -> &str {
        &self.encoded_payload
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn into_payload(self) -> String {
        self.encoded_payload
    }
}

/// Drives capture and preview for the attached camera
#[derive(Clone, Default)]
pub struct CaptureController {
    camera: Option<SharedCamera>,
}

impl CaptureController {
    /// Controller without a camera; capture fails until one is attached
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_camera(backend: Box<dyn CameraBackend>) -> Self {
        let mut controller = Self::new();
        controller.attach(backend);
        controller
    }

    /// Attach a camera, replacing any previous one
    pub fn attach(&mut self, backend: Box<dyn CameraBackend>) {
        info!(camera = %backend.name(), "Camera attached");
        self.camera = Some(camera::share(backend));
    }

    /// Detach the camera; returns whether one was attached
    pub fn detach(&mut self) -> bool {
        self.camera.take().is_some()
    }

    pub fn is_attached(&self) -> bool {
        self.camera.is_some()
    }

    pub fn camera_name(&self) -> Option<String> {
        self.camera
            .as_ref()
            .map(|cam| camera::lock(cam).name().to_string())
    }

    /// Latest preview frame for rendering
    pub fn preview_frame(&self) -> Option<CameraFrame> {
        self.camera
            .as_ref()
            .and_then(|cam| camera::lock(cam).latest_frame())
    }

    pub fn is_preview_paused(&self) -> bool {
        self.camera
            .as_ref()
            .is_some_and(|cam| camera::lock(cam).is_preview_paused())
    }

    /// Freeze and encode one frame
    ///
    /// Fails with [`CaptureError::CaptureUnavailable`] when no camera is
    /// attached or the camera has not produced a frame yet. No retry.
    pub async fn capture(&self, options: CaptureOptions) -> Result<CapturedFrame, CaptureError> {
        let Some(handle) = self.camera.clone() else {
            warn!("Capture requested without an attached camera");
            return Err(CaptureError::CaptureUnavailable);
        };

        // Backends may block on the device, keep that off the async workers
        let frame = tokio::task::spawn_blocking(move || camera::lock(&handle).capture_photo())
            .await
            .map_err(|e| CaptureError::CaptureFailed(format!("Capture task error: {}", e)))?
            .map_err(|e| match e {
                BackendError::NoFrameAvailable | BackendError::NotAvailable(_) => {
                    CaptureError::CaptureUnavailable
                }
                other => CaptureError::CaptureFailed(other.to_string()),
            })?;

        debug!(width = frame.width, height = frame.height, "Frame captured");
        PhotoEncoder::new(options).encode(frame).await
    }

    /// Pause the live preview (no-op without a camera)
    pub fn pause_preview(&self) {
        if let Some(cam) = &self.camera
            && let Err(e) = camera::lock(cam).pause_preview()
        {
            warn!(error = %e, "Failed to pause preview");
        }
    }

    /// Resume the live preview (no-op without a camera)
    pub fn resume_preview(&self) {
        if let Some(cam) = &self.camera
            && let Err(e) = camera::lock(cam).resume_preview()
        {
            warn!(error = %e, "Failed to resume preview");
        }
    }

    /// Pause the preview until the returned guard is dropped
    pub fn preview_paused(&self) -> PreviewPause<'_> {
        self.pause_preview();
        PreviewPause { controller: self }
    }
}

/// Keeps the preview paused; resumes it exactly once on drop
#[must_use = "the preview resumes as soon as the guard is dropped"]
pub struct PreviewPause<'a> {
    controller: &'a CaptureController,
}

impl Drop for PreviewPause<'_> {
    fn drop(&mut self) {
        self.controller.resume_preview();
    }
}
