// SPDX-License-Identifier: GPL-3.0-only

//! Virtual camera serving a single still image
//!
//! Lets the capture flow run without camera hardware, e.g. to ask about a
//! photo that is already on disk.

use super::CameraBackend;
use super::types::{BackendError, BackendResult, CameraFrame};
use std::path::Path;
use tracing::{debug, info};

/// Camera that always "sees" the same image
pub struct StillImageCamera {
    name: String,
    frame: CameraFrame,
    paused: bool,
}

impl StillImageCamera {
    /// Load an image file (any format the `image` crate decodes)
    pub fn open(path: &Path) -> BackendResult<Self> {
        let image = image::open(path).map_err(|e| {
            BackendError::InitializationFailed(format!(
                "Failed to load {}: {}",
                path.display(),
                e
            ))
        })?;
        let frame = CameraFrame::from_rgba_image(image.to_rgba8());

        info!(
            path = %path.display(),
            width = frame.width,
            height = frame.height,
            "Loaded still image camera"
        );

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_frame(name, frame))
    }

    /// Serve an already decoded frame
    pub fn from_frame(name: impl Into<String>, frame: CameraFrame) -> Self {
        Self {
            name: name.into(),
            frame,
            paused: false,
        }
    }
}

impl CameraBackend for StillImageCamera {
    fn name(&self) -> &str {
        &self.name
    }

    fn latest_frame(&self) -> Option<CameraFrame> {
        Some(self.frame.clone())
    }

    fn capture_photo(&mut self) -> BackendResult<CameraFrame> {
        Ok(self.frame.clone())
    }

    fn pause_preview(&mut self) -> BackendResult<()> {
        debug!(camera = %self.name, "Preview paused");
        self.paused = true;
        Ok(())
    }

    fn resume_preview(&mut self) -> BackendResult<()> {
        debug!(camera = %self.name, "Preview resumed");
        self.paused = false;
        Ok(())
    }

    fn is_preview_paused(&self) -> bool {
        self.paused
    }
}
