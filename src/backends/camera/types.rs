// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for camera backends

use image::RgbaImage;
use std::sync::Arc;
use std::time::Instant;

/// Represents a camera device found by enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    /// Human readable name (e.g., "Integrated Camera")
    pub name: String,
    /// Device class reported by the monitor (e.g., "Video/Source")
    pub device_class: String,
    /// Position in the enumeration order, used as the CLI camera index
    pub index: usize,
}

/// A single RGBA preview frame
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixels, `stride` bytes per row
    pub data: Arc<[u8]>,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// When the frame left the camera pipeline
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Wrap a decoded RGBA image as a frame
    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: Arc::from(image.into_raw().into_boxed_slice()),
            stride: width * 4,
            captured_at: Instant::now(),
        }
    }

    /// RGB value at (x, y), clamped to the frame bounds
    pub fn pixel_rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        if self.width == 0 || self.height == 0 {
            return (0, 0, 0);
        }
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let idx = (y * self.stride + x * 4) as usize;
        if idx + 2 < self.data.len() {
            (self.data[idx], self.data[idx + 1], self.data[idx + 2])
        } else {
            (0, 0, 0)
        }
    }

    /// Copy into a tightly packed RGB buffer, dropping alpha and row padding
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let row_bytes = (self.width * 4) as usize;
        let mut rgb = Vec::with_capacity((self.width * self.height * 3) as usize);
        for y in 0..self.height as usize {
            let start = y * self.stride as usize;
            let Some(row) = self.data.get(start..start + row_bytes) else {
                break;
            };
            for px in row.chunks_exact(4) {
                rgb.extend_from_slice(&px[..3]);
            }
        }
        rgb
    }
}

/// Backend error type
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Backend is not available on this system
    NotAvailable(String),
    /// Failed to initialize backend
    InitializationFailed(String),
    /// Camera device not found
    DeviceNotFound(String),
    /// Camera has not delivered a frame yet
    NoFrameAvailable,
    /// Pipeline state change failed
    StateChange(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::NotAvailable(msg) => write!(f, "Backend not available: {}", msg),
            BackendError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            BackendError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            BackendError::NoFrameAvailable => write!(f, "No frame available"),
            BackendError::StateChange(msg) => write!(f, "State change failed: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;
