// SPDX-License-Identifier: GPL-3.0-only

//! Async photo encoding
//!
//! Turns a captured RGBA frame into the text payload the inference service
//! expects: JPEG at the requested quality, then standard base64.

use super::capture::{CaptureOptions, CapturedFrame};
use crate::backends::camera::types::CameraFrame;
use crate::constants::jpeg;
use crate::errors::CaptureError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use tracing::{debug, info};

/// Photo encoder
pub struct PhotoEncoder {
    options: CaptureOptions,
}

impl PhotoEncoder {
    pub fn new(options: CaptureOptions) -> Self {
        Self { options }
    }

    /// JPEG quality derived from the capture options
    pub fn jpeg_quality(&self) -> u8 {
        jpeg::quality_from_fraction(self.options.quality())
    }

    /// Encode a frame asynchronously
    ///
    /// The encoding runs in a blocking task (CPU-bound). The frame is consumed.
    pub async fn encode(&self, frame: CameraFrame) -> Result<CapturedFrame, CaptureError> {
        let width = frame.width;
        let height = frame.height;

        if !self.options.encode_as_text() {
            debug!("Text encoding disabled, sending empty payload");
            return Ok(CapturedFrame::new(String::new(), width, height));
        }

        info!(width, height, quality = self.jpeg_quality(), "Starting encoding");

        let quality = self.jpeg_quality();
        let payload = tokio::task::spawn_blocking(move || {
            let jpeg = Self::encode_jpeg(&frame, quality)?;
            debug!(size = jpeg.len(), "JPEG encoding complete");
            Ok::<_, CaptureError>(STANDARD.encode(jpeg))
        })
        .await
        .map_err(|e| CaptureError::EncodingFailed(format!("Encoding task error: {}", e)))??;

        Ok(CapturedFrame::new(payload, width, height))
    }

    /// Encode an RGBA frame to JPEG bytes
    fn encode_jpeg(frame: &CameraFrame, quality: u8) -> Result<Vec<u8>, CaptureError> {
        if frame.width == 0 || frame.height == 0 {
            return Err(CaptureError::EncodingFailed("Empty frame".to_string()));
        }

        let rgb = RgbImage::from_raw(frame.width, frame.height, frame.to_rgb_bytes())
            .ok_or_else(|| CaptureError::EncodingFailed("Frame buffer too small".to_string()))?;

        let mut output = Vec::new();
        JpegEncoder::new_with_quality(&mut output, quality).encode_image(&rgb)?;
        Ok(output)
    }
}
