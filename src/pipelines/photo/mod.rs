// SPDX-License-Identifier: GPL-3.0-only

//! Capture-then-analyze photo pipeline
//!
//! ```text
//! Camera Backend → Capture → Encoding → (preview paused) Upload → Answer
//!                                                  ↓
//!                                   preview resumed, success or not
//! ```

pub mod capture;
pub mod encoding;

pub use capture::{CaptureController, CaptureOptions, CapturedFrame, PreviewPause};
pub use encoding::PhotoEncoder;

use crate::errors::AppResult;
use crate::inference::{InferenceClient, InferenceResult};
use tracing::{debug, info};

/// Complete photo pipeline: one picture in, one answer out
pub struct AnalysisPipeline {
    controller: CaptureController,
    client: InferenceClient,
    options: CaptureOptions,
}

impl AnalysisPipeline {
    pub fn new(
        controller: CaptureController,
        client: InferenceClient,
        options: CaptureOptions,
    ) -> Self {
        Self {
            controller,
            client,
            options,
        }
    }

    pub fn controller(&self) -> &CaptureController {
        &self.controller
    }

    pub fn client(&self) -> &InferenceClient {
        &self.client
    }

    /// Capture a frame and ask the inference service about it
    ///
    /// Capture failures return before anything is sent. The preview is paused
    /// for the upload and resumed exactly once whatever its outcome.
    pub async fn take_picture(&self) -> AppResult<InferenceResult> {
        let frame = self.controller.capture(self.options).await?;
        debug!(payload_len = frame.payload().len(), "Picture encoded");

        let _paused = self.controller.preview_paused();
        let result = self.client.analyze(frame).await?;

        info!(answer = %result.answer_text(), "Picture analyzed");
        Ok(result)
    }
}
