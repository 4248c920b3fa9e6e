// SPDX-License-Identifier: GPL-3.0-only

//! camera-ask - point the camera at something and ask what it is
//!
//! Captures a photo, uploads it to an image inference endpoint and shows the
//! returned text as an overlay on top of the live preview.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: UI state machine and message loop
//! - [`backends`]: Camera backend abstraction (GStreamer, still image)
//! - [`pipelines`]: Capture, encoding and the capture-then-analyze pipeline
//! - [`inference`]: HTTP client for the inference endpoint
//! - [`terminal`]: Terminal user interface
//! - [`config`]: User configuration handling

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod inference;
pub mod pipelines;
pub mod terminal;

// Re-export commonly used types
pub use app::{AppModel, AppRuntime, Message, UiState, ViewState};
pub use config::{Config, ConfigOverrides};
pub use errors::{AppError, AppResult, CaptureError, NetworkError};
pub use inference::{InferenceClient, InferenceResult};
pub use pipelines::photo::{AnalysisPipeline, CaptureController, CaptureOptions, CapturedFrame};
