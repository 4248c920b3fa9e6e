// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the camera application

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Taking or encoding a picture failed
    Capture(CaptureError),
    /// Uploading a picture or reading the answer failed
    Network(NetworkError),
    /// Configuration errors
    Config(String),
    /// Generic error with message
    Other(String),
}

/// Capture errors
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureError {
    /// No camera attached yet, or it has not produced a frame
    CaptureUnavailable,
    /// The camera backend failed while grabbing a frame
    CaptureFailed(String),
    /// The frame could not be encoded
    EncodingFailed(String),
}

/// Inference upload errors
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Connection, TLS or client setup failure
    Transport(String),
    /// Server answered with a non-2xx status
    Status { status: u16, body: String },
    /// Response body was not the expected JSON
    InvalidResponse(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Network(e) => write!(f, "Network error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::CaptureUnavailable => write!(f, "Camera is not ready"),
            CaptureError::CaptureFailed(msg) => write!(f, "Capture failed: {}", msg),
            CaptureError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::Transport(msg) => write!(f, "Request failed: {}", msg),
            NetworkError::Status { status, body } if body.is_empty() => {
                write!(f, "Server returned HTTP {}", status)
            }
            NetworkError::Status { status, body } => {
                write!(f, "Server returned HTTP {}: {}", status, body)
            }
            NetworkError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CaptureError {}
impl std::error::Error for NetworkError {}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<NetworkError> for AppError {
    fn from(err: NetworkError) -> Self {
        AppError::Network(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            NetworkError::InvalidResponse(err.to_string())
        } else {
            NetworkError::Transport(err.to_string())
        }
    }
}

impl From<image::ImageError> for CaptureError {
    fn from(err: image::ImageError) -> Self {
        CaptureError::EncodingFailed(err.to_string())
    }
}
