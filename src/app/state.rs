// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::constants::NO_RESULT_TEXT;
use crate::errors::AppError;
use crate::inference::InferenceResult;
use chrono::{DateTime, Local};
use uuid::Uuid;

/// UI state machine
///
/// ```text
///            TakePicture              Ok(answer)
///   Idle ───────────────▶ Uploading ─────────────▶ ResultShown
///    ▲  ◀──────────────────── │ Err                    │
///    └─────────────────── ToggleOverlay ◀──────────────┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UiState {
    /// Live preview with the capture and toggle controls
    #[default]
    Idle,
    /// A picture is being captured and uploaded
    Uploading,
    /// The answer overlay covers the preview
    ResultShown,
}

impl UiState {
    pub fn is_loading(&self) -> bool {
        matches!(self, UiState::Uploading)
    }

    pub fn overlay_visible(&self) -> bool {
        matches!(self, UiState::ResultShown)
    }

    /// The capture control is only offered with the overlay hidden
    pub fn can_capture(&self) -> bool {
        matches!(self, UiState::Idle)
    }

    /// The toggle is hidden while loading
    pub fn can_toggle(&self) -> bool {
        !self.is_loading()
    }
}

/// Messages driving the state machine
#[derive(Debug, Clone)]
pub enum Message {
    /// User pressed "Take Picture"
    TakePicture,
    /// User pressed "Show Result" / "Hide Result"
    ToggleOverlay,
    /// Background capture and upload finished
    AnalysisFinished {
        capture_id: Uuid,
        result: Result<InferenceResult, AppError>,
    },
}

/// Side effect requested by an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    None,
    /// Capture a frame, upload it and report back with `AnalysisFinished`
    CaptureAndAnalyze { capture_id: Uuid },
}

/// The application model
#[derive(Debug, Default)]
pub struct AppModel {
    pub(crate) state: UiState,
    /// Last successful answer; replaced, never accumulated
    pub(crate) result: Option<InferenceResult>,
    /// Capture currently in flight
    pub(crate) pending_capture: Option<Uuid>,
}

impl AppModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn result(&self) -> Option<&InferenceResult> {
        self.result.as_ref()
    }

    /// Text for the overlay panel
    pub fn overlay_text(&self) -> &str {
        self.result
            .as_ref()
            .map(InferenceResult::answer_text)
            .unwrap_or(NO_RESULT_TEXT)
    }

    /// Snapshot for renderers
    pub fn view_state(&self) -> ViewState {
        ViewState {
            state: self.state,
            overlay_text: self.overlay_text().to_string(),
            answered_at: self.result.as_ref().map(InferenceResult::received_at),
        }
    }
}

/// What a renderer needs to draw one frame of UI
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub state: UiState,
    pub overlay_text: String,
    pub answered_at: Option<DateTime<Local>>,
}

impl ViewState {
    /// Label of the overlay toggle, `None` while it is hidden
    pub fn toggle_label(&self) -> Option<&'static str> {
        match self.state {
            UiState::Uploading => None,
            UiState::ResultShown => Some("Hide Result"),
            UiState::Idle => Some("Show Result"),
        }
    }
}
