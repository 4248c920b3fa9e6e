// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! `update()` is the only place the UI state changes. It never performs I/O:
//! work that has to happen outside the model is returned as a [`Task`].

use crate::app::state::{AppModel, Message, Task, UiState};
use crate::errors::AppError;
use crate::inference::InferenceResult;
use tracing::{debug, error, info};
use uuid::Uuid;

impl AppModel {
    /// Main message handler
    pub fn update(&mut self, message: Message) -> Task {
        match message {
            Message::TakePicture => self.handle_take_picture(),
            Message::ToggleOverlay => self.handle_toggle_overlay(),
            Message::AnalysisFinished { capture_id, result } => {
                self.handle_analysis_finished(capture_id, result)
            }
        }
    }

    fn handle_take_picture(&mut self) -> Task {
        if !self.state.can_capture() {
            debug!(state = ?self.state, "Ignoring capture request");
            return Task::None;
        }

        let capture_id = Uuid::new_v4();
        info!(%capture_id, "Taking picture");
        self.state = UiState::Uploading;
        self.pending_capture = Some(capture_id);
        Task::CaptureAndAnalyze { capture_id }
    }

    fn handle_toggle_overlay(&mut self) -> Task {
        self.state = match self.state {
            UiState::Idle => UiState::ResultShown,
            UiState::ResultShown => UiState::Idle,
            UiState::Uploading => {
                debug!("Ignoring overlay toggle while uploading");
                UiState::Uploading
            }
        };
        Task::None
    }

    fn handle_analysis_finished(
        &mut self,
        capture_id: Uuid,
        result: Result<InferenceResult, AppError>,
    ) -> Task {
        if self.pending_capture != Some(capture_id) {
            debug!(%capture_id, "Ignoring result of a stale capture");
            return Task::None;
        }
        self.pending_capture = None;

        match result {
            Ok(answer) => {
                info!(%capture_id, answer = %answer.answer_text(), "Showing result");
                self.result = Some(answer);
                self.state = UiState::ResultShown;
            }
            Err(e) => {
                // Loading stops, the previous answer stays
                error!(%capture_id, error = %e, "Failed to analyze picture");
                self.state = UiState::Idle;
            }
        }
        Task::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{CaptureError, NetworkError};

    fn start_capture(model: &mut AppModel) -> Uuid {
        match model.update(Message::TakePicture) {
            Task::CaptureAndAnalyze { capture_id } => capture_id,
            Task::None => panic!("capture was not started"),
        }
    }

    #[test]
    fn test_successful_capture_shows_result() {
        let mut model = AppModel::new();
        let capture_id = start_capture(&mut model);
        assert_eq!(model.state(), UiState::Uploading);

        model.update(Message::AnalysisFinished {
            capture_id,
            result: Ok(InferenceResult::new("cat")),
        });
        assert_eq!(model.state(), UiState::ResultShown);
        assert_eq!(model.overlay_text(), "cat");
    }

    #[test]
    fn test_failed_upload_returns_to_idle_and_keeps_answer() {
        let mut model = AppModel::new();
        let first = start_capture(&mut model);
        model.update(Message::AnalysisFinished {
            capture_id: first,
            result: Ok(InferenceResult::new("cat")),
        });
        model.update(Message::ToggleOverlay);
        assert_eq!(model.state(), UiState::Idle);

        let second = start_capture(&mut model);
        model.update(Message::AnalysisFinished {
            capture_id: second,
            result: Err(NetworkError::Transport("connection reset".into()).into()),
        });
        assert_eq!(model.state(), UiState::Idle);
        assert_eq!(model.overlay_text(), "cat");
    }

    #[test]
    fn test_toggle_keeps_answer() {
        let mut model = AppModel::new();
        let capture_id = start_capture(&mut model);
        model.update(Message::AnalysisFinished {
            capture_id,
            result: Ok(InferenceResult::new("a red bicycle")),
        });

        model.update(Message::ToggleOverlay);
        assert_eq!(model.state(), UiState::Idle);
        assert_eq!(model.overlay_text(), "a red bicycle");

        model.update(Message::ToggleOverlay);
        assert_eq!(model.state(), UiState::ResultShown);
        assert_eq!(model.overlay_text(), "a red bicycle");
    }

    #[test]
    fn test_capture_ignored_unless_idle() {
        let mut model = AppModel::new();
        start_capture(&mut model);
        assert_eq!(model.update(Message::TakePicture), Task::None);

        let mut model = AppModel::new();
        model.update(Message::ToggleOverlay);
        assert_eq!(model.state(), UiState::ResultShown);
        assert_eq!(model.update(Message::TakePicture), Task::None);
    }

    #[test]
    fn test_toggle_ignored_while_uploading() {
        let mut model = AppModel::new();
        start_capture(&mut model);
        model.update(Message::ToggleOverlay);
        assert_eq!(model.state(), UiState::Uploading);
    }

    #[test]
    fn test_capture_unavailable_returns_to_idle() {
        let mut model = AppModel::new();
        let capture_id = start_capture(&mut model);
        model.update(Message::AnalysisFinished {
            capture_id,
            result: Err(CaptureError::CaptureUnavailable.into()),
        });
        assert_eq!(model.state(), UiState::Idle);
        assert!(model.result().is_none());
    }

    #[test]
    fn test_stale_result_ignored() {
        let mut model = AppModel::new();
        start_capture(&mut model);
        model.update(Message::AnalysisFinished {
            capture_id: Uuid::new_v4(),
            result: Ok(InferenceResult::new("dog")),
        });
        assert_eq!(model.state(), UiState::Uploading);
        assert!(model.result().is_none());
    }
}
