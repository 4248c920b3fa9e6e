// SPDX-License-Identifier: GPL-3.0-only

//! Message loop
//!
//! The runtime owns the model, runs the tasks `update()` asks for on the tokio
//! runtime, and publishes a [`ViewState`] after every message so renderers
//! can subscribe instead of polling the model.

use crate::app::state::{AppModel, Message, Task, ViewState};
use crate::backends::camera::CameraFrame;
use crate::pipelines::photo::AnalysisPipeline;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::debug;

pub struct AppRuntime {
    model: AppModel,
    pipeline: Arc<AnalysisPipeline>,
    sender: mpsc::UnboundedSender<Message>,
    receiver: mpsc::UnboundedReceiver<Message>,
    view: watch::Sender<ViewState>,
}

impl AppRuntime {
    pub fn new(pipeline: AnalysisPipeline) -> Self {
        let model = AppModel::new();
        let (sender, receiver) = mpsc::unbounded_channel();
        let (view, _) = watch::channel(model.view_state());
        Self {
            model,
            pipeline: Arc::new(pipeline),
            sender,
            receiver,
            view,
        }
    }

    pub fn model(&self) -> &AppModel {
        &self.model
    }

    pub fn pipeline(&self) -> &AnalysisPipeline {
        &self.pipeline
    }

    /// Receive a fresh view snapshot after every processed message
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view.subscribe()
    }

    /// Latest preview frame of the attached camera
    pub fn preview_frame(&self) -> Option<CameraFrame> {
        self.pipeline.controller().preview_frame()
    }

    /// Apply a message and start whatever task it produced
    ///
    /// Must be called within a tokio runtime context.
    pub fn dispatch(&mut self, message: Message) {
        let task = self.model.update(message);
        self.view.send_replace(self.model.view_state());
        self.perform(task);
    }

    fn perform(&self, task: Task) {
        match task {
            Task::None => {}
            Task::CaptureAndAnalyze { capture_id } => {
                let pipeline = Arc::clone(&self.pipeline);
                let sender = self.sender.clone();
                tokio::spawn(async move {
                    let result = pipeline.take_picture().await;
                    // Receiver lives as long as the runtime; a send error means shutdown
                    if sender
                        .send(Message::AnalysisFinished { capture_id, result })
                        .is_err()
                    {
                        debug!(%capture_id, "Runtime gone, dropping analysis result");
                    }
                });
            }
        }
    }

    /// Wait for the next background message and apply it
    pub async fn process_next(&mut self) {
        // The runtime keeps a sender, so the channel never closes while we wait
        if let Some(message) = self.receiver.recv().await {
            self.dispatch(message);
        }
    }

    /// Apply every background message that is already waiting
    pub fn process_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(message) = self.receiver.try_recv() {
            self.dispatch(message);
            processed += 1;
        }
        processed
    }
}
