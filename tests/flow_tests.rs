// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the capture → upload → overlay flow
//!
//! A local axum server stands in for the inference endpoint.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use camera_ask::backends::camera::{BackendError, BackendResult, CameraBackend, CameraFrame};
use camera_ask::constants::NO_RESULT_TEXT;
use camera_ask::{
    AnalysisPipeline, AppError, AppRuntime, CaptureController, CaptureError, CaptureOptions,
    CapturedFrame, InferenceClient, Message, NetworkError, UiState,
};
use image::{Rgba, RgbaImage};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Clone)]
struct MockEndpoint {
    status: StatusCode,
    reply: Value,
    requests: Arc<Mutex<Vec<Value>>>,
}

async fn analyze(
    State(endpoint): State<MockEndpoint>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    endpoint.requests.lock().unwrap().push(body);
    (endpoint.status, Json(endpoint.reply.clone()))
}

/// Start a mock endpoint; returns its URL and the recorded request bodies
async fn spawn_endpoint(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Value>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockEndpoint {
        status,
        reply,
        requests: Arc::clone(&requests),
    };
    let app = Router::new()
        .route("/dev-tech-assessment", post(analyze))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/dev-tech-assessment", addr), requests)
}

/// Camera that counts preview pause/resume calls
struct CountingCamera {
    frame: Option<CameraFrame>,
    pauses: Arc<AtomicUsize>,
    resumes: Arc<AtomicUsize>,
    paused: bool,
}

#[derive(Clone, Default)]
struct Counters {
    pauses: Arc<AtomicUsize>,
    resumes: Arc<AtomicUsize>,
}

impl Counters {
    fn pauses(&self) -> usize {
        self.pauses.load(Ordering::SeqCst)
    }

    fn resumes(&self) -> usize {
        self.resumes.load(Ordering::SeqCst)
    }
}

fn counting_camera(with_frame: bool) -> (Box<dyn CameraBackend>, Counters) {
    let counters = Counters::default();
    let frame = with_frame.then(|| {
        CameraFrame::from_rgba_image(RgbaImage::from_pixel(32, 24, Rgba([40, 120, 200, 255])))
    });
    let camera = CountingCamera {
        frame,
        pauses: Arc::clone(&counters.pauses),
        resumes: Arc::clone(&counters.resumes),
        paused: false,
    };
    (Box::new(camera), counters)
}

impl CameraBackend for CountingCamera {
    fn name(&self) -> &str {
        "counting"
    }

    fn latest_frame(&self) -> Option<CameraFrame> {
        self.frame.clone()
    }

    fn capture_photo(&mut self) -> BackendResult<CameraFrame> {
        self.frame.clone().ok_or(BackendError::NoFrameAvailable)
    }

    fn pause_preview(&mut self) -> BackendResult<()> {
        self.pauses.fetch_add(1, Ordering::SeqCst);
        self.paused = true;
        Ok(())
    }

    fn resume_preview(&mut self) -> BackendResult<()> {
        self.resumes.fetch_add(1, Ordering::SeqCst);
        self.paused = false;
        Ok(())
    }

    fn is_preview_paused(&self) -> bool {
        self.paused
    }
}

fn runtime_for(controller: CaptureController, url: &str) -> AppRuntime {
    let client = InferenceClient::new(url, None).unwrap();
    AppRuntime::new(AnalysisPipeline::new(
        controller,
        client,
        CaptureOptions::default(),
    ))
}

#[tokio::test]
async fn test_successful_capture_shows_answer() {
    let (url, requests) = spawn_endpoint(StatusCode::OK, json!({ "answer": "cat" })).await;
    let (camera, counters) = counting_camera(true);
    let mut runtime = runtime_for(CaptureController::with_camera(camera), &url);
    let views = runtime.subscribe();

    assert_eq!(views.borrow().state, UiState::Idle);

    runtime.dispatch(Message::TakePicture);
    assert_eq!(views.borrow().state, UiState::Uploading);

    runtime.process_next().await;
    let view = views.borrow().clone();
    assert_eq!(view.state, UiState::ResultShown);
    assert_eq!(view.overlay_text, "cat");
    assert!(view.answered_at.is_some());

    // The upload carried a base64 JPEG of the frame
    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let payload = requests[0]["image_b64"].as_str().unwrap();
    let jpeg = STANDARD.decode(payload).unwrap();
    let decoded = image::load_from_memory(&jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (32, 24));

    assert_eq!(counters.pauses(), 1);
    assert_eq!(counters.resumes(), 1);
}

#[tokio::test]
async fn test_failed_upload_returns_to_idle_and_resumes_once() {
    let (url, requests) = spawn_endpoint(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "model offline" }),
    )
    .await;
    let (camera, counters) = counting_camera(true);
    let mut runtime = runtime_for(CaptureController::with_camera(camera), &url);
    let views = runtime.subscribe();

    runtime.dispatch(Message::TakePicture);
    assert_eq!(views.borrow().state, UiState::Uploading);
    runtime.process_next().await;

    let view = views.borrow().clone();
    assert_eq!(view.state, UiState::Idle);
    assert!(!view.state.overlay_visible());
    assert_eq!(view.overlay_text, NO_RESULT_TEXT);
    assert_eq!(requests.lock().unwrap().len(), 1);

    assert_eq!(counters.pauses(), 1);
    assert_eq!(counters.resumes(), 1);
    assert!(!runtime.pipeline().controller().is_preview_paused());
}

#[tokio::test]
async fn test_toggle_flips_visibility_and_keeps_text() {
    let (url, _) = spawn_endpoint(StatusCode::OK, json!({ "answer": "a tabby cat" })).await;
    let (camera, _) = counting_camera(true);
    let mut runtime = runtime_for(CaptureController::with_camera(camera), &url);
    let views = runtime.subscribe();

    runtime.dispatch(Message::TakePicture);
    runtime.process_next().await;
    assert_eq!(views.borrow().state, UiState::ResultShown);

    runtime.dispatch(Message::ToggleOverlay);
    assert_eq!(views.borrow().state, UiState::Idle);
    assert_eq!(views.borrow().overlay_text, "a tabby cat");

    runtime.dispatch(Message::ToggleOverlay);
    assert_eq!(views.borrow().state, UiState::ResultShown);
    assert_eq!(views.borrow().overlay_text, "a tabby cat");
}

#[tokio::test]
async fn test_capture_without_camera_makes_no_request() {
    let (url, requests) = spawn_endpoint(StatusCode::OK, json!({ "answer": "cat" })).await;
    let client = InferenceClient::new(&url, None).unwrap();
    let pipeline = AnalysisPipeline::new(
        CaptureController::new(),
        client,
        CaptureOptions::default(),
    );

    let result = pipeline.take_picture().await;
    assert_eq!(
        result.unwrap_err(),
        AppError::Capture(CaptureError::CaptureUnavailable)
    );
    assert!(requests.lock().unwrap().is_empty());

    // Through the message loop the state falls back to idle
    let mut runtime = AppRuntime::new(pipeline);
    runtime.dispatch(Message::TakePicture);
    runtime.process_next().await;
    assert_eq!(runtime.model().state(), UiState::Idle);
    assert!(requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_camera_without_frame_is_unavailable() {
    let (url, requests) = spawn_endpoint(StatusCode::OK, json!({ "answer": "cat" })).await;
    let (camera, counters) = counting_camera(false);
    let client = InferenceClient::new(&url, None).unwrap();
    let pipeline = AnalysisPipeline::new(
        CaptureController::with_camera(camera),
        client,
        CaptureOptions::default(),
    );

    let result = pipeline.take_picture().await;
    assert_eq!(
        result.unwrap_err(),
        AppError::Capture(CaptureError::CaptureUnavailable)
    );
    assert!(requests.lock().unwrap().is_empty());
    // Preview is only paused around an upload
    assert_eq!(counters.pauses(), 0);
    assert_eq!(counters.resumes(), 0);
}

#[tokio::test]
async fn test_wire_example() {
    let (url, requests) = spawn_endpoint(StatusCode::OK, json!({ "answer": "cat" })).await;
    let client = InferenceClient::new(&url, None).unwrap();
    assert_eq!(client.endpoint(), url);

    let result = client
        .analyze(CapturedFrame::from_encoded("abc123"))
        .await
        .unwrap();
    assert_eq!(result.answer_text(), "cat");
    assert_eq!(
        requests.lock().unwrap().as_slice(),
        &[json!({ "image_b64": "abc123" })]
    );
}

#[tokio::test]
async fn test_malformed_answer_is_network_error() {
    let (url, _) = spawn_endpoint(StatusCode::OK, json!({ "label": "cat" })).await;
    let client = InferenceClient::new(&url, None).unwrap();

    let result = client.analyze(CapturedFrame::from_encoded("abc123")).await;
    assert!(matches!(result, Err(NetworkError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_status_error_carries_code() {
    let (url, _) = spawn_endpoint(StatusCode::BAD_REQUEST, json!({ "error": "bad image" })).await;
    let client = InferenceClient::new(&url, None).unwrap();

    match client.analyze(CapturedFrame::from_encoded("")).await {
        Err(NetworkError::Status { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("bad image"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_request_timeout_fails_slow_endpoint() {
    async fn slow_analyze() -> Json<Value> {
        tokio::time::sleep(Duration::from_secs(3)).await;
        Json(json!({ "answer": "too late" }))
    }

    let app = Router::new().route("/dev-tech-assessment", post(slow_analyze));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let url = format!("http://{}/dev-tech-assessment", addr);
    let client = InferenceClient::new(&url, Some(Duration::from_secs(1))).unwrap();

    let started = Instant::now();
    let result = client.analyze(CapturedFrame::from_encoded("abc123")).await;

    assert!(
        matches!(result, Err(NetworkError::Transport(_))),
        "unexpected result: {:?}",
        result
    );
    assert!(started.elapsed() < Duration::from_secs(3));
}
