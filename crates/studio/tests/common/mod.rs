//! In-process stand-in for the generation service.
//!
//! Serves the four endpoints on an ephemeral port and records every request
//! it receives, in arrival order. Behaviour is steered by the request
//! content:
//!
//! * a prompt containing `fail` gets a 500 with a JSON `detail`;
//! * a prompt containing `opaque` gets a 502 with a plain-text body;
//! * a clip whose bytes contain `broken` fails to upload;
//! * a stitch list containing `missing` gets a 404.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use reelsmith_studio::api::StudioApi;
use reelsmith_studio::session::Session;

/// One request seen by the stand-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Status,
    Generate(String),
    Upload { file_name: String, content: String },
    Stitch(Vec<String>),
}

#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
    uploads_seen: Arc<AtomicUsize>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Upload { file_name, content } => Some((file_name, content)),
                _ => None,
            })
            .collect()
    }

    pub fn stitches(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Stitch(paths) => Some(paths),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub struct StandIn {
    pub url: String,
    pub recorder: Recorder,
}

impl StandIn {
    pub fn api(&self) -> StudioApi {
        StudioApi::new(self.url.clone())
    }

    pub fn session(&self, download_dir: &std::path::Path) -> Session<StudioApi> {
        Session::new(self.api(), download_dir)
    }
}

/// Start the stand-in service on `127.0.0.1:0`.
pub async fn spawn_service() -> StandIn {
    let recorder = Recorder::default();

    let app = Router::new()
        .route("/", get(status))
        .route("/generate-scene/", post(generate_scene))
        .route("/upload-clip/", post(upload_clip))
        .route("/stitch-story/", post(stitch_story))
        .with_state(recorder.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StandIn {
        url: format!("http://{addr}"),
        recorder,
    }
}

/// Bytes the stand-in returns for a generated scene.
pub fn scene_bytes(prompt: &str) -> String {
    format!("video:{prompt}")
}

/// Server-side path the stand-in assigns to an uploaded clip.
pub fn clip_path(content: &str) -> String {
    format!("/srv/clips/{content}")
}

// ---- handlers ----

#[derive(Deserialize)]
struct GenerateBody {
    prompt: String,
}

#[derive(Deserialize)]
struct StitchBody {
    file_paths: Vec<String>,
}

async fn status(State(recorder): State<Recorder>) -> Json<serde_json::Value> {
    recorder.record(Call::Status);
    Json(json!({ "status": "ok" }))
}

async fn generate_scene(
    State(recorder): State<Recorder>,
    Json(body): Json<GenerateBody>,
) -> Response {
    recorder.record(Call::Generate(body.prompt.clone()));

    if body.prompt.contains("fail") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": format!("Manim rendering failed: {}", body.prompt) })),
        )
            .into_response();
    }
    if body.prompt.contains("opaque") {
        return (StatusCode::BAD_GATEWAY, "upstream exploded").into_response();
    }

    (
        [
            (header::CONTENT_TYPE, "video/mp4"),
            (header::CONTENT_DISPOSITION, r#"attachment; filename="animation.mp4""#),
        ],
        scene_bytes(&body.prompt),
    )
        .into_response()
}

async fn upload_clip(State(recorder): State<Recorder>, mut multipart: Multipart) -> Response {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.unwrap();
        upload = Some((file_name, String::from_utf8_lossy(&data).into_owned()));
    }
    let Some((file_name, content)) = upload else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": [{ "loc": ["body", "file"], "msg": "field required" }] })),
        )
            .into_response();
    };

    recorder.record(Call::Upload {
        file_name,
        content: content.clone(),
    });

    // Hold the first upload back so responses complete out of order.
    if recorder.uploads_seen.fetch_add(1, Ordering::SeqCst) == 0 {
        tokio::time::sleep(Duration::from_millis(150)).await;
    }

    if content.contains("broken") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "Failed to save uploaded clip." })),
        )
            .into_response();
    }

    Json(json!({ "file_path": clip_path(&content) })).into_response()
}

async fn stitch_story(State(recorder): State<Recorder>, Json(body): Json<StitchBody>) -> Response {
    recorder.record(Call::Stitch(body.file_paths.clone()));

    if body.file_paths.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "No clips provided for stitching." })),
        )
            .into_response();
    }
    if let Some(missing) = body.file_paths.iter().find(|p| p.contains("missing")) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": format!("Clip not found: {missing}") })),
        )
            .into_response();
    }

    (
        [
            (header::CONTENT_TYPE, "video/mp4"),
            (header::CONTENT_DISPOSITION, r#"attachment; filename="final_story.mp4""#),
        ],
        body.file_paths.join("|"),
    )
        .into_response()
}
