//! REST client for the clip generation / stitching service.
//!
//! Wraps the three editor endpoints (scene generation, clip upload, story
//! stitching) plus the root status ping using [`reqwest`]. The
//! [`StudioBackend`] trait is the seam the export and session code is
//! written against.

use async_trait::async_trait;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use reelsmith_core::export::DEFAULT_STORY_FILE_NAME;
use reelsmith_core::media::{MediaBlob, DEFAULT_CONTENT_TYPE};

/// File name given to a generated scene when the service sends none.
pub const DEFAULT_SCENE_FILE_NAME: &str = "animation.mp4";

/// Multipart field name the upload endpoint expects.
pub const UPLOAD_FIELD: &str = "file";

/// HTTP client for a single service instance.
pub struct StudioApi {
    client: reqwest::Client,
    api_url: String,
}

/// Response returned by `/upload-clip/`.
#[derive(Debug, Deserialize)]
pub struct UploadClipResponse {
    /// Server-side path of the stored clip, passed back to `/stitch-story/`.
    pub file_path: String,
}

/// Response returned by the root status endpoint.
#[derive(Debug, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
}

/// JSON error body. `detail` is a string for handled errors but may be a
/// structured value (request validation), which is not surfaced.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Errors from the service REST layer.
#[derive(Debug, thiserror::Error)]
pub enum StudioApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Service error ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Service {
        /// HTTP status code.
        status: u16,
        /// Reason decoded from the error body, when the service supplied one.
        detail: Option<String>,
    },
}

impl StudioApiError {
    /// Human-readable reason for the activity log.
    ///
    /// The service's own `detail` when present, else a generic message.
    pub fn reason(&self) -> String {
        match self {
            StudioApiError::Request(err) => format!("Could not reach the service: {err}"),
            StudioApiError::Service {
                detail: Some(detail),
                ..
            } => detail.clone(),
            StudioApiError::Service {
                status,
                detail: None,
            } => format!("Request failed with status {status}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Backend seam
// ---------------------------------------------------------------------------

/// Operations the editor needs from the service.
#[async_trait]
pub trait StudioBackend: Send + Sync {
    /// Synthesize a clip from a text prompt.
    async fn generate_scene(&self, prompt: &str) -> Result<MediaBlob, StudioApiError>;

    /// Upload one clip and return its server-side path.
    async fn upload_clip(
        &self,
        file_name: &str,
        blob: &MediaBlob,
    ) -> Result<String, StudioApiError>;

    /// Concatenate previously uploaded clips, in the given order.
    async fn stitch_story(&self, file_paths: &[String]) -> Result<MediaBlob, StudioApiError>;
}

impl StudioApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://127.0.0.1:8000`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Ping the service root (`GET /`).
    pub async fn status(&self) -> Result<ServiceStatus, StudioApiError> {
        let response = self
            .client
            .get(format!("{}/", self.api_url))
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(response.json::<ServiceStatus>().await?)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. On failure, decode
    /// the `detail` field of a JSON error body if there is one.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, StudioApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.detail)
            .and_then(|d| d.as_str().map(str::to_owned));
        tracing::warn!(status = status.as_u16(), ?detail, "Service returned an error");
        Err(StudioApiError::Service {
            status: status.as_u16(),
            detail,
        })
    }

    /// Read a binary media body, keeping its content type and file name.
    async fn read_media(
        response: reqwest::Response,
        default_file_name: &str,
    ) -> Result<MediaBlob, StudioApiError> {
        let response = Self::ensure_success(response).await?;
        let headers = response.headers();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let file_name = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_file_name)
            .unwrap_or_else(|| default_file_name.to_string());

        let data = response.bytes().await?;
        Ok(MediaBlob::new(content_type, data).with_file_name(file_name))
    }
}

#[async_trait]
impl StudioBackend for StudioApi {
    /// Sends `POST /generate-scene/` with `{ "prompt": ... }`.
    async fn generate_scene(&self, prompt: &str) -> Result<MediaBlob, StudioApiError> {
        let body = serde_json::json!({ "prompt": prompt });

        let response = self
            .client
            .post(format!("{}/generate-scene/", self.api_url))
            .json(&body)
            .send()
            .await?;

        Self::read_media(response, DEFAULT_SCENE_FILE_NAME).await
    }

    /// Sends `POST /upload-clip/` as multipart with a single `file` field.
    async fn upload_clip(
        &self,
        file_name: &str,
        blob: &MediaBlob,
    ) -> Result<String, StudioApiError> {
        let part = Part::bytes(blob.data.to_vec())
            .file_name(file_name.to_string())
            .mime_str(&blob.content_type)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(format!("{}/upload-clip/", self.api_url))
            .multipart(form)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let uploaded = response.json::<UploadClipResponse>().await?;
        Ok(uploaded.file_path)
    }

    /// Sends `POST /stitch-story/` with `{ "file_paths": [...] }`.
    async fn stitch_story(&self, file_paths: &[String]) -> Result<MediaBlob, StudioApiError> {
        let body = serde_json::json!({ "file_paths": file_paths });

        let response = self
            .client
            .post(format!("{}/stitch-story/", self.api_url))
            .json(&body)
            .send()
            .await?;

        Self::read_media(response, DEFAULT_STORY_FILE_NAME).await
    }
}

/// Extract the `filename` parameter from a `Content-Disposition` value.
///
/// Parameter names match case-insensitively. Quoted values may contain `;`
/// and backslash escapes.
fn disposition_file_name(value: &str) -> Option<String> {
    disposition_params(value)
        .into_iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("filename"))
        .map(|(_, value)| value)
        .filter(|name| !name.is_empty())
}

/// Split a header value into `name=value` parameters, honoring quotes.
fn disposition_params(value: &str) -> Vec<(String, String)> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut escaped = false;

    for c in value.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if quoted => escaped = true,
            '"' => {
                quoted = !quoted;
                current.push(c);
            }
            ';' if !quoted => segments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    segments.push(current);

    segments
        .iter()
        .filter_map(|segment| {
            let (name, value) = segment.split_once('=')?;
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            Some((name.trim().to_string(), value.to_string()))
        })
        .collect()
}
