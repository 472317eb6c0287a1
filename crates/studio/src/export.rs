//! Story export: upload fan-out, stitching and delivery.
//!
//! [`upload_all`] issues one upload per clip concurrently and joins them
//! with all-or-nothing semantics. [`run_export`] chains it with the stitch
//! request. [`deliver_artifact`] writes the stitched story to disk through a
//! scoped media handle.

use std::path::{Path, PathBuf};

use futures::future::join_all;

use reelsmith_core::error::CoreError;
use reelsmith_core::export::{ExportClip, DEFAULT_STORY_FILE_NAME};
use reelsmith_core::media::{MediaBlob, ScopedMedia};

use crate::api::{StudioApiError, StudioBackend};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Export refused: {0}")]
    Plan(#[from] CoreError),

    /// One clip failed to upload; nothing was stitched.
    #[error("Upload of clip {} ('{label}') failed: {}", .position + 1, .source.reason())]
    Upload {
        position: usize,
        label: String,
        source: StudioApiError,
    },

    #[error("Stitching failed: {}", .0.reason())]
    Stitch(#[source] StudioApiError),

    #[error("Could not save story: {0}")]
    Delivery(#[from] std::io::Error),
}

/// Upload every clip concurrently.
///
/// Returns the server-side paths in the same order as `clips`, regardless
/// of completion order. If any upload fails, the first failure in clip
/// order is returned.
pub async fn upload_all<B>(backend: &B, clips: &[ExportClip]) -> Result<Vec<String>, ExportError>
where
    B: StudioBackend + ?Sized,
{
    tracing::info!(clips = clips.len(), "Uploading clips");

    let uploads = clips.iter().map(|clip| async move {
        backend
            .upload_clip(&clip.file_name, &clip.blob)
            .await
            .map_err(|source| ExportError::Upload {
                position: clip.position,
                label: clip.label.clone(),
                source,
            })
    });

    let paths = join_all(uploads)
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(clips = paths.len(), "All clips uploaded");
    Ok(paths)
}

/// Ask the service to concatenate the uploaded clips.
pub async fn stitch<B>(backend: &B, file_paths: &[String]) -> Result<MediaBlob, ExportError>
where
    B: StudioBackend + ?Sized,
{
    tracing::info!(clips = file_paths.len(), "Requesting stitch");
    backend
        .stitch_story(file_paths)
        .await
        .map_err(ExportError::Stitch)
}

/// Upload all clips, then stitch them. No stitch request is made unless
/// every upload succeeded.
pub async fn run_export<B>(backend: &B, clips: &[ExportClip]) -> Result<MediaBlob, ExportError>
where
    B: StudioBackend + ?Sized,
{
    if clips.is_empty() {
        return Err(CoreError::Validation("Nothing to export".to_string()).into());
    }
    let paths = upload_all(backend, clips).await?;
    stitch(backend, &paths).await
}

/// Save the stitched story into `dir`.
///
/// Takes ownership of the scoped handle, so the artifact is released when
/// the write finishes, whether or not it succeeded.
pub async fn deliver_artifact(
    artifact: ScopedMedia<'_>,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let Some(blob) = artifact.blob() else {
        return Err(CoreError::Internal("scoped media vanished".to_string()).into());
    };
    let file_name = blob
        .file_name
        .as_deref()
        .and_then(|name| Path::new(name).file_name())
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| DEFAULT_STORY_FILE_NAME.into());
    let path = dir.join(file_name);

    tracing::debug!(media = %artifact.media(), path = %path.display(), "Writing story");
    tokio::fs::write(&path, &blob.data).await?;

    tracing::info!(path = %path.display(), bytes = blob.len(), "Story saved");
    Ok(path)
}
