//! Export planning: turning the timeline into an ordered list of uploads.
//!
//! The network side (upload fan-out, stitching, delivery) lives in the
//! studio crate; this module decides what gets sent and in which order.

use crate::error::CoreError;
use crate::media::{MediaBlob, MediaLibrary};
use crate::timeline::Timeline;
use crate::types::EntryId;

/// File name the stitched story is saved under when the service sends none.
pub const DEFAULT_STORY_FILE_NAME: &str = "final_story.mp4";

/// Extension used for uploaded clip file names.
pub const CLIP_FILE_EXTENSION: &str = "mp4";

/// One clip to upload, in timeline order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportClip {
    /// Zero-based position on the timeline.
    pub position: usize,
    pub entry_id: EntryId,
    pub label: String,
    /// Multipart file name, e.g. `clip_1.mp4`.
    pub file_name: String,
    pub blob: MediaBlob,
}

impl ExportClip {
    /// Human-readable identity used in error messages.
    pub fn describe(&self) -> String {
        format!("clip {} ('{}')", self.position + 1, self.label)
    }
}

/// Multipart file name for the clip at `position`.
pub fn clip_file_name(position: usize) -> String {
    format!("clip_{}.{CLIP_FILE_EXTENSION}", position + 1)
}

/// Build the upload list for the current timeline.
///
/// Fails on an empty timeline, or on the first entry whose media is missing
/// or already released.
pub fn plan_export(
    timeline: &Timeline,
    media: &MediaLibrary,
) -> Result<Vec<ExportClip>, CoreError> {
    if timeline.is_empty() {
        return Err(CoreError::Validation(
            "Timeline is empty; add scenes before exporting".to_string(),
        ));
    }

    timeline
        .iter()
        .enumerate()
        .map(|(position, entry)| {
            let blob = entry
                .media
                .as_ref()
                .and_then(|m| media.get(m))
                .ok_or_else(|| {
                    CoreError::Validation(format!(
                        "clip {} ('{}') has no media to upload",
                        position + 1,
                        entry.label
                    ))
                })?;
            Ok(ExportClip {
                position,
                entry_id: entry.id,
                label: entry.label.clone(),
                file_name: clip_file_name(position),
                blob: blob.clone(),
            })
        })
        .collect()
}
