//! Editor reducer.
//!
//! [`EditorState`] owns every store of the editing session. It only changes
//! through [`reduce`], which consumes the previous state and one
//! [`EditorEvent`] and returns the next state plus an optional [`Command`]
//! for the caller to run. Command outcomes come back in as events, so
//! network responses go through the same single mutation path as user
//! input.
//!
//! Every event that changes a store appends exactly one activity log entry.
//! Drag start/cancel only touch the transient drag tracker and are not
//! logged.

use crate::activity_log::ActivityLog;
use crate::drag::{
    keyboard_drop_zone, resolve_drop, DragIntent, DragItem, DragTracker, DropZone, Nudge,
};
use crate::error::CoreError;
use crate::export::{plan_export, ExportClip};
use crate::media::{MediaBlob, MediaLibrary, MediaRef, ScopedMedia};
use crate::prompt::validate_prompt;
use crate::scene::SceneStore;
use crate::timeline::Timeline;
use crate::types::{EntryId, SceneId};

// ---------------------------------------------------------------------------
// Events, commands, status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum EditorEvent {
    /// The user asked for a new scene.
    SubmitPrompt { prompt: String },
    GenerationSucceeded { prompt: String, blob: MediaBlob },
    GenerationFailed { prompt: String, reason: String },
    /// Click on a scene in the bin.
    PreviewScene { scene_id: SceneId },
    DragStarted { item: DragItem },
    DragCancelled,
    /// The active drag item was released over `over`.
    Dropped { over: Option<DropZone> },
    /// Keyboard reorder of a timeline entry.
    NudgeEntry { entry_id: EntryId, direction: Nudge },
    RemoveEntry { entry_id: EntryId },
    RequestExport,
    /// Every clip of the running export was uploaded.
    ClipsUploaded { count: usize },
    ExportCompleted { file_name: String, size_bytes: usize },
    ExportFailed { reason: String },
    /// Release all media held by the session.
    EndSession,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone)]
pub enum Command {
    GenerateScene { prompt: String },
    Export { clips: Vec<ExportClip> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationStatus {
    Idle,
    InFlight { prompt: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    Idle,
    Uploading { clips: usize },
    Stitching { clips: usize },
}

/// Scene currently shown in the preview player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preview {
    pub scene_id: SceneId,
    pub media: MediaRef,
}

/// Result of one reducer step.
#[derive(Debug)]
pub struct Transition {
    pub state: EditorState,
    pub command: Option<Command>,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct EditorState {
    scenes: SceneStore,
    timeline: Timeline,
    log: ActivityLog,
    media: MediaLibrary,
    drag: DragTracker,
    preview: Option<Preview>,
    generation: GenerationStatus,
    export: ExportStatus,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    pub fn new() -> Self {
        Self {
            scenes: SceneStore::new(),
            timeline: Timeline::new(),
            log: ActivityLog::new(),
            media: MediaLibrary::new(),
            drag: DragTracker::new(),
            preview: None,
            generation: GenerationStatus::Idle,
            export: ExportStatus::Idle,
        }
    }

    pub fn scenes(&self) -> &SceneStore {
        &self.scenes
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn media(&self) -> &MediaLibrary {
        &self.media
    }

    /// Hold `blob` in the session's media library until the guard drops.
    ///
    /// Holds taken by scenes, entries and the preview are only ever changed
    /// by the reducer.
    pub fn scoped_media(&mut self, blob: MediaBlob) -> ScopedMedia<'_> {
        self.media.scoped(blob)
    }

    pub fn preview(&self) -> Option<Preview> {
        self.preview
    }

    pub fn active_drag(&self) -> Option<DragItem> {
        self.drag.active()
    }

    pub fn generation(&self) -> &GenerationStatus {
        &self.generation
    }

    pub fn export_status(&self) -> ExportStatus {
        self.export
    }

    /// Whether the generate control should be enabled.
    pub fn can_generate(&self) -> bool {
        self.generation == GenerationStatus::Idle
    }

    /// Whether the export control should be enabled.
    pub fn can_export(&self) -> bool {
        self.export == ExportStatus::Idle && !self.timeline.is_empty()
    }

    fn apply(&mut self, event: EditorEvent) -> Option<Command> {
        match event {
            EditorEvent::SubmitPrompt { prompt } => self.submit_prompt(prompt),
            EditorEvent::GenerationSucceeded { prompt, blob } => {
                self.generation = GenerationStatus::Idle;
                let media = self.media.acquire(blob);
                let scene_id = self.scenes.push(prompt.clone(), Some(media));
                self.set_preview(scene_id, media);
                self.log.success(format!("Scene added: '{prompt}'"));
                None
            }
            EditorEvent::GenerationFailed { prompt, reason } => {
                self.generation = GenerationStatus::Idle;
                self.log
                    .error(format!("Generation failed for '{prompt}': {reason}"));
                None
            }
            EditorEvent::PreviewScene { scene_id } => {
                self.preview_scene(scene_id);
                None
            }
            EditorEvent::DragStarted { item } => {
                self.drag.start(item);
                None
            }
            EditorEvent::DragCancelled => {
                self.drag.cancel();
                None
            }
            EditorEvent::Dropped { over } => {
                if let Some(item) = self.drag.finish() {
                    if let Some(intent) = resolve_drop(item, over, &self.timeline) {
                        self.apply_intent(intent);
                    }
                }
                None
            }
            EditorEvent::NudgeEntry { entry_id, direction } => {
                let over = keyboard_drop_zone(&self.timeline, &entry_id, direction);
                let item = DragItem::Entry(entry_id);
                if let Some(intent) = resolve_drop(item, over, &self.timeline) {
                    self.apply_intent(intent);
                }
                None
            }
            EditorEvent::RemoveEntry { entry_id } => {
                match self.timeline.remove(&entry_id) {
                    Some(entry) => {
                        if let Some(media) = entry.media {
                            self.media.release(&media);
                        }
                        self.log
                            .info(format!("Removed '{}' from the timeline", entry.label));
                    }
                    None => self.log.warn(not_found("timeline entry", entry_id)),
                }
                None
            }
            EditorEvent::RequestExport => self.request_export(),
            EditorEvent::ClipsUploaded { count } => {
                self.export = ExportStatus::Stitching { clips: count };
                self.log
                    .info(format!("Uploaded {count} clips; stitching story"));
                None
            }
            EditorEvent::ExportCompleted {
                file_name,
                size_bytes,
            } => {
                self.export = ExportStatus::Idle;
                self.log
                    .success(format!("Story exported as {file_name} ({size_bytes} bytes)"));
                None
            }
            EditorEvent::ExportFailed { reason } => {
                self.export = ExportStatus::Idle;
                self.log.error(format!("Export failed: {reason}"));
                None
            }
            EditorEvent::EndSession => {
                self.preview = None;
                self.drag.cancel();
                self.media.clear();
                self.log.info("Session ended; media released");
                None
            }
        }
    }

    fn submit_prompt(&mut self, prompt: String) -> Option<Command> {
        if let GenerationStatus::InFlight { prompt: pending } = &self.generation {
            let err = CoreError::Conflict(format!("still generating '{pending}'"));
            self.log.warn(err.to_string());
            return None;
        }
        if let Err(err) = validate_prompt(&prompt) {
            self.log.warn(err.to_string());
            return None;
        }
        self.log.info(format!("Generating scene: '{prompt}'"));
        self.generation = GenerationStatus::InFlight {
            prompt: prompt.clone(),
        };
        Some(Command::GenerateScene { prompt })
    }

    fn preview_scene(&mut self, scene_id: SceneId) {
        let Some(scene) = self.scenes.get(&scene_id) else {
            self.log.warn(not_found("scene", scene_id));
            return;
        };
        let label = scene.label.clone();
        let media = scene.media;
        match media {
            Some(media) => {
                self.set_preview(scene_id, media);
                self.log.info(format!("Previewing '{label}'"));
            }
            None => self.log.info(format!("'{label}' has no media to preview yet")),
        }
    }

    /// Point the preview at `media`, taking a hold on it and releasing the
    /// hold on whatever was previewed before.
    fn set_preview(&mut self, scene_id: SceneId, media: MediaRef) {
        self.media.retain(&media);
        if let Some(previous) = self.preview.replace(Preview { scene_id, media }) {
            self.media.release(&previous.media);
        }
    }

    fn apply_intent(&mut self, intent: DragIntent) {
        match intent {
            DragIntent::AppendToTimeline { scene_id } => {
                let Some(scene) = self.scenes.get(&scene_id) else {
                    self.log.warn(not_found("scene", scene_id));
                    return;
                };
                if let Some(media) = &scene.media {
                    self.media.retain(media);
                }
                let label = scene.label.clone();
                self.timeline.append_clone(scene);
                self.log.info(format!(
                    "Added '{label}' to the timeline at position {}",
                    self.timeline.len()
                ));
            }
            DragIntent::Reorder { from, to } => {
                if self.timeline.move_entry(from, to) {
                    let label = &self.timeline.entries()[to].label;
                    self.log.info(format!(
                        "Moved '{label}' from position {} to {}",
                        from + 1,
                        to + 1
                    ));
                }
            }
        }
    }

    fn request_export(&mut self) -> Option<Command> {
        if self.export != ExportStatus::Idle {
            self.log.warn("An export is already running");
            return None;
        }
        if self.timeline.is_empty() {
            self.log.warn("Timeline is empty; nothing to export");
            return None;
        }
        match plan_export(&self.timeline, &self.media) {
            Ok(clips) => {
                self.export = ExportStatus::Uploading { clips: clips.len() };
                self.log
                    .info(format!("Exporting {} clips: uploading", clips.len()));
                Some(Command::Export { clips })
            }
            Err(err) => {
                self.log.error(format!("Export refused: {err}"));
                None
            }
        }
    }
}

fn not_found(entity: &'static str, id: impl std::fmt::Display) -> String {
    CoreError::NotFound {
        entity,
        id: id.to_string(),
    }
    .to_string()
}

/// Advance the editor by one event.
pub fn reduce(state: EditorState, event: EditorEvent) -> Transition {
    let mut state = state;
    let command = state.apply(event);
    Transition { state, command }
}
