//! Editor session: the reducer plus the side effects it asks for.
//!
//! [`Session`] owns the [`EditorState`] and a [`StudioBackend`]. Every user
//! action goes through [`Session::handle`], which feeds the event to the
//! reducer, runs the resulting command against the service and feeds the
//! outcome back in until the state settles.

use std::path::{Path, PathBuf};

use reelsmith_core::drag::{DragItem, DropZone};
use reelsmith_core::editor::{reduce, Command, EditorEvent, EditorState};
use reelsmith_core::export::ExportClip;
use reelsmith_core::types::SceneId;

use crate::api::StudioBackend;
use crate::export::{self, ExportError};

pub struct Session<B> {
    state: EditorState,
    backend: B,
    download_dir: PathBuf,
}

impl<B: StudioBackend> Session<B> {
    pub fn new(backend: B, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            state: EditorState::new(),
            backend,
            download_dir: download_dir.into(),
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Apply one event and run every command it triggers.
    ///
    /// Returns the path of the saved story when the event chain ended in a
    /// completed export.
    pub async fn handle(&mut self, event: EditorEvent) -> Option<PathBuf> {
        let mut saved = None;
        let mut pending = self.dispatch(event);

        while let Some(command) = pending {
            let follow_up = match command {
                Command::GenerateScene { prompt } => self.generate(prompt).await,
                Command::Export { clips } => match self.export(&clips).await {
                    Ok((path, size_bytes)) => {
                        let file_name = path
                            .file_name()
                            .map(|name| name.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        saved = Some(path);
                        EditorEvent::ExportCompleted {
                            file_name,
                            size_bytes,
                        }
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "Export failed");
                        EditorEvent::ExportFailed {
                            reason: err.to_string(),
                        }
                    }
                },
            };
            pending = self.dispatch(follow_up);
        }

        saved
    }

    /// Submit a prompt for generation.
    pub async fn submit_prompt(&mut self, prompt: impl Into<String>) {
        self.handle(EditorEvent::SubmitPrompt {
            prompt: prompt.into(),
        })
        .await;
    }

    /// Drag a scene from the library onto the timeline.
    pub async fn add_to_timeline(&mut self, scene_id: SceneId) {
        self.handle(EditorEvent::DragStarted {
            item: DragItem::Scene(scene_id),
        })
        .await;
        self.handle(EditorEvent::Dropped {
            over: Some(DropZone::Timeline),
        })
        .await;
    }

    /// Export the timeline. Returns the saved story's path on success.
    pub async fn export_story(&mut self) -> Option<PathBuf> {
        self.handle(EditorEvent::RequestExport).await
    }

    /// End the session, releasing every media handle it still holds.
    pub async fn end(mut self) -> EditorState {
        self.handle(EditorEvent::EndSession).await;
        self.state
    }

    // ---- private helpers ----

    fn dispatch(&mut self, event: EditorEvent) -> Option<Command> {
        let transition = reduce(std::mem::take(&mut self.state), event);
        self.state = transition.state;
        transition.command
    }

    async fn generate(&self, prompt: String) -> EditorEvent {
        tracing::info!(%prompt, "Generating scene");
        match self.backend.generate_scene(&prompt).await {
            Ok(blob) => EditorEvent::GenerationSucceeded { prompt, blob },
            Err(err) => {
                tracing::warn!(%prompt, error = %err, "Scene generation failed");
                EditorEvent::GenerationFailed {
                    prompt,
                    reason: err.reason(),
                }
            }
        }
    }

    async fn export(&mut self, clips: &[ExportClip]) -> Result<(PathBuf, usize), ExportError> {
        let paths = export::upload_all(&self.backend, clips).await?;
        // Moves the state to stitching; never yields a command.
        let _ = self.dispatch(EditorEvent::ClipsUploaded { count: paths.len() });

        let story = export::stitch(&self.backend, &paths).await?;
        let size_bytes = story.len();
        let artifact = self.state.scoped_media(story);
        let path = export::deliver_artifact(artifact, &self.download_dir).await?;
        Ok((path, size_bytes))
    }
}
