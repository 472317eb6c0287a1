//! Scene bin: every clip generated during the session, in creation order.

use serde::Serialize;

use crate::media::MediaRef;
use crate::types::{SceneId, Timestamp};

/// A generated clip available for placement on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub id: SceneId,
    pub label: String,
    /// `None` until the clip has playable media.
    pub media: Option<MediaRef>,
    pub created_at: Timestamp,
}

/// Append-only collection of scenes.
#[derive(Debug, Clone, Default)]
pub struct SceneStore {
    scenes: Vec<Scene>,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scene with a fresh id and return that id.
    pub fn push(&mut self, label: impl Into<String>, media: Option<MediaRef>) -> SceneId {
        let scene = Scene {
            id: SceneId::new(),
            label: label.into(),
            media,
            created_at: chrono::Utc::now(),
        };
        let id = scene.id;
        self.scenes.push(scene);
        id
    }

    pub fn get(&self, id: &SceneId) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.iter()
    }

    pub fn last(&self) -> Option<&Scene> {
        self.scenes.last()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}
