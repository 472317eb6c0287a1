//! The story timeline: an ordered list of scene placements.
//!
//! Entries carry a copy of their source scene's label and media handle, so
//! later changes to the scene bin never reach into the timeline. Position is
//! implicit in vector order, which is also display and export order.

use serde::Serialize;

use crate::media::MediaRef;
use crate::scene::Scene;
use crate::types::{EntryId, SceneId};

/// One placement of a scene on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub id: EntryId,
    /// Scene this entry was cloned from. Informational only.
    pub scene_id: SceneId,
    pub label: String,
    pub media: Option<MediaRef>,
}

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a copy of `scene` with a newly generated entry id.
    pub fn append_clone(&mut self, scene: &Scene) -> EntryId {
        let entry = TimelineEntry {
            id: EntryId::new(),
            scene_id: scene.id,
            label: scene.label.clone(),
            media: scene.media,
        };
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    /// Move the entry at `from` to `to`, shifting the entries in between.
    ///
    /// Returns `false` (and changes nothing) when either index is out of
    /// range or both are equal.
    pub fn move_entry(&mut self, from: usize, to: usize) -> bool {
        let len = self.entries.len();
        if from == to || from >= len || to >= len {
            return false;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        true
    }

    /// Remove the entry with the given id, returning it.
    pub fn remove(&mut self, id: &EntryId) -> Option<TimelineEntry> {
        let index = self.position(id)?;
        Some(self.entries.remove(index))
    }

    pub fn position(&self, id: &EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == *id)
    }

    pub fn get(&self, id: &EntryId) -> Option<&TimelineEntry> {
        self.entries.iter().find(|e| e.id == *id)
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimelineEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
