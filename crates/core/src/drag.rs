//! Drag-and-drop coordination.
//!
//! Gestures (pointer or keyboard) end with an item dropped over an optional
//! zone. [`resolve_drop`] turns that into a [`DragIntent`] against the
//! current timeline, or `None` when the gesture should have no effect.

use serde::{Deserialize, Serialize};

use crate::timeline::Timeline;
use crate::types::{EntryId, SceneId};

/// What is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragItem {
    /// A scene from the scene bin. Dropping it copies it onto the timeline.
    Scene(SceneId),
    /// An entry already on the timeline. Dropping it reorders.
    Entry(EntryId),
}

/// Where the item was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropZone {
    /// The timeline container itself (including its empty area).
    Timeline,
    /// A specific timeline entry.
    Entry(EntryId),
}

/// Resolved effect of a completed drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragIntent {
    AppendToTimeline { scene_id: SceneId },
    Reorder { from: usize, to: usize },
}

/// Direction for keyboard reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nudge {
    Earlier,
    Later,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve a finished drag into an intent.
///
/// - A scene dropped over any zone always appends.
/// - An entry dropped over another entry reorders, but only when both ids
///   exist on the timeline at different positions.
pub fn resolve_drop(
    item: DragItem,
    over: Option<DropZone>,
    timeline: &Timeline,
) -> Option<DragIntent> {
    let over = over?;
    match item {
        DragItem::Scene(scene_id) => Some(DragIntent::AppendToTimeline { scene_id }),
        DragItem::Entry(active) => {
            let DropZone::Entry(target) = over else {
                return None;
            };
            let from = timeline.position(&active)?;
            let to = timeline.position(&target)?;
            (from != to).then_some(DragIntent::Reorder { from, to })
        }
    }
}

/// Drop zone reached by nudging `entry` one slot in `direction`.
///
/// `None` at either end of the timeline or for an unknown entry.
pub fn keyboard_drop_zone(
    timeline: &Timeline,
    entry: &EntryId,
    direction: Nudge,
) -> Option<DropZone> {
    let index = timeline.position(entry)?;
    let neighbour = match direction {
        Nudge::Earlier => index.checked_sub(1)?,
        Nudge::Later => index + 1,
    };
    timeline
        .entries()
        .get(neighbour)
        .map(|e| DropZone::Entry(e.id))
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Remembers the item under the cursor between drag start and drag end.
#[derive(Debug, Clone, Default)]
pub struct DragTracker {
    active: Option<DragItem>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, item: DragItem) {
        self.active = Some(item);
    }

    /// Item currently being dragged, for rendering the drag overlay.
    pub fn active(&self) -> Option<DragItem> {
        self.active
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// End the drag. Returns the dragged item, or `None` if no drag was active.
    pub fn finish(&mut self) -> Option<DragItem> {
        self.active.take()
    }
}
