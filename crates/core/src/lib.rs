//! Editor state for assembling AI-generated clips into a story.
//!
//! Everything in this crate is synchronous and free of I/O: the scene bin,
//! the timeline, drag-and-drop resolution, the activity log and the reducer
//! that ties them together. Network effects are described as
//! [`editor::Command`] values and executed elsewhere.

pub mod activity_log;
pub mod drag;
pub mod editor;
pub mod error;
pub mod export;
pub mod media;
pub mod prompt;
pub mod scene;
pub mod timeline;
pub mod types;
