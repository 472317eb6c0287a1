//! Client side of the clip generation / stitching service.
//!
//! [`api::StudioApi`] speaks the service's HTTP contract, [`export`] runs
//! the upload fan-out and stitch phases, and [`session::Session`] drives an
//! [`reelsmith_core::editor::EditorState`] by executing the commands its
//! reducer emits.

pub mod api;
pub mod config;
pub mod export;
pub mod session;
