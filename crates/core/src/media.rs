//! Client-side media handles.
//!
//! Fetched clip bytes live in a [`MediaLibrary`] and are addressed by an
//! opaque [`MediaRef`]. Each holder (a scene, a timeline entry, the active
//! preview) takes its own reference; the bytes are dropped as soon as the
//! last holder releases. [`ScopedMedia`] covers handles that only need to
//! live for the duration of one operation, such as a download.

use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Content type assumed when the service does not send one.
pub const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

// ---------------------------------------------------------------------------
// Blob + reference
// ---------------------------------------------------------------------------

/// Raw media returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBlob {
    pub content_type: String,
    /// File name suggested by the service, if any.
    pub file_name: Option<String>,
    pub data: Bytes,
}

impl MediaBlob {
    pub fn new(content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            file_name: None,
            data: data.into(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Opaque handle to a blob held by a [`MediaLibrary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaRef(Uuid);

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Library
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Slot {
    blob: MediaBlob,
    holders: usize,
}

/// Reference-counted store of fetched media.
#[derive(Debug, Default)]
pub struct MediaLibrary {
    slots: HashMap<MediaRef, Slot>,
}

impl MediaLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a blob and return a handle owned by the caller (one holder).
    pub fn acquire(&mut self, blob: MediaBlob) -> MediaRef {
        let media = MediaRef(Uuid::new_v4());
        self.slots.insert(media, Slot { blob, holders: 1 });
        media
    }

    /// Register an additional holder. Returns `false` for a released handle.
    pub fn retain(&mut self, media: &MediaRef) -> bool {
        match self.slots.get_mut(media) {
            Some(slot) => {
                slot.holders += 1;
                true
            }
            None => false,
        }
    }

    /// Drop one holder. Returns `true` when this freed the underlying bytes.
    pub fn release(&mut self, media: &MediaRef) -> bool {
        let Some(slot) = self.slots.get_mut(media) else {
            return false;
        };
        slot.holders -= 1;
        if slot.holders == 0 {
            self.slots.remove(media);
            tracing::debug!(%media, "Released media blob");
            true
        } else {
            false
        }
    }

    pub fn get(&self, media: &MediaRef) -> Option<&MediaBlob> {
        self.slots.get(media).map(|slot| &slot.blob)
    }

    pub fn holders(&self, media: &MediaRef) -> usize {
        self.slots.get(media).map_or(0, |slot| slot.holders)
    }

    /// Number of blobs currently alive.
    pub fn live_count(&self) -> usize {
        self.slots.len()
    }

    /// Release everything, regardless of holders. Used on session teardown.
    pub fn clear(&mut self) {
        if !self.slots.is_empty() {
            tracing::debug!(count = self.slots.len(), "Releasing all media blobs");
        }
        self.slots.clear();
    }

    /// Acquire a handle that is released when the returned guard drops.
    pub fn scoped(&mut self, blob: MediaBlob) -> ScopedMedia<'_> {
        let media = self.acquire(blob);
        ScopedMedia {
            library: self,
            media,
        }
    }
}

// ---------------------------------------------------------------------------
// Scoped handle
// ---------------------------------------------------------------------------

/// Transient handle that releases its blob on drop.
pub struct ScopedMedia<'a> {
    library: &'a mut MediaLibrary,
    media: MediaRef,
}

impl ScopedMedia<'_> {
    pub fn media(&self) -> MediaRef {
        self.media
    }

    pub fn blob(&self) -> Option<&MediaBlob> {
        self.library.get(&self.media)
    }
}

impl Drop for ScopedMedia<'_> {
    fn drop(&mut self) {
        self.library.release(&self.media);
    }
}
