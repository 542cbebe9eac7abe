//! Transient references to in-memory payloads.
//!
//! A [`TransientHandle`] is acquired from a [`HandleRegistry`] when an image is
//! queued (its preview) or compressed (its output). The registry entry is
//! released when the last clone of the handle is dropped, so removing an image
//! from the collection, or clearing it, releases everything it held.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub type HandleId = u64;

/// Source of displayable references to binary payloads.
pub trait HandleRegistry: Send + Sync {
    fn acquire(&self, media_type: &str, bytes: &[u8]) -> HandleId;

    /// Called exactly once per acquired id.
    fn release(&self, id: HandleId);
}

/// Registry that keeps the set of live ids in memory.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    next_id: AtomicU64,
    live: Mutex<HashSet<HandleId>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_live(&self, id: HandleId) -> bool {
        self.live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&id)
    }
}

impl HandleRegistry for InMemoryRegistry {
    fn acquire(&self, _media_type: &str, _bytes: &[u8]) -> HandleId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id);
        id
    }

    fn release(&self, id: HandleId) {
        self.live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id);
    }
}

struct HandleInner {
    id: HandleId,
    media_type: String,
    bytes: Arc<[u8]>,
    registry: Arc<dyn HandleRegistry>,
}

impl Drop for HandleInner {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

/// Shared, reference-counted handle to a payload registered with a
/// [`HandleRegistry`].
#[derive(Clone)]
pub struct TransientHandle(Arc<HandleInner>);

impl TransientHandle {
    pub fn acquire(
        registry: &Arc<dyn HandleRegistry>,
        media_type: impl Into<String>,
        bytes: Arc<[u8]>,
    ) -> Self {
        let media_type = media_type.into();
        let id = registry.acquire(&media_type, &bytes);
        Self(Arc::new(HandleInner {
            id,
            media_type,
            bytes,
            registry: Arc::clone(registry),
        }))
    }

    pub fn id(&self) -> HandleId {
        self.0.id
    }

    pub fn media_type(&self) -> &str {
        &self.0.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0.bytes
    }

    pub fn size_bytes(&self) -> u64 {
        self.0.bytes.len() as u64
    }
}

impl PartialEq for TransientHandle {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for TransientHandle {}

impl fmt::Debug for TransientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransientHandle")
            .field("id", &self.0.id)
            .field("media_type", &self.0.media_type)
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}
