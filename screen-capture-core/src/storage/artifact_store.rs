use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::artifact::ArtifactHandle;
use crate::models::error::CaptureError;

/// In-memory store of finalized artifact bytes behind revocable handles.
///
/// Bytes stay allocated until their handle is released. A released handle
/// never resolves again, even if the same bytes are stored later.
/// Cloning the store shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    blobs: Arc<Mutex<HashMap<ArtifactHandle, Arc<[u8]>>>>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` and return a fresh handle to them.
    pub fn insert(&self, bytes: Vec<u8>) -> ArtifactHandle {
        let handle = ArtifactHandle::new();
        self.blobs.lock().insert(handle, Arc::from(bytes));
        handle
    }

    /// Dereference a handle.
    pub fn resolve(&self, handle: &ArtifactHandle) -> Result<Arc<[u8]>, CaptureError> {
        self.blobs
            .lock()
            .get(handle)
            .cloned()
            .ok_or(CaptureError::ArtifactReleased)
    }

    /// Release a handle, reclaiming its bytes. Returns `false` if it was
    /// already released.
    pub fn release(&self, handle: &ArtifactHandle) -> bool {
        self.blobs.lock().remove(handle).is_some()
    }

    pub fn is_live(&self, handle: &ArtifactHandle) -> bool {
        self.blobs.lock().contains_key(handle)
    }

    /// Number of handles not yet released.
    pub fn live_count(&self) -> usize {
        self.blobs.lock().len()
    }

    /// Total bytes held by unreleased handles.
    pub fn live_bytes(&self) -> usize {
        self.blobs.lock().values().map(|b| b.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_resolve() {
        let store = ArtifactStore::new();
        let handle = store.insert(vec![1, 2, 3]);
        assert_eq!(&*store.resolve(&handle).unwrap(), &[1, 2, 3]);
        assert_eq!(store.live_count(), 1);
        assert_eq!(store.live_bytes(), 3);
    }

    #[test]
    fn released_handle_is_never_resurrected() {
        let store = ArtifactStore::new();
        let handle = store.insert(vec![9; 16]);
        assert!(store.release(&handle));
        assert_eq!(store.resolve(&handle), Err(CaptureError::ArtifactReleased));
        assert!(!store.release(&handle));

        let other = store.insert(vec![9; 16]);
        assert_ne!(other, handle);
        assert_eq!(store.resolve(&handle), Err(CaptureError::ArtifactReleased));
        assert!(store.is_live(&other));
    }

    #[test]
    fn clones_share_storage() {
        let store = ArtifactStore::new();
        let view = store.clone();
        let handle = store.insert(vec![7]);
        assert!(view.is_live(&handle));
        view.release(&handle);
        assert!(!store.is_live(&handle));
        assert_eq!(store.live_bytes(), 0);
    }
}
