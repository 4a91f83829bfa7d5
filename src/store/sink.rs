use crate::foundation::core::StoredAssetId;
use crate::foundation::error::{CollageError, CollageResult};
use image::RgbaImage;
use std::sync::Mutex;

/// Destination for finished composites.
///
/// `commit` is atomic: on `Ok` exactly one new asset exists, on `Err` none was created. Failures
/// are reported as [`CollageError::Persistence`] with a human-readable cause.
pub trait PhotoStore: Send + Sync {
    /// Persist `image` as a new asset.
    fn commit(&self, image: &RgbaImage) -> CollageResult<StoredAssetId>;
}

/// In-memory photo store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryPhotoStore {
    saved: Mutex<Vec<(StoredAssetId, RgbaImage)>>,
    fail_with: Option<String>,
}

impl MemoryPhotoStore {
    /// Create an empty store that accepts every commit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects every commit with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            fail_with: Some(reason.into()),
        }
    }

    /// Snapshot of committed assets, in commit order.
    pub fn saved(&self) -> Vec<(StoredAssetId, RgbaImage)> {
        self.saved
            .lock()
            .map(|v| v.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Number of committed assets.
    pub fn len(&self) -> usize {
        self.saved
            .lock()
            .map(|v| v.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    /// Return `true` when nothing was committed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PhotoStore for MemoryPhotoStore {
    fn commit(&self, image: &RgbaImage) -> CollageResult<StoredAssetId> {
        if let Some(reason) = &self.fail_with {
            return Err(CollageError::persistence(reason.clone()));
        }
        let mut saved = self
            .saved
            .lock()
            .map_err(|_| CollageError::persistence("memory store lock poisoned"))?;
        let id = StoredAssetId(format!("mem-{}", saved.len() + 1));
        saved.push((id.clone(), image.clone()));
        Ok(id)
    }
}
