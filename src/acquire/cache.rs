use crate::catalog::source::DecodedImage;
use crate::foundation::core::AssetId;
use std::collections::BTreeMap;

/// Decoded images of one collage request, keyed by asset.
///
/// Owned by a single acquisition; entries are write-once.
#[derive(Clone, Debug, Default)]
pub struct ImageCache {
    images: BTreeMap<AssetId, DecodedImage>,
}

impl ImageCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `image` for `id` unless an entry already exists. Returns `true` when stored.
    pub fn insert(&mut self, id: AssetId, image: DecodedImage) -> bool {
        match self.images.entry(id) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(v) => {
                v.insert(image);
                true
            }
        }
    }

    /// Image for `id`, if it decoded.
    pub fn get(&self, id: &AssetId) -> Option<&DecodedImage> {
        self.images.get(id)
    }

    /// Return `true` when `id` has an image.
    pub fn contains(&self, id: &AssetId) -> bool {
        self.images.contains_key(id)
    }

    /// Number of cached images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Return `true` when nothing decoded.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
