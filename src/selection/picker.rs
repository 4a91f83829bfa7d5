use crate::foundation::core::AssetId;
use crate::foundation::error::{CollageError, CollageResult};
use std::collections::BTreeSet;

/// Fewest photos a collage can hold.
pub const MIN_PHOTOS: usize = 2;
/// Most photos a collage can hold.
pub const MAX_PHOTOS: usize = 9;

/// Result of [`Selection::toggle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    /// The asset was appended; carries its 1-based order number.
    Added(usize),
    /// The asset was removed; later selections moved up by one.
    Removed,
    /// The selection is full and the asset was not selected; nothing changed.
    Full,
}

/// Insertion-ordered set of picked assets, bounded to [`MAX_PHOTOS`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    order: Vec<AssetId>,
}

impl Selection {
    /// Start an empty picking session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `id` if selected, otherwise append it when there is room.
    pub fn toggle(&mut self, id: &AssetId) -> Toggle {
        if let Some(pos) = self.order.iter().position(|x| x == id) {
            self.order.remove(pos);
            return Toggle::Removed;
        }
        if self.order.len() >= MAX_PHOTOS {
            return Toggle::Full;
        }
        self.order.push(id.clone());
        Toggle::Added(self.order.len())
    }

    /// 1-based position of `id` in selection order.
    pub fn order_number(&self, id: &AssetId) -> Option<usize> {
        self.order.iter().position(|x| x == id).map(|i| i + 1)
    }

    /// Return `true` when `id` is selected.
    pub fn contains(&self, id: &AssetId) -> bool {
        self.order.contains(id)
    }

    /// Selected assets in selection order.
    pub fn ids(&self) -> &[AssetId] {
        &self.order
    }

    /// Number of selected assets.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Return `true` when nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Return `true` when no further asset can be added.
    pub fn is_full(&self) -> bool {
        self.order.len() >= MAX_PHOTOS
    }

    /// Drop every selection.
    pub fn clear(&mut self) {
        self.order.clear();
    }

    /// Freeze the current order into a [`CollageRequest`].
    ///
    /// The selection itself is left untouched.
    pub fn commit(&self) -> CollageResult<CollageRequest> {
        CollageRequest::new(self.order.clone())
    }
}

/// Immutable ordered snapshot of 2..=9 assets for one composition run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CollageRequest {
    assets: Vec<AssetId>,
}

impl CollageRequest {
    /// Build a request, enforcing the photo-count bounds.
    pub fn new(assets: Vec<AssetId>) -> CollageResult<Self> {
        if assets.len() < MIN_PHOTOS {
            return Err(CollageError::InsufficientSelection {
                selected: assets.len(),
                required: MIN_PHOTOS,
            });
        }
        if assets.len() > MAX_PHOTOS {
            return Err(CollageError::validation(format!(
                "a collage holds at most {MAX_PHOTOS} photos, got {}",
                assets.len()
            )));
        }
        Ok(Self { assets })
    }

    /// Assets in cell order; index `i` lands in layout cell `i`.
    pub fn assets(&self) -> &[AssetId] {
        &self.assets
    }

    /// Number of cells the collage needs.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Always `false`; requests hold at least [`MIN_PHOTOS`] assets.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Distinct assets in first-occurrence order.
    pub fn distinct(&self) -> Vec<AssetId> {
        let mut seen = BTreeSet::new();
        self.assets
            .iter()
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/selection/picker.rs"]
mod tests;
