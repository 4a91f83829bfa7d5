use crate::catalog::decode::fit_to_target;
use crate::catalog::source::{AssetCatalog, DecodeRequest, DecodedImage};
use crate::foundation::core::{AssetId, AssetInfo};
use crate::foundation::error::{CollageError, CollageResult};
use image::{DynamicImage, RgbaImage};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Clone, Debug)]
enum Entry {
    Image(RgbaImage),
    Broken(String),
}

#[derive(Clone, Debug)]
struct Slot {
    entry: Entry,
    delay: Option<Duration>,
}

/// In-memory catalog for tests and embedding.
///
/// Entries can be marked broken or slow to exercise partial failure and out-of-order completion.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    slots: BTreeMap<AssetId, Slot>,
    decode_calls: AtomicUsize,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) an asset backed by `pixels`.
    pub fn insert(&mut self, id: impl Into<AssetId>, pixels: RgbaImage) -> &mut Self {
        self.slots.insert(
            id.into(),
            Slot {
                entry: Entry::Image(pixels),
                delay: None,
            },
        );
        self
    }

    /// Add an asset whose decode always fails with `reason`.
    pub fn insert_broken(&mut self, id: impl Into<AssetId>, reason: impl Into<String>) -> &mut Self {
        self.slots.insert(
            id.into(),
            Slot {
                entry: Entry::Broken(reason.into()),
                delay: None,
            },
        );
        self
    }

    /// Make decodes of `id` sleep for `delay` first.
    pub fn set_delay(&mut self, id: &AssetId, delay: Duration) -> &mut Self {
        if let Some(slot) = self.slots.get_mut(id) {
            slot.delay = Some(delay);
        }
        self
    }

    /// Number of decode calls served so far.
    pub fn decode_calls(&self) -> usize {
        self.decode_calls.load(Ordering::SeqCst)
    }
}

impl AssetCatalog for MemoryCatalog {
    fn assets(&self) -> CollageResult<Vec<AssetInfo>> {
        Ok(self
            .slots
            .iter()
            .map(|(id, slot)| {
                let (width, height) = match &slot.entry {
                    Entry::Image(img) => img.dimensions(),
                    Entry::Broken(_) => (0, 0),
                };
                AssetInfo {
                    id: id.clone(),
                    width,
                    height,
                }
            })
            .collect())
    }

    fn decode(&self, id: &AssetId, req: &DecodeRequest) -> CollageResult<DecodedImage> {
        self.decode_calls.fetch_add(1, Ordering::SeqCst);
        let slot = self
            .slots
            .get(id)
            .ok_or_else(|| CollageError::decode(id, "unknown asset"))?;
        if let Some(delay) = slot.delay {
            std::thread::sleep(delay);
        }
        match &slot.entry {
            Entry::Image(img) => Ok(DecodedImage::new(fit_to_target(
                DynamicImage::ImageRgba8(img.clone()),
                req,
            ))),
            Entry::Broken(reason) => Err(CollageError::decode(id, reason.clone())),
        }
    }
}
