use crate::foundation::core::{AssetId, AssetInfo};
use crate::foundation::error::CollageResult;
use image::RgbaImage;
use std::sync::Arc;

/// Resampling quality requested from a catalog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DecodeQuality {
    /// Cheap resampling, suitable for thumbnails.
    Fast,
    /// Best available resampling.
    #[default]
    High,
}

/// Parameters of one decode call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeRequest {
    /// Square target; the result covers `target_side x target_side` when the source is large
    /// enough, keeping its aspect ratio.
    pub target_side: u32,
    /// Resampling quality.
    pub quality: DecodeQuality,
    /// Whether the catalog may fetch assets that are not resident locally.
    pub allow_network: bool,
}

impl DecodeRequest {
    /// High-quality, network-allowed request as issued by acquisition.
    pub fn full_resolution(target_side: u32) -> Self {
        Self {
            target_side,
            quality: DecodeQuality::High,
            allow_network: true,
        }
    }
}

/// Decoded straight-alpha RGBA8 raster, cheap to clone.
#[derive(Clone, Debug)]
pub struct DecodedImage(Arc<RgbaImage>);

impl DecodedImage {
    /// Wrap decoded pixels.
    pub fn new(pixels: RgbaImage) -> Self {
        Self(Arc::new(pixels))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// Borrow the pixels.
    pub fn pixels(&self) -> &RgbaImage {
        &self.0
    }
}

/// Source of photo assets.
///
/// `decode` blocks; acquisition calls it from worker threads, one call per asset, and may call it
/// again for the same asset and request.
pub trait AssetCatalog: Send + Sync {
    /// Enumerate available assets.
    fn assets(&self) -> CollageResult<Vec<AssetInfo>>;

    /// Decode `id` for `req`. Failures are reported as [`crate::CollageError::Decode`].
    fn decode(&self, id: &AssetId, req: &DecodeRequest) -> CollageResult<DecodedImage>;
}
