use crate::acquire::cache::ImageCache;
use crate::composite::fill::aspect_fill_rect;
use crate::foundation::core::{Rect, Rgba8, Size, StoredAssetId};
use crate::foundation::error::{CollageError, CollageResult};
use crate::layout::grid::GridLayout;
use crate::selection::picker::CollageRequest;
use crate::store::sink::PhotoStore;
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use std::borrow::Cow;

/// A rendered composite and the request it was built from.
#[derive(Clone, Debug)]
pub struct Collage {
    /// Provenance.
    pub request: CollageRequest,
    /// Square straight-alpha RGBA8 canvas.
    pub image: RgbaImage,
    /// Per cell: whether an image was drawn into it.
    pub filled: Vec<bool>,
}

impl Collage {
    /// Number of cells that received an image.
    pub fn filled_cells(&self) -> usize {
        self.filled.iter().filter(|f| **f).count()
    }
}

/// A composite accepted by a photo store.
#[derive(Clone, Debug)]
pub struct SavedCollage {
    /// The persisted composite.
    pub collage: Collage,
    /// Identifier assigned by the store.
    pub stored: StoredAssetId,
}

/// Pixel-space destination of one cell, ready to blit.
struct Tile<'a> {
    /// Clip bounds in canvas pixels, half-open.
    clip: (u32, u32, u32, u32),
    /// Top-left of the scaled source in canvas pixels; may be negative.
    origin: (i64, i64),
    pixels: Cow<'a, RgbaImage>,
}

/// Draw every cached image of `request` into its `layout` cell on a `canvas_side` square.
///
/// Cells without a cached image (or beyond the layout) keep the `background` fill.
#[tracing::instrument(skip_all, fields(count = request.len(), canvas_side = canvas_side))]
pub fn render(
    request: &CollageRequest,
    cache: &ImageCache,
    layout: &GridLayout,
    canvas_side: u32,
    background: Rgba8,
) -> CollageResult<Collage> {
    if canvas_side == 0 {
        return Err(CollageError::validation("canvas_side must be > 0"));
    }

    let mut canvas = RgbaImage::from_pixel(canvas_side, canvas_side, Rgba(background));

    let tiles: Vec<Option<Tile<'_>>> = request
        .assets()
        .par_iter()
        .enumerate()
        .map(|(i, asset)| {
            let cell = layout.cell(i)?;
            let img = cache.get(asset)?;
            prepare_tile(img.pixels(), cell, canvas_side)
        })
        .collect();

    let mut filled = vec![false; request.len()];
    for (i, tile) in tiles.into_iter().enumerate() {
        let Some(tile) = tile else {
            continue;
        };
        blit(&mut canvas, &tile);
        filled[i] = true;
    }

    let drawn = filled.iter().filter(|f| **f).count();
    if drawn == 0 {
        tracing::warn!("no cell received an image; composite is background only");
    } else {
        tracing::debug!(drawn, empty = request.len() - drawn, "composited");
    }

    Ok(Collage {
        request: request.clone(),
        image: canvas,
        filled,
    })
}

/// Hand `collage` to `store`. Store errors are returned as-is; nothing is retried.
#[tracing::instrument(skip_all)]
pub fn persist(collage: Collage, store: &dyn PhotoStore) -> CollageResult<SavedCollage> {
    let stored = store.commit(&collage.image)?;
    tracing::info!(stored = %stored, cells = collage.filled.len(), "collage saved");
    Ok(SavedCollage { collage, stored })
}

fn prepare_tile<'a>(src: &'a RgbaImage, cell: Rect, canvas_side: u32) -> Option<Tile<'a>> {
    let side = f64::from(canvas_side);
    let clip_x0 = cell.x0.round().clamp(0.0, side) as u32;
    let clip_y0 = cell.y0.round().clamp(0.0, side) as u32;
    let clip_x1 = cell.x1.round().clamp(0.0, side) as u32;
    let clip_y1 = cell.y1.round().clamp(0.0, side) as u32;
    if clip_x1 <= clip_x0 || clip_y1 <= clip_y0 || src.width() == 0 || src.height() == 0 {
        return None;
    }

    let draw = aspect_fill_rect(
        Size::new(f64::from(src.width()), f64::from(src.height())),
        cell,
    );
    // Snap outward so the scaled image covers every pixel of the clip.
    let (x0p, y0p) = (draw.x0.floor(), draw.y0.floor());
    let dw = ((draw.x1.ceil() - x0p) as u32).max(1);
    let dh = ((draw.y1.ceil() - y0p) as u32).max(1);
    let pixels = if src.dimensions() == (dw, dh) {
        Cow::Borrowed(src)
    } else {
        Cow::Owned(image::imageops::resize(src, dw, dh, FilterType::Lanczos3))
    };

    Some(Tile {
        clip: (clip_x0, clip_y0, clip_x1, clip_y1),
        origin: (x0p as i64, y0p as i64),
        pixels,
    })
}

fn blit(canvas: &mut RgbaImage, tile: &Tile<'_>) {
    let (x0, y0, x1, y1) = tile.clip;
    let (ox, oy) = tile.origin;
    let (tw, th) = (i64::from(tile.pixels.width()), i64::from(tile.pixels.height()));
    for y in y0..y1 {
        let sy = i64::from(y) - oy;
        if sy < 0 || sy >= th {
            continue;
        }
        for x in x0..x1 {
            let sx = i64::from(x) - ox;
            if sx < 0 || sx >= tw {
                continue;
            }
            let src = tile.pixels.get_pixel(sx as u32, sy as u32).0;
            let dst = canvas.get_pixel_mut(x, y);
            dst.0 = over_straight(dst.0, src);
        }
    }
}

/// Straight-alpha source-over.
fn over_straight(dst: Rgba8, src: Rgba8) -> Rgba8 {
    let sa = u16::from(src[3]);
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let inv = 255 - sa;
    let da = mul_div255(u16::from(dst[3]), inv);
    let out_a = u16::from(src[3]) + u16::from(da);
    if out_a == 0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for i in 0..3 {
        let num = u32::from(src[i]) * u32::from(sa) + u32::from(dst[i]) * u32::from(da);
        out[i] = ((num + u32::from(out_a) / 2) / u32::from(out_a)).min(255) as u8;
    }
    out[3] = out_a.min(255) as u8;
    out
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/composite/compositor.rs"]
mod tests;
