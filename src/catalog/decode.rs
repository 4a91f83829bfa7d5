use crate::catalog::source::{DecodeQuality, DecodeRequest};
use image::{DynamicImage, RgbaImage, imageops::FilterType};

/// Decode encoded image bytes and fit them to `req`.
pub(crate) fn decode_bytes(bytes: &[u8], req: &DecodeRequest) -> anyhow::Result<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes)?;
    Ok(fit_to_target(dyn_img, req))
}

/// Downscale so the smaller side just covers `req.target_side`; never upscale.
pub(crate) fn fit_to_target(img: DynamicImage, req: &DecodeRequest) -> RgbaImage {
    let (w, h) = (img.width(), img.height());
    let Some((tw, th)) = cover_size(w, h, req.target_side) else {
        return img.into_rgba8();
    };
    let filter = match req.quality {
        DecodeQuality::Fast => FilterType::Triangle,
        DecodeQuality::High => FilterType::Lanczos3,
    };
    img.resize_exact(tw, th, filter).into_rgba8()
}

/// Size of `w x h` scaled to cover a `target` square, or `None` when no downscale is needed.
pub(crate) fn cover_size(w: u32, h: u32, target: u32) -> Option<(u32, u32)> {
    if w == 0 || h == 0 || target == 0 {
        return None;
    }
    let scale = (f64::from(target) / f64::from(w)).max(f64::from(target) / f64::from(h));
    if scale >= 1.0 {
        return None;
    }
    let tw = ((f64::from(w) * scale).round() as u32).max(target.min(w));
    let th = ((f64::from(h) * scale).round() as u32).max(target.min(h));
    Some((tw, th))
}
