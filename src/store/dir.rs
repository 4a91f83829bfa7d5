use crate::foundation::core::StoredAssetId;
use crate::foundation::error::{CollageError, CollageResult};
use crate::store::sink::PhotoStore;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Encoding used by [`DirPhotoStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreFormat {
    /// Lossless PNG, keeps alpha.
    Png,
    /// JPEG at the given quality (1..=100); alpha is dropped.
    Jpeg {
        /// Encoder quality.
        quality: u8,
    },
}

impl StoreFormat {
    fn extension(self) -> &'static str {
        match self {
            StoreFormat::Png => "png",
            StoreFormat::Jpeg { .. } => "jpg",
        }
    }
}

/// Photo store writing each composite as a new file in one directory.
///
/// Files are encoded to a hidden temporary name and renamed into place, so a failed commit never
/// leaves a visible partial asset.
#[derive(Debug)]
pub struct DirPhotoStore {
    dir: PathBuf,
    format: StoreFormat,
    seq: AtomicU64,
}

impl DirPhotoStore {
    /// Store into `dir`, created on first commit if missing.
    pub fn new(dir: impl Into<PathBuf>, format: StoreFormat) -> CollageResult<Self> {
        if let StoreFormat::Jpeg { quality } = format
            && !(1..=100).contains(&quality)
        {
            return Err(CollageError::validation("jpeg quality must be in 1..=100"));
        }
        Ok(Self {
            dir: dir.into(),
            format,
            seq: AtomicU64::new(0),
        })
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn next_name(&self) -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!(
            "collage-{nanos}-{}-{seq}.{}",
            std::process::id(),
            self.format.extension()
        )
    }

    fn encode_to(&self, path: &Path, image: &RgbaImage) -> anyhow::Result<()> {
        let f = File::create(path)?;
        let mut w = BufWriter::new(f);
        match self.format {
            StoreFormat::Png => image.write_to(&mut w, ImageFormat::Png)?,
            StoreFormat::Jpeg { quality } => {
                let rgb = DynamicImage::ImageRgba8(image.clone()).into_rgb8();
                JpegEncoder::new_with_quality(&mut w, quality).encode_image(&rgb)?;
            }
        }
        w.flush()?;
        w.get_ref().sync_all()?;
        Ok(())
    }
}

impl PhotoStore for DirPhotoStore {
    #[tracing::instrument(skip(self, image), fields(dir = %self.dir.display()))]
    fn commit(&self, image: &RgbaImage) -> CollageResult<StoredAssetId> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            CollageError::persistence(format!(
                "create store dir '{}': {e}",
                self.dir.display()
            ))
        })?;

        let name = self.next_name();
        let tmp = self.dir.join(format!(".{name}.tmp"));
        let dst = self.dir.join(&name);

        let written = self
            .encode_to(&tmp, image)
            .and_then(|()| std::fs::rename(&tmp, &dst).map_err(anyhow::Error::from));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp);
            return Err(CollageError::persistence(format!(
                "write '{}': {e:#}",
                dst.display()
            )));
        }
        Ok(StoredAssetId(name))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/dir.rs"]
mod tests;
