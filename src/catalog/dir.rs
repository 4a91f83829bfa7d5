use crate::catalog::decode::decode_bytes;
use crate::catalog::source::{AssetCatalog, DecodeRequest, DecodedImage};
use crate::foundation::core::{AssetId, AssetInfo};
use crate::foundation::error::{CollageError, CollageResult};
use anyhow::Context as _;
use std::path::{Path, PathBuf};

/// Catalog over the image files of one directory. Asset ids are file names.
#[derive(Clone, Debug)]
pub struct DirCatalog {
    root: PathBuf,
}

impl DirCatalog {
    /// Open a catalog rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> CollageResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(CollageError::validation(format!(
                "catalog root '{}' is not a directory",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    /// Catalog directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &AssetId) -> CollageResult<PathBuf> {
        let name = id.as_str();
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(CollageError::decode(id, "asset id must be a plain file name"));
        }
        Ok(self.root.join(name))
    }
}

impl AssetCatalog for DirCatalog {
    fn assets(&self) -> CollageResult<Vec<AssetInfo>> {
        let entries = std::fs::read_dir(&self.root)
            .with_context(|| format!("read catalog dir '{}'", self.root.display()))?;

        let mut out = Vec::new();
        for entry in entries {
            let entry =
                entry.with_context(|| format!("read catalog dir '{}'", self.root.display()))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            match image::image_dimensions(&path) {
                Ok((width, height)) => out.push(AssetInfo {
                    id: AssetId::new(name),
                    width,
                    height,
                }),
                Err(e) => tracing::debug!(file = %path.display(), error = %e, "skipping non-image"),
            }
        }
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }

    fn decode(&self, id: &AssetId, req: &DecodeRequest) -> CollageResult<DecodedImage> {
        let path = self.path_for(id)?;
        let bytes = std::fs::read(&path)
            .map_err(|e| CollageError::decode(id, format!("read '{}': {e}", path.display())))?;
        let pixels = decode_bytes(&bytes, req).map_err(|e| CollageError::decode(id, e.to_string()))?;
        Ok(DecodedImage::new(pixels))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/dir.rs"]
mod tests;
