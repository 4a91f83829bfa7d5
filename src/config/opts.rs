use crate::foundation::core::Rgba8;
use crate::foundation::error::{CollageError, CollageResult};
use crate::layout::grid::MAX_GRID_DIM;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// Default output side of the square composite, in pixels.
pub const DEFAULT_CANVAS_SIDE: u32 = 1080;
/// Default gap between cells in the final render, in pixels.
pub const DEFAULT_SPACING: f64 = 4.0;
/// Default gap between cells on a live preview surface.
pub const DEFAULT_PREVIEW_SPACING: f64 = 2.0;

/// Tunables for one collage pipeline.
///
/// Loadable from JSON; every field is optional in the file and falls back to [`Default`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollageOpts {
    /// Side of the square output canvas in pixels.
    pub canvas_side: u32,
    /// Gap between cells (and around the border) in the final render.
    pub spacing: f64,
    /// Gap used by [`crate::CollageSession::preview_layout`].
    pub preview_spacing: f64,
    /// Canvas fill color, straight RGBA8.
    pub background: Rgba8,
    /// Square decode target requested from the catalog.
    pub target_side: u32,
    /// Decode worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Upper bound on waiting for acquisition before composing with partial coverage.
    pub acquire_timeout_ms: Option<u64>,
    /// Fail instead of persisting a background-only composite when nothing decoded.
    pub require_any_image: bool,
}

impl Default for CollageOpts {
    fn default() -> Self {
        Self {
            canvas_side: DEFAULT_CANVAS_SIDE,
            spacing: DEFAULT_SPACING,
            preview_spacing: DEFAULT_PREVIEW_SPACING,
            background: [0, 0, 0, 255],
            target_side: DEFAULT_CANVAS_SIDE,
            threads: None,
            acquire_timeout_ms: None,
            require_any_image: false,
        }
    }
}

impl CollageOpts {
    /// Parse options from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> CollageResult<Self> {
        let opts: Self = serde_json::from_reader(r)
            .map_err(|e| CollageError::validation(format!("parse collage options JSON: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Parse options from a JSON string.
    pub fn from_json_str(s: &str) -> CollageResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse options from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> CollageResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CollageError::validation(format!("open collage options '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check that the options describe a renderable collage.
    pub fn validate(&self) -> CollageResult<()> {
        if self.canvas_side == 0 {
            return Err(CollageError::validation("canvas_side must be > 0"));
        }
        if self.target_side == 0 {
            return Err(CollageError::validation("target_side must be > 0"));
        }
        for (name, v) in [
            ("spacing", self.spacing),
            ("preview_spacing", self.preview_spacing),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(CollageError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        let gaps = self.spacing * f64::from(MAX_GRID_DIM + 1);
        if gaps >= f64::from(self.canvas_side) {
            return Err(CollageError::validation(format!(
                "spacing {} leaves no room for a {MAX_GRID_DIM}x{MAX_GRID_DIM} grid on a {}px canvas",
                self.spacing, self.canvas_side
            )));
        }
        if self.threads == Some(0) {
            return Err(CollageError::validation("threads must be >= 1 when set"));
        }
        Ok(())
    }

    /// Acquisition wait bound as a [`Duration`].
    pub fn acquire_timeout(&self) -> Option<Duration> {
        self.acquire_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/opts.rs"]
mod tests;
