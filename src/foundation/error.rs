use crate::foundation::core::AssetId;

/// Result alias used throughout the crate.
pub type CollageResult<T> = Result<T, CollageError>;

/// Errors produced by the collage pipeline.
#[derive(thiserror::Error, Debug)]
pub enum CollageError {
    /// A collage was requested with fewer photos than the minimum.
    #[error("insufficient selection: {selected} selected, at least {required} required")]
    InsufficientSelection {
        /// Number of photos currently selected.
        selected: usize,
        /// Minimum number of photos for a collage.
        required: usize,
    },

    /// Invalid inputs or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// A single asset failed to decode. Absorbed by acquisition.
    #[error("asset decode failure: {asset}: {reason}")]
    Decode {
        /// The asset that could not be decoded.
        asset: AssetId,
        /// Human-readable cause.
        reason: String,
    },

    /// Committing the composite to the photo store failed.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// No asset of the request decoded and the strict blank-composite policy is enabled.
    #[error("no images decoded: all {total} assets failed or are still pending")]
    NoImagesDecoded {
        /// Number of distinct assets in the request.
        total: usize,
    },

    /// Wrapped lower-level error (I/O, codecs).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CollageError {
    /// Build a [`CollageError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CollageError::Decode`] for `asset`.
    pub fn decode(asset: &AssetId, reason: impl Into<String>) -> Self {
        Self::Decode {
            asset: asset.clone(),
            reason: reason.into(),
        }
    }

    /// Build a [`CollageError::Persistence`].
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
