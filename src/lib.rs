//! Collage composes 2 to 9 photos into one square grid image and commits it to a photo store.
//!
//! The pipeline runs in four stages:
//!
//! - pick photos into a [`Selection`] and freeze it into a [`CollageRequest`]
//! - decode every asset concurrently through an [`Orchestrator`] into an [`ImageCache`]
//! - compute the grid with [`compute_layout`]
//! - [`render`] the composite with aspect-fill cropping and [`persist`] it to a [`PhotoStore`]
//!
//! [`CollageSession`] wires the stages together for a presentation layer.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod acquire;
mod catalog;
mod composite;
mod config;
mod foundation;
mod layout;
mod selection;
mod session;
mod store;

pub use crate::acquire::cache::ImageCache;
pub use crate::acquire::orchestrator::{
    Acquired, AcquisitionHandle, AcquisitionProgress, Orchestrator,
};
pub use crate::catalog::dir::DirCatalog;
pub use crate::catalog::memory::MemoryCatalog;
pub use crate::catalog::source::{AssetCatalog, DecodeQuality, DecodeRequest, DecodedImage};
pub use crate::composite::compositor::{Collage, SavedCollage, persist, render};
pub use crate::composite::fill::aspect_fill_rect;
pub use crate::config::opts::{
    CollageOpts, DEFAULT_CANVAS_SIDE, DEFAULT_PREVIEW_SPACING, DEFAULT_SPACING,
};
pub use crate::foundation::core::{AssetId, AssetInfo, Point, Rect, Rgba8, Size, StoredAssetId};
pub use crate::foundation::error::{CollageError, CollageResult};
pub use crate::layout::grid::{GridLayout, LayoutFn, MAX_GRID_DIM, compute_layout, grid_dimensions};
pub use crate::selection::picker::{CollageRequest, MAX_PHOTOS, MIN_PHOTOS, Selection, Toggle};
pub use crate::session::collage_session::{CollageSession, SessionEvent, SessionStatus};
pub use crate::store::dir::{DirPhotoStore, StoreFormat};
pub use crate::store::sink::{MemoryPhotoStore, PhotoStore};
