//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: identify (dimension probe) and transform (the full
//! normalize → crop → resize → encode sequence from
//! [`TransformParams`]).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) — pure Rust, statically
//! linked, no external binaries.

use super::params::TransformParams;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error from the image layer, tagged with the step that failed.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported source image: {0}")]
    UnsupportedSource(PathBuf),
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("failed to encode {path}: {reason}")]
    Encode { path: PathBuf, reason: String },
    #[error("failed to move output into place: {0}")]
    Persist(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// Both operations must be implemented so the pipeline stays
/// backend-agnostic; tests substitute a recording mock.
pub trait ImageBackend: Sync {
    /// Get source image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, ImageError>;

    /// Execute a full transformation (normalize, optional crop, resize,
    /// encode) from `params.source` to `params.output`.
    fn transform(&self, params: &TransformParams) -> Result<(), ImageError>;
}
