//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`pipeline`](super::pipeline) module (which decides
//! which images to produce and where they land) and the
//! [`backend`](super::backend) (which does the actual pixel work). The split
//! allows swapping backends (e.g. for testing with a mock) without changing
//! pipeline logic.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100, default 85). Clamped on construction.
//! - [`CropRect`] — Author-submitted crop rectangle, possibly fractional or out of bounds.
//! - [`CropArea`] — A crop rectangle already clamped to source bounds; what backends receive.
//! - [`ResizeMode`] — Fit-inside-and-pad versus stretch-to-fill.
//! - [`ImageGeometry`] — Target dimensions plus resize mode for one block type.
//! - [`TransformParams`] — Full specification for one transformation: source, output, crop, geometry, quality.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Quality setting for JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Crop rectangle as submitted by an author, in source-image pixel space.
///
/// Crop UIs send fractional coordinates and routinely overshoot the image
/// edges, so fields are floats and nothing is validated at this layer.
/// [`clamp_crop`](super::clamp_crop) truncates and clamps a `CropRect` into a
/// [`CropArea`] before any pixels are touched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A crop rectangle known to lie fully inside its source image.
///
/// Only produced by [`clamp_crop`](super::clamp_crop), so holding one is
/// proof that `x + width <= source_width`, `y + height <= source_height`,
/// and both sides are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropArea {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// How a source image is mapped onto its target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    /// Scale to fit inside the box preserving aspect ratio, centered on a
    /// white canvas. Output always has the exact box dimensions.
    FitPad,
    /// Scale directly to the box dimensions, distorting aspect ratio if the
    /// source does not match.
    Fill,
}

/// Target geometry for one image-bearing block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageGeometry {
    pub width: u32,
    pub height: u32,
    /// Nominal aspect ratio, for labeling and sanity checks.
    pub aspect: (u32, u32),
    pub mode: ResizeMode,
}

/// Square inline image: fit inside 700x700 and pad, never stretch.
pub const SQUARE_IMAGE: ImageGeometry = ImageGeometry {
    width: 700,
    height: 700,
    aspect: (1, 1),
    mode: ResizeMode::FitPad,
};

/// Featured image: stretch to 800x450. The crop step, when present, has
/// already established the framing, so distortion is accepted.
pub const FEATURED_WIDE: ImageGeometry = ImageGeometry {
    width: 800,
    height: 450,
    aspect: (16, 9),
    mode: ResizeMode::Fill,
};

/// Hero rendition of the featured image: stretch to 1200x675.
pub const FEATURED_HERO: ImageGeometry = ImageGeometry {
    width: 1200,
    height: 675,
    aspect: (16, 9),
    mode: ResizeMode::Fill,
};

/// Parameters for one complete transformation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Already clamped; `None` means the crop step is skipped.
    pub crop: Option<CropArea>,
    pub geometry: ImageGeometry,
    pub quality: Quality,
}
