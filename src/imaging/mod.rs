//! Image processing — pure Rust, no external binaries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Normalize** | alpha/palette flattened onto white |
//! | **Crop** | clamped rect + `imageops::crop_imm` |
//! | **Resize** | Lanczos3, fit-and-pad or stretch per geometry |
//! | **Encode** | JPEG, temp-file-then-rename |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop/fit math (unit testable)
//! - **Parameters**: Data structures describing one transformation
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Pipeline**: Staging, naming, atomic writes, cleanup

pub mod backend;
mod calculations;
mod params;
pub mod pipeline;
pub mod rust_backend;

pub use backend::{Dimensions, ImageBackend, ImageError};
pub use calculations::{center_offset, clamp_crop, fit_within};
pub use params::{
    CropArea, CropRect, FEATURED_HERO, FEATURED_WIDE, ImageGeometry, Quality, ResizeMode,
    SQUARE_IMAGE, TransformParams,
};
pub use pipeline::{ImagePipeline, PipelineConfig};
pub use rust_backend::{RustBackend, SUPPORTED_EXTENSIONS, is_supported_source};
