//! Pure calculation functions for crop and resize geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::{CropArea, CropRect};

/// Clamp an author-submitted crop rectangle to the source image bounds.
///
/// Fractional coordinates are truncated toward zero first. The origin is
/// clamped into the image, then the extent is shrunk so the rectangle never
/// reaches past the right or bottom edge. A request whose truncated width or
/// height is not positive yields `None`, meaning the crop step is skipped
/// and the full image is used.
///
/// # Arguments
/// * `rect` - Requested crop rectangle, possibly fractional or out of bounds
/// * `source` - Source image dimensions as (width, height)
///
/// # Returns
/// * `Some(CropArea)` fully inside the source, or `None` to skip cropping
///
/// # Examples
/// ```
/// # use blockscribe::imaging::{clamp_crop, CropRect};
/// // Overshooting the right edge shrinks the width.
/// let area = clamp_crop(CropRect::new(150.0, 0.0, 100.0, 100.0), (200, 200)).unwrap();
/// assert_eq!((area.x, area.width), (150, 50));
///
/// // A zero-area request skips cropping entirely.
/// assert!(clamp_crop(CropRect::new(0.0, 0.0, 0.0, 50.0), (200, 200)).is_none());
/// ```
pub fn clamp_crop(rect: CropRect, source: (u32, u32)) -> Option<CropArea> {
    let (src_w, src_h) = (source.0 as i64, source.1 as i64);
    if src_w == 0 || src_h == 0 {
        return None;
    }

    let req_w = rect.width.trunc() as i64;
    let req_h = rect.height.trunc() as i64;
    if req_w <= 0 || req_h <= 0 {
        return None;
    }

    let x = (rect.x.trunc() as i64).clamp(0, src_w - 1);
    let y = (rect.y.trunc() as i64).clamp(0, src_h - 1);
    let width = req_w.min(src_w - x);
    let height = req_h.min(src_h - y);

    Some(CropArea {
        x: x as u32,
        y: y as u32,
        width: width as u32,
        height: height as u32,
    })
}

/// Calculate the scaled dimensions of a source fitted inside a bounding box.
///
/// Downscale-only: a source already inside the box keeps its dimensions and
/// is merely centered on the canvas by the backend. Larger sources are scaled
/// to the largest size that fits while preserving aspect ratio.
///
/// # Arguments
/// * `source` - Source image dimensions (width, height)
/// * `bounds` - Bounding box dimensions (width, height)
///
/// # Returns
/// * `(width, height)` - Dimensions after fitting, both at least 1
pub fn fit_within(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if src_w <= max_w && src_h <= max_h {
        return (src_w, src_h);
    }

    let scale = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    let w = (src_w as f64 * scale).round() as u32;
    let h = (src_h as f64 * scale).round() as u32;
    (w.max(1), h.max(1))
}

/// Offset that centers an inner rectangle inside an outer one.
///
/// Returned as `i64` because that is what pixel overlay takes. Inner
/// dimensions larger than the outer ones are treated as flush (offset 0).
pub fn center_offset(inner: (u32, u32), outer: (u32, u32)) -> (i64, i64) {
    let dx = outer.0.saturating_sub(inner.0) / 2;
    let dy = outer.1.saturating_sub(inner.1) / 2;
    (dx as i64, dy as i64)
}
