//! Pure Rust image processing backend — no external binaries.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, WebP) | `image` crate (pure Rust decoders) |
//! | Alpha / palette flattening | manual composite onto a white canvas |
//! | Stretch resize | `image::imageops::resize` with `Lanczos3` |
//! | Fit-and-pad resize | [`fit_within`](super::fit_within) + resize + `imageops::overlay` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |

use super::backend::{Dimensions, ImageBackend, ImageError};
use super::calculations::{center_offset, fit_within};
use super::params::{CropArea, ImageGeometry, Quality, ResizeMode, TransformParams};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader, Rgb, RgbImage};
use std::path::Path;

/// Extensions the engine accepts as staged uploads. Everything decodes
/// through the `image` crate; output is always JPEG.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// True when the path carries an extension from [`SUPPORTED_EXTENSIONS`].
pub fn is_supported_source(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Pure Rust backend using the `image` crate ecosystem.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, ImageError> {
    ImageReader::open(path)
        .map_err(ImageError::Io)?
        .decode()
        .map_err(|e| ImageError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Flatten any alpha or palette source onto a white background.
///
/// JPEG has no alpha channel, so transparent regions must become white
/// before encoding rather than defaulting to black.
fn flatten_onto_white(img: DynamicImage) -> RgbImage {
    match img {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => {
            let rgba = other.to_rgba8();
            let (width, height) = rgba.dimensions();
            let mut out = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
            for (x, y, px) in rgba.enumerate_pixels() {
                let alpha = px[3] as u32;
                let dest = out.get_pixel_mut(x, y);
                for channel in 0..3 {
                    let src = px[channel] as u32;
                    dest[channel] = ((src * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
                }
            }
            out
        }
    }
}

/// Map an image onto its target geometry.
fn resize_to_geometry(img: RgbImage, geometry: &ImageGeometry) -> RgbImage {
    match geometry.mode {
        ResizeMode::Fill => {
            imageops::resize(&img, geometry.width, geometry.height, FilterType::Lanczos3)
        }
        ResizeMode::FitPad => {
            let source = img.dimensions();
            let bounds = (geometry.width, geometry.height);
            let (fit_w, fit_h) = fit_within(source, bounds);

            let scaled = if (fit_w, fit_h) == source {
                img
            } else {
                imageops::resize(&img, fit_w, fit_h, FilterType::Lanczos3)
            };

            let mut canvas = RgbImage::from_pixel(bounds.0, bounds.1, Rgb([255, 255, 255]));
            let (dx, dy) = center_offset((fit_w, fit_h), bounds);
            imageops::overlay(&mut canvas, &scaled, dx, dy);
            canvas
        }
    }
}

fn apply_crop(img: RgbImage, area: CropArea) -> RgbImage {
    imageops::crop_imm(&img, area.x, area.y, area.width, area.height).to_image()
}

/// Encode as JPEG at the given quality.
fn save_jpeg(img: &RgbImage, path: &Path, quality: Quality) -> Result<(), ImageError> {
    let file = std::fs::File::create(path).map_err(ImageError::Io)?;
    let writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality.value() as u8);
    img.write_with_encoder(encoder)
        .map_err(|e| ImageError::Encode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, ImageError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| match e {
            image::ImageError::IoError(io) => ImageError::Io(io),
            other => ImageError::Decode {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })?;
        Ok(Dimensions { width, height })
    }

    fn transform(&self, params: &TransformParams) -> Result<(), ImageError> {
        let img = load_image(&params.source)?;
        let mut rgb = flatten_onto_white(img);

        if let Some(area) = params.crop {
            rgb = apply_crop(rgb, area);
        }

        let finished = resize_to_geometry(rgb, &params.geometry);
        save_jpeg(&finished, &params.output, params.quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::{FEATURED_WIDE, SQUARE_IMAGE};
    use image::ImageEncoder;

    /// Create a small valid JPEG file with the given dimensions.
    fn create_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let file = std::fs::File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        image::codecs::jpeg::JpegEncoder::new(writer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    /// Create a solid-color JPEG.
    fn create_solid_jpeg(path: &Path, width: u32, height: u32, color: [u8; 3]) {
        let img = RgbImage::from_pixel(width, height, Rgb(color));
        let file = std::fs::File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        image::codecs::jpeg::JpegEncoder::new(writer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    /// Create a fully transparent RGBA PNG.
    fn create_transparent_png(path: &Path, width: u32, height: u32) {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, 0]));
        let file = std::fs::File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        image::codecs::png::PngEncoder::new(writer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
            .unwrap();
    }

    fn output_dimensions(path: &Path) -> (u32, u32) {
        image::image_dimensions(path).unwrap()
    }

    #[test]
    fn supported_extensions_cover_upload_formats() {
        for expected in &["jpg", "jpeg", "png", "gif", "webp"] {
            assert!(SUPPORTED_EXTENSIONS.contains(expected));
        }
        assert!(is_supported_source(Path::new("photo.JPG")));
        assert!(!is_supported_source(Path::new("notes.txt")));
        assert!(!is_supported_source(Path::new("no_extension")));
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 200, 150);

        let backend = RustBackend::new();
        let dims = backend.identify(&path).unwrap();
        assert_eq!(dims.width, 200);
        assert_eq!(dims.height, 150);
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let backend = RustBackend::new();
        let result = backend.identify(Path::new("/nonexistent/image.jpg"));
        assert!(matches!(result, Err(ImageError::Io(_))));
    }

    #[test]
    fn fit_pad_lands_on_exact_square() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 1400, 700);

        let output = tmp.path().join("out.jpg");
        let backend = RustBackend::new();
        backend
            .transform(&TransformParams {
                source,
                output: output.clone(),
                crop: None,
                geometry: SQUARE_IMAGE,
                quality: Quality::default(),
            })
            .unwrap();

        assert_eq!(output_dimensions(&output), (700, 700));
    }

    #[test]
    fn fill_stretches_to_exact_target() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 400, 300);

        let output = tmp.path().join("out.jpg");
        let backend = RustBackend::new();
        backend
            .transform(&TransformParams {
                source,
                output: output.clone(),
                crop: None,
                geometry: FEATURED_WIDE,
                quality: Quality::default(),
            })
            .unwrap();

        assert_eq!(output_dimensions(&output), (800, 450));
    }

    #[test]
    fn small_source_is_padded_not_upscaled() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_solid_jpeg(&source, 100, 80, [20, 20, 20]);

        let output = tmp.path().join("out.jpg");
        let backend = RustBackend::new();
        backend
            .transform(&TransformParams {
                source,
                output: output.clone(),
                crop: None,
                geometry: SQUARE_IMAGE,
                quality: Quality::default(),
            })
            .unwrap();

        assert_eq!(output_dimensions(&output), (700, 700));

        let decoded = image::open(&output).unwrap().to_rgb8();
        // Corner is padding (white), center is the dark content.
        let corner = decoded.get_pixel(5, 5);
        assert!(corner[0] > 240 && corner[1] > 240 && corner[2] > 240);
        let center = decoded.get_pixel(350, 350);
        assert!(center[0] < 100 && center[1] < 100 && center[2] < 100);
    }

    #[test]
    fn crop_selects_requested_region() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        // Left half red, right half blue.
        let img = RgbImage::from_fn(200, 100, |x, _| {
            if x < 100 {
                Rgb([220, 30, 30])
            } else {
                Rgb([30, 30, 220])
            }
        });
        let file = std::fs::File::create(&source).unwrap();
        image::codecs::jpeg::JpegEncoder::new(std::io::BufWriter::new(file))
            .write_image(img.as_raw(), 200, 100, image::ExtendedColorType::Rgb8)
            .unwrap();

        let output = tmp.path().join("out.jpg");
        let backend = RustBackend::new();
        backend
            .transform(&TransformParams {
                source,
                output: output.clone(),
                crop: Some(CropArea {
                    x: 0,
                    y: 0,
                    width: 100,
                    height: 100,
                }),
                geometry: ImageGeometry {
                    width: 50,
                    height: 50,
                    aspect: (1, 1),
                    mode: ResizeMode::Fill,
                },
                quality: Quality::new(95),
            })
            .unwrap();

        assert_eq!(output_dimensions(&output), (50, 50));
        let decoded = image::open(&output).unwrap().to_rgb8();
        let center = decoded.get_pixel(25, 25);
        assert!(center[0] > 150, "expected the red half, got {center:?}");
        assert!(center[2] < 100, "expected the red half, got {center:?}");
    }

    #[test]
    fn transparent_png_flattens_to_white() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        create_transparent_png(&source, 300, 300);

        let output = tmp.path().join("out.jpg");
        let backend = RustBackend::new();
        backend
            .transform(&TransformParams {
                source,
                output: output.clone(),
                crop: None,
                geometry: SQUARE_IMAGE,
                quality: Quality::default(),
            })
            .unwrap();

        let decoded = image::open(&output).unwrap().to_rgb8();
        let center = decoded.get_pixel(350, 350);
        assert!(center[0] > 240 && center[1] > 240 && center[2] > 240);
    }

    #[test]
    fn corrupt_source_reports_decode_step() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        std::fs::write(&source, b"definitely not a jpeg").unwrap();

        let output = tmp.path().join("out.jpg");
        let backend = RustBackend::new();
        let err = backend
            .transform(&TransformParams {
                source,
                output,
                crop: None,
                geometry: SQUARE_IMAGE,
                quality: Quality::default(),
            })
            .unwrap_err();

        assert!(matches!(err, ImageError::Decode { .. }));
    }
}
