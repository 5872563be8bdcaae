//! High-level pipeline: staged upload in, stored block image out.
//!
//! [`ImagePipeline::process`] owns everything around the pixel work: staged
//! source validation, crop clamping, output naming, the
//! temp-file-then-rename write, and cleanup of the staged file. The pixel
//! work itself goes through an [`ImageBackend`], so tests can drive the
//! pipeline with a recording mock.
//!
//! Output files are named `block_<label>_<unix-ts>_<hash>.jpg` under
//! `<storage_root>/<block_dir>`; callers get back the storage-relative path
//! (`<block_dir>/<filename>`), never an absolute one.

use super::backend::{ImageBackend, ImageError};
use super::calculations::clamp_crop;
use super::params::{CropRect, ImageGeometry, Quality, TransformParams};
use super::rust_backend::is_supported_source;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Where and how stored block images are written.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Storage root that all relative paths resolve against.
    pub storage_root: PathBuf,
    /// Subdirectory under the root where block images land.
    pub block_dir: String,
    pub quality: Quality,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("static"),
            block_dir: "uploads/blocks".to_string(),
            quality: Quality::default(),
        }
    }
}

/// The image transformation pipeline for one storage root.
pub struct ImagePipeline<B: ImageBackend> {
    backend: B,
    config: PipelineConfig,
}

impl<B: ImageBackend> ImagePipeline<B> {
    pub fn new(backend: B, config: PipelineConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Transform a staged source image into a stored block image.
    ///
    /// The staged file is consumed: it is removed when processing succeeds
    /// *and* when it fails, so the staging area never accumulates leftovers.
    /// The output is written to a random temp name in the destination
    /// directory and renamed into place, so an interrupted process never
    /// leaves a half-written file at the final path.
    ///
    /// `label` tags the output filename with the block type it belongs to.
    /// Returns the storage-relative path of the stored image.
    pub fn process(
        &self,
        staged: &Path,
        label: &str,
        geometry: &ImageGeometry,
        crop: Option<CropRect>,
    ) -> Result<String, ImageError> {
        let result = self.run(staged, label, geometry, crop);
        discard_staged(staged);
        result
    }

    fn run(
        &self,
        staged: &Path,
        label: &str,
        geometry: &ImageGeometry,
        crop: Option<CropRect>,
    ) -> Result<String, ImageError> {
        if !is_supported_source(staged) {
            return Err(ImageError::UnsupportedSource(staged.to_path_buf()));
        }

        let dims = self.backend.identify(staged)?;
        let area = crop.and_then(|rect| {
            let clamped = clamp_crop(rect, (dims.width, dims.height));
            if clamped.is_none() {
                log::warn!(
                    "degenerate crop {rect:?} for {}, using the full image",
                    staged.display()
                );
            }
            clamped
        });

        let dir = self.config.storage_root.join(&self.config.block_dir);
        fs::create_dir_all(&dir)?;

        let filename = output_filename(staged, label)?;
        let final_path = dir.join(&filename);

        let tmp = tempfile::NamedTempFile::new_in(&dir)?;
        self.backend.transform(&TransformParams {
            source: staged.to_path_buf(),
            output: tmp.path().to_path_buf(),
            crop: area,
            geometry: *geometry,
            quality: self.config.quality,
        })?;
        tmp.persist(&final_path)
            .map_err(|e| ImageError::Persist(e.to_string()))?;

        log::info!("stored block image {}", final_path.display());
        Ok(format!("{}/{}", self.config.block_dir, filename))
    }

    /// Remove a stored block image by its storage-relative path.
    ///
    /// Best-effort: a missing file is fine (the block may never have had its
    /// image written), other failures are logged and swallowed.
    pub fn remove_stored(&self, relative: &str) {
        // Stored paths never contain parent components; refuse any that do.
        if relative.split('/').any(|part| part == "..") {
            log::warn!("refusing to remove suspicious path {relative}");
            return;
        }

        let path = self.config.storage_root.join(relative);
        match fs::remove_file(&path) {
            Ok(()) => log::info!("removed stored block image {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("could not remove {}: {e}", path.display()),
        }
    }
}

/// `block_<label>_<unix-ts>_<hash-prefix>.jpg`.
///
/// The timestamp keeps names chronologically greppable; the content-hash
/// prefix keeps two same-second uploads of different images from colliding.
fn output_filename(staged: &Path, label: &str) -> Result<String, ImageError> {
    let stamp = chrono::Utc::now().timestamp();
    let digest = hash_prefix(staged)?;
    Ok(format!("block_{label}_{stamp}_{digest}.jpg"))
}

fn hash_prefix(path: &Path) -> Result<String, ImageError> {
    let data = fs::read(path)?;
    let mut hex = format!("{:x}", Sha256::digest(&data));
    hex.truncate(8);
    Ok(hex)
}

fn discard_staged(staged: &Path) {
    match fs::remove_file(staged) {
        Ok(()) => log::debug!("discarded staged upload {}", staged.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!(
            "could not discard staged upload {}: {e}",
            staged.display()
        ),
    }
}
