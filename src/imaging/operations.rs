//! High-level image operations.
//!
//! These functions combine configuration with backend execution: they decide
//! what to ask for and hand the request to an [`ImageBackend`].

use super::backend::{CropError, CropOutput, DecodeError, ImageBackend};
use super::params::{ExtractParams, Quality};
use crate::config::OutputConfig;
use crate::geometry::{CropArea, ImageDimensions};
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// A source image ready for editing: its size plus the decoded bitmap that
/// backs the preview.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub path: PathBuf,
    pub dims: ImageDimensions,
    pub bitmap: RgbaImage,
}

/// Probe the intrinsic pixel size of an image file.
pub fn probe_dimensions(
    backend: &impl ImageBackend,
    path: &Path,
) -> Result<ImageDimensions, DecodeError> {
    backend.probe(path)
}

/// Probe and decode in one go.
///
/// A decoded bitmap whose size disagrees with the probed header is refused:
/// every crop window is computed against the probed size.
pub fn load_image(backend: &impl ImageBackend, path: &Path) -> Result<LoadedImage, DecodeError> {
    let dims = backend.probe(path)?;
    let bitmap = backend.decode(path)?;
    if (bitmap.width(), bitmap.height()) != (dims.width(), dims.height()) {
        return Err(DecodeError::Decode {
            path: path.to_path_buf(),
            message: format!(
                "header says {dims} but decoded {}x{}",
                bitmap.width(),
                bitmap.height()
            ),
        });
    }
    Ok(LoadedImage {
        path: path.to_path_buf(),
        dims,
        bitmap,
    })
}

/// Plan an extraction without executing it.
pub fn plan_extract(source: &Path, area: CropArea, config: &OutputConfig) -> ExtractParams {
    ExtractParams {
        source: source.to_path_buf(),
        area,
        side: config.size,
        format: config.format,
        quality: Quality::new(config.quality),
    }
}

/// Rasterize `area` of `source` into an `N × N` output file.
pub fn extract_crop(
    backend: &impl ImageBackend,
    source: &Path,
    area: CropArea,
    config: &OutputConfig,
) -> Result<CropOutput, CropError> {
    backend.extract(&plan_extract(source, area, config))
}
