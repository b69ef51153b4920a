//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Probe | `ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, WebP) | `ImageReader::decode` |
//! | Crop | `image::imageops::crop_imm` on the full-resolution bitmap |
//! | Resample | `image::imageops::resize` with `Lanczos3` |
//! | Encode | `PngEncoder`, `JpegEncoder` (quality), `WebPEncoder` (lossless) |

use super::backend::{CropError, CropOutput, DecodeError, ImageBackend};
use super::calculations::pixel_rect;
use super::params::{ExtractParams, OutputFormat, Quality};
use crate::geometry::{CropArea, ImageDimensions};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use log::{debug, info};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Formats accepted as crop sources.
const SOURCE_FORMATS: &[ImageFormat] = &[ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::WebP];

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
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

/// Open `path` and sniff its format from content, not extension.
fn open_reader(path: &Path) -> Result<ImageReader<BufReader<File>>, DecodeError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    match reader.format() {
        Some(format) if SOURCE_FORMATS.contains(&format) => Ok(reader),
        Some(format) => Err(DecodeError::Unsupported(format!("{format:?}"))),
        None => Err(DecodeError::Unsupported(format!(
            "unrecognized content in {}",
            path.display()
        ))),
    }
}

fn decode_failed(path: &Path, e: impl std::fmt::Display) -> DecodeError {
    DecodeError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Crop and resample an already-decoded bitmap to `side × side`.
///
/// The bitmap must be the full-resolution source that `area` was computed
/// against; sampling a display-scaled copy would lose detail.
pub fn crop_bitmap(bitmap: &RgbaImage, area: &CropArea, side: u32) -> Result<RgbaImage, CropError> {
    let dims = ImageDimensions::new(bitmap.width(), bitmap.height())
        .ok_or_else(|| CropError::Encode("source bitmap is empty".to_string()))?;
    let rect = pixel_rect(area, dims).ok_or(CropError::OutOfBounds { area: *area, dims })?;
    let side = side.max(1);

    let region = imageops::crop_imm(bitmap, rect.x, rect.y, rect.side, rect.side).to_image();
    if rect.side == side {
        return Ok(region);
    }
    Ok(imageops::resize(&region, side, side, FilterType::Lanczos3))
}

/// Encode an RGBA bitmap into an in-memory file.
pub fn encode(
    img: RgbaImage,
    format: OutputFormat,
    quality: Quality,
) -> Result<Vec<u8>, CropError> {
    let side = img.width();
    let mut bytes = Vec::new();
    let result = match format {
        OutputFormat::Png => {
            DynamicImage::ImageRgba8(img).write_with_encoder(PngEncoder::new(&mut bytes))
        }
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgba8(img).to_rgb8();
            DynamicImage::ImageRgb8(rgb)
                .write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, quality.value()))
        }
        OutputFormat::Webp => {
            DynamicImage::ImageRgba8(img).write_with_encoder(WebPEncoder::new_lossless(&mut bytes))
        }
    };
    result.map_err(|e| {
        CropError::Encode(format!("{format} encode of {side}px square failed: {e}"))
    })?;
    Ok(bytes)
}

impl ImageBackend for RustBackend {
    fn probe(&self, path: &Path) -> Result<ImageDimensions, DecodeError> {
        let (width, height) = open_reader(path)?
            .into_dimensions()
            .map_err(|e| decode_failed(path, e))?;
        let dims = ImageDimensions::new(width, height)
            .ok_or_else(|| decode_failed(path, "image has zero width or height"))?;
        debug!("probed {}: {dims}", path.display());
        Ok(dims)
    }

    fn decode(&self, path: &Path) -> Result<RgbaImage, DecodeError> {
        let img = open_reader(path)?
            .decode()
            .map_err(|e| decode_failed(path, e))?;
        Ok(img.to_rgba8())
    }

    fn extract(&self, params: &ExtractParams) -> Result<CropOutput, CropError> {
        let bitmap = self.decode(&params.source)?;
        let square = crop_bitmap(&bitmap, &params.area, params.side)?;
        let side = square.width();
        let bytes = encode(square, params.format, params.quality)?;
        info!(
            "extracted {} from {} → {side}px {} ({} bytes)",
            params.area,
            params.source.display(),
            params.format,
            bytes.len()
        );
        Ok(CropOutput::new(bytes, side, params.format))
    }
}
