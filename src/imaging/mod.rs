//! Image I/O: probe, decode, crop, encode.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Probe** | `ImageReader::into_dimensions` |
//! | **Decode** | `ImageReader::decode` → RGBA8 |
//! | **Extract** | `crop_imm` + Lanczos3 `resize` + PNG/JPEG/WebP encoder |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for pixel-rect math (unit testable)
//! - **Parameters**: Data structures describing an extraction
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining config + backend

pub mod backend;
pub mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{CropError, CropOutput, DecodeError, ImageBackend};
pub use operations::{LoadedImage, extract_crop, load_image, plan_extract, probe_dimensions};
pub use params::{ExtractParams, OutputFormat, Quality};
pub use rust_backend::RustBackend;
