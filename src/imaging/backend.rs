//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the crop tool needs
//! from an image library: probe, decode, and extract.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use a recording mock so session logic can be exercised without
//! touching real files.

use super::params::{ExtractParams, OutputFormat};
use crate::geometry::{CropArea, ImageDimensions};
use image::RgbaImage;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A source file could not be read as an image.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported image format: {0}")]
    Unsupported(String),
    #[error("Failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },
}

/// The final crop could not be produced.
#[derive(Error, Debug)]
pub enum CropError {
    #[error("Crop area {area} lies outside the {dims} source")]
    OutOfBounds {
        area: CropArea,
        dims: ImageDimensions,
    },
    #[error("Source could not be decoded: {0}")]
    Decode(#[from] DecodeError),
    #[error("Encoding failed: {0}")]
    Encode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Extraction worker panicked: {0}")]
    Panicked(String),
}

/// An encoded square avatar, ready to hand to an uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropOutput {
    pub bytes: Vec<u8>,
    pub side: u32,
    pub format: OutputFormat,
    /// SHA-256 of `bytes`, hex encoded.
    pub digest: String,
}

impl CropOutput {
    pub fn new(bytes: Vec<u8>, side: u32, format: OutputFormat) -> Self {
        let digest = format!("{:x}", Sha256::digest(&bytes));
        Self {
            bytes,
            side,
            format,
            digest,
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<(), CropError> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Trait for image backends.
///
/// `Send + Sync` because probing and extraction run on worker threads while
/// the session keeps handling input.
pub trait ImageBackend: Send + Sync {
    /// Intrinsic pixel size, without a full decode where the format allows.
    fn probe(&self, path: &Path) -> Result<ImageDimensions, DecodeError>;

    /// Full-resolution RGBA bitmap.
    fn decode(&self, path: &Path) -> Result<RgbaImage, DecodeError>;

    /// Crop the full-resolution source to `params.area` and encode it as a
    /// `params.side × params.side` image.
    fn extract(&self, params: &ExtractParams) -> Result<CropOutput, CropError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock backend that records operations without executing them.
    /// Uses Mutex (not RefCell) so it is Sync and can be shared with worker threads.
    #[derive(Default)]
    pub struct MockBackend {
        pub dimensions: Mutex<Vec<ImageDimensions>>,
        /// Size of the blank bitmap `decode` returns. Falls back to the last
        /// probed size, then 4x4.
        pub decode_size: Mutex<Option<(u32, u32)>>,
        pub last_probe: Mutex<Option<ImageDimensions>>,
        pub fail_extract: Mutex<bool>,
        pub panic_extract: Mutex<bool>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Probe(String),
        Decode(String),
        Extract {
            source: String,
            area: CropArea,
            side: u32,
            format: OutputFormat,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Dimensions are handed out in order, one per probe.
        pub fn with_dimensions(mut dims: Vec<ImageDimensions>) -> Self {
            dims.reverse();
            Self {
                dimensions: Mutex::new(dims),
                ..Self::default()
            }
        }

        pub fn set_decode_size(&self, width: u32, height: u32) {
            *self.decode_size.lock().unwrap() = Some((width, height));
        }

        pub fn set_fail_extract(&self, fail: bool) {
            *self.fail_extract.lock().unwrap() = fail;
        }

        pub fn set_panic_extract(&self, panic: bool) {
            *self.panic_extract.lock().unwrap() = panic;
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn probe(&self, path: &Path) -> Result<ImageDimensions, DecodeError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Probe(path.to_string_lossy().to_string()));

            let dims = self.dimensions.lock().unwrap().pop().ok_or_else(|| DecodeError::Decode {
                path: path.to_path_buf(),
                message: "no mock dimensions".to_string(),
            })?;
            *self.last_probe.lock().unwrap() = Some(dims);
            Ok(dims)
        }

        fn decode(&self, path: &Path) -> Result<RgbaImage, DecodeError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode(path.to_string_lossy().to_string()));
            let size = self.decode_size.lock().unwrap().or_else(|| {
                self.last_probe
                    .lock()
                    .unwrap()
                    .map(|d| (d.width(), d.height()))
            });
            let (w, h) = size.unwrap_or((4, 4));
            Ok(RgbaImage::new(w, h))
        }

        fn extract(&self, params: &ExtractParams) -> Result<CropOutput, CropError> {
            self.operations.lock().unwrap().push(RecordedOp::Extract {
                source: params.source.to_string_lossy().to_string(),
                area: params.area,
                side: params.side,
                format: params.format,
            });
            if *self.panic_extract.lock().unwrap() {
                panic!("mock extract panic");
            }
            if *self.fail_extract.lock().unwrap() {
                return Err(CropError::Encode("mock failure".to_string()));
            }
            Ok(CropOutput::new(vec![0; 8], params.side, params.format))
        }
    }

    #[test]
    fn mock_hands_out_dimensions_in_order() {
        let backend = MockBackend::with_dimensions(vec![
            ImageDimensions::new(800, 600).unwrap(),
            ImageDimensions::new(10, 20).unwrap(),
        ]);

        assert_eq!(backend.probe(Path::new("/a.jpg")).unwrap().width(), 800);
        assert_eq!(backend.probe(Path::new("/b.jpg")).unwrap().width(), 10);
        assert!(backend.probe(Path::new("/c.jpg")).is_err());

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 3);
        assert!(matches!(&ops[0], RecordedOp::Probe(p) if p == "/a.jpg"));
    }

    #[test]
    fn mock_records_extract() {
        let backend = MockBackend::new();
        let area = CropArea {
            x: 1.0,
            y: 2.0,
            width: 3.0,
            height: 3.0,
        };

        let output = backend
            .extract(&ExtractParams {
                source: "/source.png".into(),
                area,
                side: 300,
                format: OutputFormat::Png,
                quality: super::super::params::Quality::default(),
            })
            .unwrap();
        assert_eq!(output.side, 300);

        assert!(matches!(
            &backend.get_operations()[0],
            RecordedOp::Extract { side: 300, format: OutputFormat::Png, .. }
        ));
    }

    #[test]
    fn output_digest_is_sha256_hex() {
        let a = CropOutput::new(b"avatar".to_vec(), 1, OutputFormat::Png);
        let b = CropOutput::new(b"avatar".to_vec(), 1, OutputFormat::Png);
        assert_eq!(a.digest.len(), 64);
        assert_eq!(a.digest, b.digest);
        assert_ne!(a.digest, CropOutput::new(b"other".to_vec(), 1, OutputFormat::Png).digest);
    }
}
