//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations every backend must
//! support: identify, read_metadata, and resize.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests swap in a recording mock.

use super::params::ResizeParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not a JPEG container: {0}")]
    NotJpeg(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Embedded image metadata extracted from IPTC fields.
///
/// Field mapping:
/// - `title`: IPTC Object Name (`2:05`)
/// - `caption`: IPTC Caption-Abstract (`2:120`)
/// - `date_created`: IPTC Date Created (`2:55`), `CCYYMMDD` on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    pub title: Option<String>,
    pub caption: Option<String>,
    pub date_created: Option<String>,
}

/// Trait for image processing backends.
///
/// `Send + Sync` because renditions run on tokio's blocking pool while the
/// same backend is shared across every collection.
pub trait ImageBackend: Send + Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Read embedded IPTC metadata. Fails if the container cannot be parsed;
    /// a valid file without tags yields [`ImageMetadata::default`].
    fn read_metadata(&self, path: &Path) -> Result<ImageMetadata, BackendError>;

    /// Decode, flatten onto the background, resize and encode.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;
}
