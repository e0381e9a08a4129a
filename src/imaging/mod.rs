//! Image processing in pure Rust on top of the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **IPTC metadata** | custom parser (JPEG APP13) |
//! | **Full-size / thumbnail** | fit-within Lanczos3 resize, flattened to JPEG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub(crate) mod iptc_parser;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, ImageMetadata};
pub use calculations::calculate_fit_dimensions;
pub use operations::{RenditionConfig, Renditions, THUMBS_DIR, create_renditions, get_dimensions};
pub use params::{Background, BoundingBox, Quality, ResizeParams};
pub use rust_backend::RustBackend;
