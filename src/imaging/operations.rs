//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::calculate_fit_dimensions;
use super::params::{Background, BoundingBox, Quality, ResizeParams};
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Name of the thumbnail subdirectory inside a collection's image directory.
pub const THUMBS_DIR: &str = "thumbs";

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &dyn ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Configuration for the full-size + thumbnail rendition pair.
#[derive(Debug, Clone, PartialEq)]
pub struct RenditionConfig {
    pub full: BoundingBox,
    pub thumbnail: BoundingBox,
    pub quality: Quality,
    pub background: Background,
    /// Scale sources smaller than a box up to fill it.
    pub enlarge: bool,
}

impl Default for RenditionConfig {
    fn default() -> Self {
        Self {
            full: BoundingBox::square(2000),
            thumbnail: BoundingBox::square(800),
            quality: Quality::default(),
            background: Background::white(),
            enlarge: true,
        }
    }
}

/// One written rendition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedRendition {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// The rendition pair written for one source item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renditions {
    pub full: GeneratedRendition,
    pub thumbnail: GeneratedRendition,
}

/// Plan both resize operations without executing them.
///
/// Full-size goes to `{output_dir}/{filename}`, the thumbnail to
/// `{output_dir}/thumbs/{filename}`.
pub fn plan_renditions(
    source: &Path,
    output_dir: &Path,
    filename: &str,
    original_dims: (u32, u32),
    config: &RenditionConfig,
) -> [ResizeParams; 2] {
    let plan = |output: PathBuf, bounds: BoundingBox| {
        let (width, height) = calculate_fit_dimensions(original_dims, bounds, config.enlarge);
        ResizeParams {
            source: source.to_path_buf(),
            output,
            width,
            height,
            quality: config.quality,
            background: config.background,
        }
    };

    [
        plan(output_dir.join(filename), config.full),
        plan(output_dir.join(THUMBS_DIR).join(filename), config.thumbnail),
    ]
}

/// Create the full-size and thumbnail renditions for one source image.
///
/// The thumbs directory is created (recursively, idempotently) first. Both
/// renditions are written even when the second overwrites an older file.
pub fn create_renditions(
    backend: &dyn ImageBackend,
    source: &Path,
    output_dir: &Path,
    filename: &str,
    config: &RenditionConfig,
) -> Result<Renditions> {
    std::fs::create_dir_all(output_dir.join(THUMBS_DIR))?;

    let dims = get_dimensions(backend, source)?;
    let [full, thumbnail] = plan_renditions(source, output_dir, filename, dims, config);

    backend.resize(&full)?;
    backend.resize(&thumbnail)?;

    Ok(Renditions {
        full: GeneratedRendition {
            path: full.output,
            width: full.width,
            height: full.height,
        },
        thumbnail: GeneratedRendition {
            path: thumbnail.output,
            width: thumbnail.width,
            height: thumbnail.height,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};

    #[test]
    fn get_dimensions_calls_backend() {
        let backend = MockBackend::new().with_dimensions("test.jpg", 1920, 1080);

        let dims = get_dimensions(&backend, Path::new("/test.jpg")).unwrap();
        assert_eq!(dims, (1920, 1080));
    }

    #[test]
    fn plan_renditions_paths() {
        let [full, thumb] = plan_renditions(
            Path::new("/src/cat.jpg"),
            Path::new("/dist/A/images"),
            "cat.jpg",
            (4000, 3000),
            &RenditionConfig::default(),
        );

        assert_eq!(full.output, Path::new("/dist/A/images/cat.jpg"));
        assert_eq!(thumb.output, Path::new("/dist/A/images/thumbs/cat.jpg"));
    }

    #[test]
    fn plan_renditions_bounds() {
        let [full, thumb] = plan_renditions(
            Path::new("/src/cat.jpg"),
            Path::new("/out"),
            "cat.jpg",
            (4000, 3000),
            &RenditionConfig::default(),
        );

        assert_eq!((full.width, full.height), (2000, 1500));
        assert_eq!((thumb.width, thumb.height), (800, 600));
    }

    #[test]
    fn plan_renditions_small_source_is_enlarged() {
        let [full, thumb] = plan_renditions(
            Path::new("/src/tiny.jpg"),
            Path::new("/out"),
            "tiny.jpg",
            (300, 200),
            &RenditionConfig::default(),
        );

        assert_eq!((full.width, full.height), (2000, 1333));
        assert_eq!((thumb.width, thumb.height), (800, 533));
    }

    #[test]
    fn plan_renditions_small_source_keeps_size_without_enlarge() {
        let config = RenditionConfig {
            enlarge: false,
            ..RenditionConfig::default()
        };
        let [full, thumb] = plan_renditions(
            Path::new("/src/tiny.jpg"),
            Path::new("/out"),
            "tiny.jpg",
            (300, 200),
            &config,
        );

        assert_eq!((full.width, full.height), (300, 200));
        assert_eq!((thumb.width, thumb.height), (300, 200));
    }

    #[test]
    fn plan_renditions_carries_quality_and_background() {
        let config = RenditionConfig {
            quality: Quality::new(65),
            background: Background([0, 0, 0]),
            ..RenditionConfig::default()
        };
        let params = plan_renditions(
            Path::new("/src/a.jpg"),
            Path::new("/out"),
            "a.jpg",
            (100, 100),
            &config,
        );

        for p in &params {
            assert_eq!(p.quality.value(), 65);
            assert_eq!(p.background, Background([0, 0, 0]));
        }
    }

    #[test]
    fn create_renditions_uses_backend_and_creates_thumbs_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output_dir = tmp.path().join("images");
        let backend = MockBackend::new().with_dimensions("portrait.jpg", 3000, 4000);

        let renditions = create_renditions(
            &backend,
            Path::new("/src/portrait.jpg"),
            &output_dir,
            "portrait.jpg",
            &RenditionConfig::default(),
        )
        .unwrap();

        assert!(output_dir.join("thumbs").is_dir());
        assert_eq!((renditions.full.width, renditions.full.height), (1500, 2000));
        assert_eq!(
            (renditions.thumbnail.width, renditions.thumbnail.height),
            (600, 800)
        );

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 3);
        assert!(matches!(&ops[0], RecordedOp::Identify(_)));
        assert!(matches!(
            &ops[1],
            RecordedOp::Resize { output, width: 1500, height: 2000, .. }
                if output.ends_with("images/portrait.jpg")
        ));
        assert!(matches!(
            &ops[2],
            RecordedOp::Resize { output, width: 600, height: 800, .. }
                if output.ends_with("thumbs/portrait.jpg")
        ));
    }

    #[test]
    fn create_renditions_is_idempotent_on_existing_dirs() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output_dir = tmp.path().join("images");
        std::fs::create_dir_all(output_dir.join("thumbs")).unwrap();
        let backend = MockBackend::new();

        for _ in 0..2 {
            create_renditions(
                &backend,
                Path::new("/src/a.jpg"),
                &output_dir,
                "a.jpg",
                &RenditionConfig::default(),
            )
            .unwrap();
        }
    }

    #[test]
    fn create_renditions_propagates_backend_failure() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = MockBackend::new().with_broken_pixels("bad.jpg");

        let result = create_renditions(
            &backend,
            Path::new("/src/bad.jpg"),
            tmp.path(),
            "bad.jpg",
            &RenditionConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn create_renditions_real_backend_respects_bounds() {
        use crate::imaging::RustBackend;
        use crate::test_helpers::create_test_jpeg;

        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("wide.jpg");
        create_test_jpeg(&source, 1200, 600);
        let config = RenditionConfig {
            full: BoundingBox::square(500),
            thumbnail: BoundingBox::square(100),
            ..RenditionConfig::default()
        };

        let out = tmp.path().join("images");
        create_renditions(&RustBackend::new(), &source, &out, "wide.jpg", &config).unwrap();

        assert_eq!(
            image::image_dimensions(out.join("wide.jpg")).unwrap(),
            (500, 250)
        );
        assert_eq!(
            image::image_dimensions(out.join("thumbs/wide.jpg")).unwrap(),
            (100, 50)
        );
    }
}
