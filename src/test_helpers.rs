//! Shared test utilities for the sketchbook test suite.
//!
//! Provides synthetic JPEG builders (optionally carrying IPTC tags in an
//! APP13 segment), a minimal template set, and a project fixture that lays
//! out `content/sketches/`, `templates/` and `assets/` in a temp directory.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let project = Project::new();
//! project.add_image("A", "cat.jpg", Some("Cat Nap"));
//! project.add_image("A", "dog.jpg", None);
//! let config = project.config();
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::BuildConfig;
use image::{ImageEncoder, RgbImage};

// =========================================================================
// Synthetic JPEGs
// =========================================================================

/// IPTC fields to embed in a synthetic JPEG.
#[derive(Debug, Default, Clone, Copy)]
pub struct IptcFields<'a> {
    pub title: Option<&'a str>,
    pub caption: Option<&'a str>,
    /// Raw IIM value, e.g. `"20200115"`.
    pub date_created: Option<&'a str>,
}

/// Encode a gradient JPEG into memory.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, jpeg_bytes(width, height)).unwrap();
}

/// Build a complete APP13 segment (marker included) carrying IPTC record 2.
pub fn app13_segment(fields: &IptcFields) -> Vec<u8> {
    let mut iim = Vec::new();
    let mut dataset = |number: u8, value: &str| {
        iim.extend_from_slice(&[0x1C, 0x02, number]);
        iim.extend_from_slice(&(value.len() as u16).to_be_bytes());
        iim.extend_from_slice(value.as_bytes());
    };
    if let Some(title) = fields.title {
        dataset(5, title);
    }
    if let Some(date) = fields.date_created {
        dataset(55, date);
    }
    if let Some(caption) = fields.caption {
        dataset(120, caption);
    }

    let mut payload = b"Photoshop 3.0\0".to_vec();
    payload.extend_from_slice(b"8BIM");
    payload.extend_from_slice(&[0x04, 0x04, 0x00, 0x00]);
    payload.extend_from_slice(&(iim.len() as u32).to_be_bytes());
    payload.extend_from_slice(&iim);
    if iim.len() % 2 == 1 {
        payload.push(0);
    }

    let mut segment = vec![0xFF, 0xED];
    segment.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    segment.extend(payload);
    segment
}

/// Write a JPEG with an APP13 IPTC segment spliced in right after SOI.
pub fn write_jpeg_with_iptc(path: &Path, width: u32, height: u32, fields: &IptcFields) {
    let jpeg = jpeg_bytes(width, height);
    let mut bytes = jpeg[..2].to_vec();
    bytes.extend(app13_segment(fields));
    bytes.extend_from_slice(&jpeg[2..]);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, bytes).unwrap();
}

// =========================================================================
// Templates
// =========================================================================

/// Minimal templates that expose everything tests assert on.
pub const TEMPLATES: &[(&str, &str)] = &[
    ("start.html", "<html><body>"),
    ("end.html", "</body></html>"),
    (
        "sketches/index.html",
        "{{{start}}}<h1>{{collection}}</h1><ul>{{#each sketches}}<li data-slug=\"{{slug}}\">{{#if title}}{{title}}{{else}}{{filename}}{{/if}}</li>{{/each}}</ul>{{{end}}}",
    ),
    (
        "sketches/page.html",
        "{{{start}}}<img src=\"images/{{meta.filename}}\">{{#if previous}}<a rel=\"prev\" href=\"{{previous.slug}}.html\">prev</a>{{/if}}{{#if next}}<a rel=\"next\" href=\"{{next.slug}}.html\">next</a>{{/if}}{{{end}}}",
    ),
    (
        "index.html",
        "{{{start}}}{{#each collections}}<a href=\"{{name}}/\">{{name}} ({{count}})</a>{{/each}}{{{end}}}",
    ),
];

/// Write [`TEMPLATES`] into `dir`.
pub fn write_templates(dir: &Path) {
    for (name, body) in TEMPLATES {
        let path = dir.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }
}

// =========================================================================
// Project fixture
// =========================================================================

/// A throwaway project directory with sources, templates, and assets.
pub struct Project {
    pub tmp: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("content/sketches")).unwrap();
        write_templates(&tmp.path().join("templates"));
        let assets = tmp.path().join("assets");
        std::fs::create_dir_all(assets.join("css")).unwrap();
        std::fs::write(assets.join("css/site.css"), "body { margin: 0 }").unwrap();
        Self { tmp }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn source(&self) -> PathBuf {
        self.root().join("content/sketches")
    }

    pub fn output(&self) -> PathBuf {
        self.root().join("dist")
    }

    /// Create an empty collection directory.
    pub fn add_collection(&self, collection: &str) -> PathBuf {
        let dir = self.source().join(collection);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Add a real 64x48 JPEG, optionally titled.
    pub fn add_image(&self, collection: &str, filename: &str, title: Option<&str>) -> PathBuf {
        let path = self.add_collection(collection).join(filename);
        write_jpeg_with_iptc(
            &path,
            64,
            48,
            &IptcFields {
                title,
                ..IptcFields::default()
            },
        );
        path
    }

    /// Add a file with the image extension that is not a JPEG.
    pub fn add_broken_image(&self, collection: &str, filename: &str) -> PathBuf {
        let path = self.add_collection(collection).join(filename);
        std::fs::write(&path, b"not a jpeg").unwrap();
        path
    }

    /// Build config rooted in this project, with filename ordering so
    /// navigation is deterministic across filesystems.
    pub fn config(&self) -> BuildConfig {
        let mut config = BuildConfig::default().rooted_at(self.root());
        config.order = crate::config::ItemOrder::Filename;
        config
    }

    pub fn read_output(&self, relative: &str) -> String {
        std::fs::read_to_string(self.output().join(relative))
            .unwrap_or_else(|e| panic!("missing output {relative}: {e}"))
    }
}

/// Slugs listed in a rendered collection index, in document order.
pub fn listed_slugs(index_html: &str) -> Vec<String> {
    index_html
        .split("data-slug=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(String::from)
        .collect()
}
