//! Build configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by a user config file in the project directory, and CLI flags
//! override the resulting paths.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! source = "content/sketches"  # One subdirectory per collection
//! output = "dist"              # Build output root
//! templates = "templates"      # start.html, end.html, index.html, sketches/{index,page}.html
//! assets = "assets"            # Copied verbatim into the output root
//! extension = "jpg"            # Only files with this extension are items
//! order = "listing"            # listing | filename | created
//!
//! [images]
//! full_size = [2000, 2000]     # Box the full-size rendition fits inside
//! thumbnail_size = [800, 800]  # Box the thumbnail fits inside
//! background = "#ffffff"       # Fill under transparent pixels
//! quality = 80                 # JPEG quality (1-100)
//! enlarge = true               # Scale small images up to fill the box
//!
//! [concurrency]
//! collections = 5              # Collections processed at once
//! items = 10                   # Items per collection processed at once
//!
//! [rendering]
//! strict = false               # Missing template fields become render errors
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Background, BoundingBox, Quality, RenditionConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the project directory.
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// How items within a collection are ordered for navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemOrder {
    /// Directory listing order, as returned by the filesystem.
    #[default]
    Listing,
    /// Byte-wise file name order.
    Filename,
    /// `createdAt` ascending; undated items last, ties keep listing order.
    Created,
}

/// Build configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Directory whose immediate subdirectories are collections.
    pub source: PathBuf,
    /// Build output root.
    pub output: PathBuf,
    /// Template directory.
    pub templates: PathBuf,
    /// Static asset tree copied into the output root.
    pub assets: PathBuf,
    /// Recognized source extension, matched case-insensitively, without the dot.
    pub extension: String,
    /// Navigation order within a collection.
    pub order: ItemOrder,
    /// Rendition settings.
    pub images: ImagesConfig,
    /// Fan-out caps.
    pub concurrency: ConcurrencyConfig,
    /// Template engine settings.
    pub rendering: RenderingConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("content/sketches"),
            output: PathBuf::from("dist"),
            templates: PathBuf::from("templates"),
            assets: PathBuf::from("assets"),
            extension: "jpg".to_string(),
            order: ItemOrder::default(),
            images: ImagesConfig::default(),
            concurrency: ConcurrencyConfig::default(),
            rendering: RenderingConfig::default(),
        }
    }
}

impl BuildConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.quality == 0 || self.images.quality > 100 {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if self.images.full_size.contains(&0) || self.images.thumbnail_size.contains(&0) {
            return Err(ConfigError::Validation(
                "images.full_size and images.thumbnail_size values must be non-zero".into(),
            ));
        }
        if Background::from_hex(&self.images.background).is_none() {
            return Err(ConfigError::Validation(format!(
                "images.background must be a #rrggbb color, got {:?}",
                self.images.background
            )));
        }
        if self.concurrency.collections == 0 || self.concurrency.items == 0 {
            return Err(ConfigError::Validation(
                "concurrency.collections and concurrency.items must be at least 1".into(),
            ));
        }
        let ext = self.extension.trim_start_matches('.');
        if ext.is_empty() || ext.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "extension must be a bare file extension such as \"jpg\"".into(),
            ));
        }
        Ok(())
    }

    /// Resolve relative paths against a project directory.
    pub fn rooted_at(mut self, root: &Path) -> Self {
        for path in [
            &mut self.source,
            &mut self.output,
            &mut self.templates,
            &mut self.assets,
        ] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
        self
    }

    /// The recognized extension without a leading dot.
    pub fn extension(&self) -> &str {
        self.extension.trim_start_matches('.')
    }

    /// Rendition parameters derived from `[images]`.
    pub fn rendition_config(&self) -> RenditionConfig {
        let [full_w, full_h] = self.images.full_size;
        let [thumb_w, thumb_h] = self.images.thumbnail_size;
        RenditionConfig {
            full: BoundingBox::new(full_w, full_h),
            thumbnail: BoundingBox::new(thumb_w, thumb_h),
            quality: Quality::new(self.images.quality),
            background: Background::from_hex(&self.images.background).unwrap_or_default(),
            enlarge: self.images.enlarge,
        }
    }
}

/// Rendition settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// `[width, height]` box for the full-size rendition.
    pub full_size: [u32; 2],
    /// `[width, height]` box for the thumbnail.
    pub thumbnail_size: [u32; 2],
    /// Opaque fill under transparent pixels, `#rrggbb`.
    pub background: String,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
    /// Scale images smaller than a box up until they touch it.
    pub enlarge: bool,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            full_size: [2000, 2000],
            thumbnail_size: [800, 800],
            background: "#ffffff".to_string(),
            quality: 80,
            enlarge: true,
        }
    }
}

/// Bounded concurrency caps for the two fan-out levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConcurrencyConfig {
    pub collections: usize,
    pub items: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            collections: 5,
            items: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderingConfig {
    /// Treat references to missing template fields as render errors.
    pub strict: bool,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(BuildConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BuildConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BuildConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given project directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// validates the result, and resolves relative paths against `dir`.
pub fn load_config(dir: &Path) -> Result<BuildConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    Ok(resolve_config(base, overlay)?.rooted_at(dir))
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Sketchbook Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Relative paths are resolved against
# the directory holding this file. Unknown keys will cause an error.

# Directory whose immediate subdirectories are collections.
source = "content/sketches"

# Build output root. Files are overwritten, never deleted.
output = "dist"

# Template directory. Must contain start.html, end.html, index.html,
# sketches/index.html and sketches/page.html.
templates = "templates"

# Static assets, copied into the output root after all collections finish.
assets = "assets"

# Only files with this extension (case-insensitive) are collection items.
extension = "jpg"

# Navigation order within a collection:
#   listing  - directory listing order (filesystem dependent)
#   filename - sorted by file name
#   created  - sorted by IPTC Date Created, undated items last
order = "listing"

# ---------------------------------------------------------------------------
# Renditions
# ---------------------------------------------------------------------------
[images]
# Boxes the renditions must fit inside, as [width, height].
# Aspect ratio is preserved and nothing is cropped.
full_size = [2000, 2000]
thumbnail_size = [800, 800]

# Fill color under transparent pixels.
background = "#ffffff"

# JPEG encoding quality (1 = worst, 100 = best).
quality = 80

# Scale images smaller than a box up until they touch it. Set to false to
# keep small images at their original size.
enlarge = true

# ---------------------------------------------------------------------------
# Concurrency
# ---------------------------------------------------------------------------
[concurrency]
# Collections processed at the same time.
collections = 5

# Items processed at the same time within one collection.
items = 10

# ---------------------------------------------------------------------------
# Rendering
# ---------------------------------------------------------------------------
[rendering]
# When true, a template referencing a missing field fails that page.
strict = false
"##
}
