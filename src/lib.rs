//! # Sketchbook
//!
//! A static site generator for sketch and photo portfolios. The filesystem
//! is the data source: each directory under the source root is a collection,
//! each JPEG in it is an item, and its IPTC tags supply titles, captions,
//! and dates.
//!
//! # Architecture: Two-Level Fan-Out
//!
//! ```text
//! discover collections
//!   └─ per collection (≤ concurrency.collections at once)
//!        1. list *.jpg, extract metadata in order     (sequential)
//!        2. per item (≤ concurrency.items at once)
//!             renditions → page → collection index    (any order)
//! after every collection: homepage ∥ asset copy
//! ```
//!
//! Extraction is sequential because list position decides previous/next
//! links. Item work only starts once the list is final, so concurrent items
//! share it read-only. The collection index is rewritten by every item from
//! the full list, so it is complete after any one of them succeeds.
//!
//! Failures are values, not just log lines: every item, collection, and
//! final step reports into a [`types::RunSummary`], and the CLI decides what
//! the exit status should be.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Orchestrator: discovery, collection pool, homepage, asset copy |
//! | [`process`] | One collection: extraction, ordering, slug checks, item pool |
//! | [`pool`] | Fixed-cap concurrency used at both fan-out levels |
//! | [`scan`] | Collection discovery and source file listing |
//! | [`metadata`] | `ItemMetadata` extraction and slug derivation |
//! | [`render`] | Handlebars templates for pages, indexes, and the homepage |
//! | [`imaging`] | Pure-Rust renditions and IPTC parsing behind `ImageBackend` |
//! | [`config`] | `config.toml` loading, merging, and validation |
//! | [`types`] | Run summary, collection reports, and failures |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Runtime Templates
//!
//! Page markup lives in user-editable handlebars files rather than in the
//! binary. All five are compiled once at startup, and a missing or broken
//! template stops the build before any image is touched.
//!
//! ## Blocking Image Work
//!
//! Decoding, resizing, and encoding run on tokio's blocking pool via
//! `spawn_blocking`, so the pools' cooperative scheduling keeps file I/O and
//! rendering moving while images are being resized.
//!
//! ## Additive Output
//!
//! Every run overwrites what it produces and deletes nothing. Running twice
//! on unchanged input yields byte-identical HTML.

pub mod config;
pub mod imaging;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod pool;
pub mod process;
pub mod render;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
