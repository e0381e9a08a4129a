//! Build orchestration.
//!
//! ```text
//! discover collections ──► [collection pool, cap N] ──► process_collection
//!                                                          └─► [item pool, cap M]
//!              (full join)
//!                   ├─► render homepage ─┐
//!                   └─► copy assets ─────┴─► RunSummary
//! ```
//!
//! Everything a build needs (config, templates, image backend) travels in
//! one [`BuildContext`] built at startup and borrowed by every unit of work.

use crate::config::BuildConfig;
use crate::imaging::{ImageBackend, RenditionConfig, RustBackend};
use crate::pool::BoundedPool;
use crate::process::{self, prepare_collection, process_collection};
use crate::render::{CollectionEntry, TemplateError, Templates};
use crate::scan::{self, CollectionDir};
use crate::types::{CollectionReport, Failure, FailureKind, RunSummary};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
}

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("asset directory not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to walk assets: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("failed to copy {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("asset copy task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Read-only state shared by every unit of work in one build.
pub struct BuildContext {
    pub config: BuildConfig,
    pub templates: Templates,
    pub backend: Arc<dyn ImageBackend>,
    pub(crate) rendition: RenditionConfig,
}

impl BuildContext {
    pub fn new(config: BuildConfig, templates: Templates, backend: Arc<dyn ImageBackend>) -> Self {
        let rendition = config.rendition_config();
        Self {
            config,
            templates,
            backend,
            rendition,
        }
    }

    /// Load templates and pair them with the pure Rust image backend.
    ///
    /// Fails before any work when a template is missing or malformed.
    pub fn load(config: BuildConfig) -> Result<Self, PipelineError> {
        let templates = Templates::load(&config.templates, config.rendering.strict)?;
        Ok(Self::new(config, templates, Arc::new(RustBackend::new())))
    }
}

/// Run a full build.
///
/// Never fails as a whole: every problem is recorded in the summary.
pub async fn run(ctx: &BuildContext) -> RunSummary {
    let started = Instant::now();
    let mut summary = RunSummary::default();

    let collections = discover(ctx, &mut summary).await;
    let pool = BoundedPool::new(ctx.config.concurrency.collections);
    summary.collections = pool
        .run_ordered(&collections, |collection| process_collection(ctx, collection))
        .await;

    let entries = homepage_entries(&summary.collections);
    let (homepage, assets) = tokio::join!(
        write_homepage(ctx, &entries),
        copy_assets_blocking(ctx.config.assets.clone(), ctx.config.output.clone()),
    );

    match homepage {
        Ok(()) => summary.homepage_written = true,
        Err(failure) => summary.failures.push(failure),
    }
    match assets {
        Ok(count) => {
            info!(files = count, "assets copied");
            summary.assets_copied = count;
        }
        Err(e) => {
            error!(error = %e, "asset copy failed");
            summary.failures.push(Failure::new(
                FailureKind::Assets,
                ctx.config.assets.display().to_string(),
                e,
            ));
        }
    }

    summary.duration = started.elapsed();
    info!(
        collections = summary.collections.len(),
        items = summary.item_count(),
        failures = summary.failure_count(),
        elapsed = ?summary.duration,
        "build finished"
    );
    summary
}

/// Discover and extract every collection without writing anything.
pub async fn check(ctx: &BuildContext) -> RunSummary {
    let started = Instant::now();
    let mut summary = RunSummary::default();

    let collections = discover(ctx, &mut summary).await;
    let pool = BoundedPool::new(ctx.config.concurrency.collections);
    summary.collections = pool
        .run_ordered(&collections, |collection| prepare_collection(ctx, collection))
        .await;

    summary.duration = started.elapsed();
    summary
}

async fn discover(ctx: &BuildContext, summary: &mut RunSummary) -> Vec<CollectionDir> {
    let source = &ctx.config.source;
    match scan::discover_collections(source).await {
        Ok(collections) => {
            info!(
                source = %source.display(),
                collections = collections.len(),
                "discovered collections"
            );
            collections
        }
        Err(e) => {
            warn!(error = %e, "cannot list source root, no collections to build");
            summary.failures.push(Failure::new(
                FailureKind::Discovery,
                source.display().to_string(),
                e,
            ));
            Vec::new()
        }
    }
}

fn homepage_entries(reports: &[CollectionReport]) -> Vec<CollectionEntry> {
    reports
        .iter()
        .map(|report| CollectionEntry {
            name: report.name.clone(),
            count: report.items.len(),
        })
        .collect()
}

async fn write_homepage(ctx: &BuildContext, entries: &[CollectionEntry]) -> Result<(), Failure> {
    let subject = "index.html";
    let html = ctx.templates.render_homepage(entries).map_err(|e| {
        warn!(error = %e, "homepage not rendered");
        Failure::new(FailureKind::Render, subject, e)
    })?;
    process::write_html(&ctx.config.output.join(subject), &html)
        .await
        .map_err(|e| {
            warn!(error = %e, "cannot write homepage");
            Failure::new(FailureKind::Write, subject, e)
        })
}

async fn copy_assets_blocking(src: PathBuf, dst: PathBuf) -> Result<usize, AssetError> {
    tokio::task::spawn_blocking(move || copy_assets(&src, &dst)).await?
}

/// Copy the asset tree into `dst`, overwriting existing files.
///
/// Returns the number of files copied.
pub fn copy_assets(src: &Path, dst: &Path) -> Result<usize, AssetError> {
    if !src.is_dir() {
        return Err(AssetError::Missing(src.to_path_buf()));
    }

    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        let io_err = |source| AssetError::Io {
            path: entry.path().to_path_buf(),
            source,
        };

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(io_err)?;
        } else if entry.file_type().is_file() {
            std::fs::copy(entry.path(), &target).map_err(io_err)?;
            copied += 1;
        }
    }
    Ok(copied)
}
