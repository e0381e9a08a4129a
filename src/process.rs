//! Per-collection processing.
//!
//! A collection goes through two phases:
//!
//! 1. **Prepare** (sequential): list the source files, extract metadata for
//!    each one in listing order, apply the configured ordering, and drop
//!    items whose slug is already taken. The result is the collection's
//!    fixed, ordered item list.
//! 2. **Fan out** (bounded): for every item, at most
//!    `concurrency.items` at a time and in any completion order, write its
//!    rendition pair, write its page with neighbors taken from its list
//!    position, and rewrite the collection index from the full list.
//!
//! No item work starts before preparation finishes, so the item list is
//! only ever read during fan-out. The index is also written once before
//! fan-out so that empty collections get one.
//!
//! ## Output Structure
//!
//! ```text
//! dist/A/
//! ├── index.html            # Collection index
//! ├── cat-nap.html          # One page per item, named by slug
//! ├── dog.html
//! └── images/
//!     ├── cat.jpg           # Full-size rendition
//!     ├── dog.jpg
//!     └── thumbs/
//!         ├── cat.jpg       # Thumbnail rendition
//!         └── dog.jpg
//! ```
//!
//! Every failure is recorded in the returned [`CollectionReport`] and never
//! stops sibling items.

use crate::config::ItemOrder;
use crate::imaging::{BackendError, Renditions, create_renditions};
use crate::metadata::{ItemMetadata, extract_metadata};
use crate::pipeline::BuildContext;
use crate::pool::BoundedPool;
use crate::render::neighbors;
use crate::scan::{self, CollectionDir};
use crate::types::{CollectionReport, Failure, FailureKind};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Rendition directory inside each collection's output directory.
pub const IMAGES_DIR: &str = "images";

/// Page name reserved for the collection index.
const INDEX_SLUG: &str = "index";

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("image task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// What one item's fan-out work achieved.
#[derive(Debug, Default)]
struct ItemOutcome {
    renditions_written: bool,
    page_written: bool,
    index_written: bool,
    failures: Vec<Failure>,
}

/// Process one collection end to end.
pub async fn process_collection(
    ctx: &BuildContext,
    collection: &CollectionDir,
) -> CollectionReport {
    let mut report = prepare_collection(ctx, collection).await;
    let name = collection.name.as_str();
    let out_dir = ctx.config.output.join(name);
    info!(collection = name, items = report.items.len(), "processing collection");

    match write_index(ctx, name, &out_dir, &report.items).await {
        Ok(()) => report.index_written = true,
        Err(failure) => report.failures.push(failure),
    }

    let items = std::mem::take(&mut report.items);
    let pool = BoundedPool::new(ctx.config.concurrency.items);
    let outcomes = pool
        .run(0..items.len(), |i| {
            process_item(ctx, collection, &out_dir, &items, i)
        })
        .await;

    for outcome in outcomes {
        report.renditions_written += usize::from(outcome.renditions_written);
        report.pages_written += usize::from(outcome.page_written);
        report.index_written |= outcome.index_written;
        report.failures.extend(outcome.failures);
    }
    report.items = items;

    info!(
        collection = name,
        pages = report.pages_written,
        failures = report.failures.len(),
        "collection done"
    );
    report
}

/// List, extract, order, and deduplicate a collection's items.
///
/// Writes nothing. The returned report carries the final ordered item list
/// plus any discovery, extraction, or slug collision failures.
pub async fn prepare_collection(
    ctx: &BuildContext,
    collection: &CollectionDir,
) -> CollectionReport {
    let name = collection.name.as_str();
    let mut report = CollectionReport::new(name);

    let files = match scan::list_source_files(&collection.path, ctx.config.extension()).await {
        Ok(files) => files,
        Err(e) => {
            warn!(collection = name, error = %e, "cannot list collection, treating as empty");
            report.failures.push(
                Failure::new(FailureKind::Discovery, collection.path.display().to_string(), e)
                    .in_collection(name),
            );
            Vec::new()
        }
    };

    let mut items = Vec::with_capacity(files.len());
    for filename in files {
        match read_item(ctx, collection.path.join(&filename)).await {
            Ok(meta) => {
                debug!(
                    collection = name,
                    file = %filename,
                    slug = %meta.slug,
                    "extracted metadata"
                );
                items.push(meta);
            }
            Err(e) => {
                warn!(collection = name, file = %filename, error = %e, "skipping item");
                report
                    .failures
                    .push(Failure::new(FailureKind::Extraction, filename, e).in_collection(name));
            }
        }
    }

    order_items(&mut items, ctx.config.order);
    report.items = dedupe_slugs(items, name, &mut report.failures);
    report
}

async fn read_item(ctx: &BuildContext, path: PathBuf) -> Result<ItemMetadata, ProcessError> {
    let backend = Arc::clone(&ctx.backend);
    let extension = ctx.config.extension().to_string();
    let meta = tokio::task::spawn_blocking(move || {
        extract_metadata(backend.as_ref(), &path, &extension)
    })
    .await??;
    Ok(meta)
}

/// Apply the configured navigation order. Sorting is stable.
pub fn order_items(items: &mut [ItemMetadata], order: ItemOrder) {
    match order {
        ItemOrder::Listing => {}
        ItemOrder::Filename => items.sort_by(|a, b| a.filename.cmp(&b.filename)),
        ItemOrder::Created => items.sort_by(|a, b| {
            (a.created_at.is_none(), &a.created_at).cmp(&(b.created_at.is_none(), &b.created_at))
        }),
    }
}

/// Keep the first item per slug; later ones are reported and dropped.
fn dedupe_slugs(
    items: Vec<ItemMetadata>,
    collection: &str,
    failures: &mut Vec<Failure>,
) -> Vec<ItemMetadata> {
    let mut owners: HashMap<String, String> = HashMap::new();
    let mut kept = Vec::with_capacity(items.len());

    for item in items {
        let reason = if item.slug == INDEX_SLUG {
            Some(format!("slug \"{INDEX_SLUG}\" is reserved for the collection index"))
        } else {
            owners
                .get(&item.slug)
                .map(|owner| format!("slug \"{}\" already used by {}", item.slug, owner))
        };

        match reason {
            Some(message) => {
                warn!(collection, file = %item.filename, %message, "dropping item");
                failures.push(
                    Failure::new(FailureKind::SlugCollision, item.filename, message)
                        .in_collection(collection),
                );
            }
            None => {
                owners.insert(item.slug.clone(), item.filename.clone());
                kept.push(item);
            }
        }
    }
    kept
}

async fn process_item(
    ctx: &BuildContext,
    collection: &CollectionDir,
    out_dir: &Path,
    items: &[ItemMetadata],
    i: usize,
) -> ItemOutcome {
    let name = collection.name.as_str();
    let meta = &items[i];
    let mut outcome = ItemOutcome::default();

    // A missing rendition still gets a page.
    let source = collection.path.join(&meta.filename);
    match generate_renditions(ctx, source, out_dir, &meta.filename).await {
        Ok(renditions) => {
            debug!(
                collection = name,
                file = %meta.filename,
                full = ?(renditions.full.width, renditions.full.height),
                thumb = ?(renditions.thumbnail.width, renditions.thumbnail.height),
                "renditions written"
            );
            outcome.renditions_written = true;
        }
        Err(e) => {
            warn!(collection = name, file = %meta.filename, error = %e, "rendition failed");
            outcome.failures.push(
                Failure::new(FailureKind::Transform, meta.filename.as_str(), e).in_collection(name),
            );
        }
    }

    let (previous, next) = neighbors(items, i);
    let page = format!("{}.html", meta.slug);
    match ctx.templates.render_item_page(name, meta, previous, next) {
        Ok(html) => match write_html(&out_dir.join(&page), &html).await {
            Ok(()) => outcome.page_written = true,
            Err(e) => {
                warn!(collection = name, page = %page, error = %e, "cannot write page");
                outcome
                    .failures
                    .push(Failure::new(FailureKind::Write, page, e).in_collection(name));
            }
        },
        Err(e) => {
            warn!(collection = name, page = %page, error = %e, "page not rendered");
            outcome
                .failures
                .push(Failure::new(FailureKind::Render, page, e).in_collection(name));
        }
    }

    match write_index(ctx, name, out_dir, items).await {
        Ok(()) => outcome.index_written = true,
        Err(failure) => outcome.failures.push(failure),
    }

    outcome
}

/// Produce both renditions on the blocking pool.
async fn generate_renditions(
    ctx: &BuildContext,
    source: PathBuf,
    out_dir: &Path,
    filename: &str,
) -> Result<Renditions, ProcessError> {
    let backend = Arc::clone(&ctx.backend);
    let config = ctx.rendition.clone();
    let images_dir = out_dir.join(IMAGES_DIR);
    let filename = filename.to_string();

    let renditions = tokio::task::spawn_blocking(move || {
        create_renditions(backend.as_ref(), &source, &images_dir, &filename, &config)
    })
    .await??;
    Ok(renditions)
}

/// Render the index from the complete list and overwrite it.
///
/// Every render of the same list is byte-identical, so repeated concurrent
/// overwrites always leave a complete file.
async fn write_index(
    ctx: &BuildContext,
    collection: &str,
    out_dir: &Path,
    items: &[ItemMetadata],
) -> Result<(), Failure> {
    let subject = "index.html";
    let html = ctx
        .templates
        .render_collection_index(collection, items)
        .map_err(|e| {
            warn!(collection, error = %e, "collection index not rendered");
            Failure::new(FailureKind::Render, subject, e).in_collection(collection)
        })?;
    write_html(&out_dir.join(subject), &html).await.map_err(|e| {
        warn!(collection, error = %e, "cannot write collection index");
        Failure::new(FailureKind::Write, subject, e).in_collection(collection)
    })
}

/// Write a file, creating parent directories as needed.
pub(crate) async fn write_html(path: &Path, html: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, html).await
}
