//! Run results shared by the pipeline, the CLI, and tests.
//!
//! Every unit of work (item, collection, final step) reports how it ended
//! instead of only logging. The pipeline gathers these into a [`RunSummary`]
//! and the caller decides what a failure means for the exit status.

use crate::metadata::ItemMetadata;
use std::fmt;
use std::time::Duration;

/// Which stage a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A directory could not be listed.
    Discovery,
    /// Embedded metadata could not be read; the item was dropped.
    Extraction,
    /// Two items in one collection derived the same slug; the later was dropped.
    SlugCollision,
    /// A rendition could not be produced.
    Transform,
    /// A template failed to render; that page was not written.
    Render,
    /// A rendered page could not be written.
    Write,
    /// The static asset tree could not be copied.
    Assets,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Discovery => "discovery",
            FailureKind::Extraction => "extraction",
            FailureKind::SlugCollision => "slug collision",
            FailureKind::Transform => "transform",
            FailureKind::Render => "render",
            FailureKind::Write => "write",
            FailureKind::Assets => "assets",
        };
        f.write_str(label)
    }
}

/// One failed unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    /// Owning collection, absent for run-level failures.
    pub collection: Option<String>,
    /// What failed: a file name, a page path, a directory.
    pub subject: String,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, subject: impl Into<String>, message: impl ToString) -> Self {
        Self {
            kind,
            collection: None,
            subject: subject.into(),
            message: message.to_string(),
        }
    }

    pub fn in_collection(mut self, collection: &str) -> Self {
        self.collection = Some(collection.to_string());
        self
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.collection {
            Some(collection) => write!(
                f,
                "{} failed for {}/{}: {}",
                self.kind, collection, self.subject, self.message
            ),
            None => write!(f, "{} failed for {}: {}", self.kind, self.subject, self.message),
        }
    }
}

/// Outcome of processing one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionReport {
    pub name: String,
    /// Items that survived extraction, in navigation order.
    pub items: Vec<ItemMetadata>,
    /// Item pages written.
    pub pages_written: usize,
    /// Items whose two renditions were both written.
    pub renditions_written: usize,
    /// Whether the collection index was written at least once.
    pub index_written: bool,
    pub failures: Vec<Failure>,
}

impl CollectionReport {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

/// Everything one build produced.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Per-collection reports in discovery order.
    pub collections: Vec<CollectionReport>,
    /// Failures outside any single collection (discovery, homepage, assets).
    pub failures: Vec<Failure>,
    pub homepage_written: bool,
    /// Files copied from the asset tree.
    pub assets_copied: usize,
    pub duration: Duration,
}

impl RunSummary {
    /// Run-level failures followed by each collection's, in order.
    pub fn all_failures(&self) -> impl Iterator<Item = &Failure> {
        self.failures
            .iter()
            .chain(self.collections.iter().flat_map(|c| c.failures.iter()))
    }

    pub fn failure_count(&self) -> usize {
        self.all_failures().count()
    }

    pub fn is_clean(&self) -> bool {
        self.failure_count() == 0
    }

    pub fn item_count(&self) -> usize {
        self.collections.iter().map(|c| c.items.len()).sum()
    }

    pub fn pages_written(&self) -> usize {
        self.collections.iter().map(|c| c.pages_written).sum()
    }
}
