//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entity leads with its positional index and title; file names and
//! dates follow as indented context lines. Untitled items show their
//! filename in parens, because the filename is their identity.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! 001 A (2 items)
//!     001 Cat Nap
//!         Source: cat.jpg
//!         Created: 2019-08-02
//!         Page: cat-nap.html
//!     002 (dog.jpg)
//!         Page: dog.html
//! 002 B (0 items)
//!
//! Checked 2 collections, 2 items
//! ```
//!
//! ## Build
//!
//! ```text
//! 001 A → A/index.html
//!     001 Cat Nap → A/cat-nap.html
//!     002 (dog.jpg) → A/dog.html
//! 002 B → B/index.html
//! Home → index.html
//!
//! Built 2 collections, 2 pages in 0.04s
//! ```
//!
//! Failures, when there are any, are listed under a `Failures` heading
//! before the closing line.
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::metadata::ItemMetadata;
use crate::types::RunSummary;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format a collection header with an optional item count.
///
/// ```text
/// 001 A (2 items)
/// 001 A
/// ```
fn collection_header(index: usize, name: &str, count: Option<usize>) -> String {
    match count {
        Some(1) => format!("{} {} (1 item)", format_index(index), name),
        Some(n) => format!("{} {} ({} items)", format_index(index), name, n),
        None => format!("{} {}", format_index(index), name),
    }
}

/// Format an item line: titled items show title, untitled show filename in parens.
fn item_line(index: usize, item: &ItemMetadata) -> String {
    match item.title.as_deref() {
        Some(t) if !t.is_empty() => format!("{} {}", format_index(index), t),
        _ => format!("{} ({})", format_index(index), item.filename),
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{} {}", n, one)
    } else {
        format!("{} {}", n, many)
    }
}

fn failure_lines(summary: &RunSummary) -> Vec<String> {
    if summary.is_clean() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), "Failures".to_string()];
    lines.extend(
        summary
            .all_failures()
            .map(|failure| format!("{}{}", indent(1), failure)),
    );
    lines
}

// ============================================================================
// check
// ============================================================================

/// Format the inventory produced by `check`.
pub fn format_check_inventory(summary: &RunSummary) -> Vec<String> {
    let mut lines = Vec::new();

    for (ci, collection) in summary.collections.iter().enumerate() {
        lines.push(collection_header(
            ci + 1,
            &collection.name,
            Some(collection.items.len()),
        ));
        for (ii, item) in collection.items.iter().enumerate() {
            lines.push(format!("{}{}", indent(1), item_line(ii + 1, item)));
            if item.title.is_some() {
                lines.push(format!("{}Source: {}", indent(2), item.filename));
            }
            if let Some(created) = &item.created_at {
                lines.push(format!("{}Created: {}", indent(2), created));
            }
            if let Some(caption) = &item.caption {
                lines.push(format!("{}Caption: {}", indent(2), truncate(caption, 60)));
            }
            lines.push(format!("{}Page: {}.html", indent(2), item.slug));
        }
    }

    lines.extend(failure_lines(summary));
    lines.push(String::new());
    lines.push(format!(
        "Checked {}, {}",
        plural(summary.collections.len(), "collection", "collections"),
        plural(summary.item_count(), "item", "items"),
    ));
    lines
}

pub fn print_check_inventory(summary: &RunSummary) {
    for line in format_check_inventory(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// build
// ============================================================================

/// Format the result of `build`: every page written, then failures.
pub fn format_build_summary(summary: &RunSummary) -> Vec<String> {
    let mut lines = Vec::new();

    for (ci, collection) in summary.collections.iter().enumerate() {
        let header = collection_header(ci + 1, &collection.name, None);
        if collection.index_written {
            lines.push(format!("{} → {}/index.html", header, collection.name));
        } else {
            lines.push(header);
        }
        for (ii, item) in collection.items.iter().enumerate() {
            lines.push(format!(
                "{}{} → {}/{}.html",
                indent(1),
                item_line(ii + 1, item),
                collection.name,
                item.slug
            ));
        }
    }
    if summary.homepage_written {
        lines.push("Home → index.html".to_string());
    }
    if summary.assets_copied > 0 {
        lines.push(format!(
            "Assets → {}",
            plural(summary.assets_copied, "file", "files")
        ));
    }

    lines.extend(failure_lines(summary));
    lines.push(String::new());
    let mut closing = format!(
        "Built {}, {} in {:.2}s",
        plural(summary.collections.len(), "collection", "collections"),
        plural(summary.pages_written(), "page", "pages"),
        summary.duration.as_secs_f64()
    );
    if !summary.is_clean() {
        closing.push_str(&format!(
            " ({})",
            plural(summary.failure_count(), "failure", "failures")
        ));
    }
    lines.push(closing);
    lines
}

pub fn print_build_summary(summary: &RunSummary) {
    for line in format_build_summary(summary) {
        println!("{}", line);
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
