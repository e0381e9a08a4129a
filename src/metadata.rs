//! Item metadata extraction and slug derivation.
//!
//! Every item carries three optional descriptive fields read from the IPTC
//! block embedded in the JPEG container:
//!
//! - **Title**: IPTC Object Name (`IPTC:2:05`).
//! - **Caption**: IPTC Caption-Abstract (`IPTC:2:120`).
//! - **Created at**: IPTC Date Created (`IPTC:2:55`), presented as `YYYY-MM-DD`.
//!
//! A missing tag stays absent (`null` in template data). Nothing is
//! defaulted, so templates can branch on presence with `{{#if title}}`.
//!
//! ## Slugs
//!
//! The slug names the item's page (`{slug}.html`) and keys navigation links.
//! It comes from the title when there is one, otherwise from the filename
//! without its extension, and is always lowercase ASCII `[a-z0-9-]`, at
//! most 80 characters. Accented letters are transliterated (`Café` → `cafe`).

use crate::imaging::{BackendError, ImageBackend};
use serde::Serialize;
use std::path::Path;

const MAX_SLUG_LEN: usize = 80;

/// Slug used when neither title nor filename yields any safe characters.
const FALLBACK_SLUG: &str = "item";

/// Canonical per-item record. Immutable once extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    pub filename: String,
    pub created_at: Option<String>,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub slug: String,
}

/// Read embedded tags for one source file and build its record.
///
/// `extension` is the recognized source extension; it is not part of the
/// filename-derived slug. Fails when the file cannot be read or is not a
/// JPEG container. A JPEG without any IPTC block is fine and yields a
/// record with only `filename` and `slug`.
pub fn extract_metadata(
    backend: &dyn ImageBackend,
    path: &Path,
    extension: &str,
) -> Result<ItemMetadata, BackendError> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tags = backend.read_metadata(path)?;

    let title = non_empty(tags.title);
    let slug = derive_slug(title.as_deref(), &filename, extension);
    Ok(ItemMetadata {
        created_at: non_empty(tags.date_created),
        caption: non_empty(tags.caption),
        title,
        slug,
        filename,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Slug from the title, falling back to the filename, then to `"item"`.
///
/// The filename loses its `.{extension}` suffix (matched case-insensitively)
/// before slugifying.
pub fn derive_slug(title: Option<&str>, filename: &str, extension: &str) -> String {
    let stem = strip_extension(filename, extension);
    [title, Some(stem)]
        .into_iter()
        .flatten()
        .map(slugify)
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_SLUG.to_string())
}

fn strip_extension<'a>(filename: &'a str, extension: &str) -> &'a str {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        return filename;
    }
    filename
        .len()
        .checked_sub(extension.len() + 1)
        .filter(|&dot| filename.is_char_boundary(dot))
        .filter(|&dot| {
            let (stem, suffix) = filename.split_at(dot);
            !stem.is_empty()
                && suffix.starts_with('.')
                && suffix[1..].eq_ignore_ascii_case(extension)
        })
        .map_or(filename, |dot| &filename[..dot])
}

/// Normalize text into a URL-safe lowercase token.
///
/// - Transliterates non-ASCII letters and digits (`ü` → `u`, `ß` → `ss`)
/// - Drops other non-ASCII symbols
/// - Replaces every run of whitespace and ASCII punctuation with one dash
/// - Strips leading and trailing dashes
/// - Truncates to `MAX_SLUG_LEN` characters (breaks at last dash before limit)
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            push_slug_char(&mut slug, c, &mut pending_dash);
        } else if c.is_whitespace() || c.is_ascii() {
            pending_dash = true;
        } else if c.is_alphanumeric() {
            let ascii = deunicode::deunicode_char(c).unwrap_or("");
            for t in ascii.chars().filter(char::is_ascii_alphanumeric) {
                push_slug_char(&mut slug, t, &mut pending_dash);
            }
        }
    }

    if slug.len() <= MAX_SLUG_LEN {
        slug
    } else {
        let truncated = &slug[..MAX_SLUG_LEN];
        match truncated.rfind('-') {
            Some(pos) => truncated[..pos].to_string(),
            None => truncated.to_string(),
        }
    }
}

/// Append one safe character, emitting a pending separator first.
fn push_slug_char(slug: &mut String, c: char, pending_dash: &mut bool) {
    if *pending_dash && !slug.is_empty() {
        slug.push('-');
    }
    *pending_dash = false;
    slug.push(c.to_ascii_lowercase());
}
