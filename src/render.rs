//! HTML page rendering.
//!
//! Pages are produced from user-supplied [handlebars](https://docs.rs/handlebars)
//! templates, all loaded once before any work starts:
//!
//! | Template | Output | Data |
//! |---|---|---|
//! | `start.html` | layout header | none |
//! | `end.html` | layout footer | none |
//! | `sketches/index.html` | `{collection}/index.html` | `{ collection, sketches, start, end }` |
//! | `sketches/page.html` | `{collection}/{slug}.html` | `{ collection, meta, previous, next, start, end }` |
//! | `index.html` | `index.html` | `{ collections: [{ name, count }], start, end }` |
//!
//! `start` and `end` are rendered once at load time and handed to every page
//! as pre-rendered HTML, so templates embed them unescaped with
//! `{{{start}}}` / `{{{end}}}` (or `{{{startTemplate}}}` / `{{{endTemplate}}}`).
//! Both are also reachable as partials (`{{> start}}`) when a page wants them
//! rendered against its own data.
//!
//! `previous` and `next` are `null` at the ends of a collection, otherwise
//! `{ slug, title, filename }` of the neighboring item.
//!
//! Rendering is pure: nothing here touches the output directory.

use crate::metadata::ItemMetadata;
use handlebars::Handlebars;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const START: &str = "start";
pub const END: &str = "end";
pub const COLLECTION_INDEX: &str = "sketches/index";
pub const ITEM_PAGE: &str = "sketches/page";
pub const HOMEPAGE: &str = "index";

/// Registered name and file path (relative to the template directory).
const TEMPLATE_FILES: [(&str, &str); 5] = [
    (START, "start.html"),
    (END, "end.html"),
    (COLLECTION_INDEX, "sketches/index.html"),
    (ITEM_PAGE, "sketches/page.html"),
    (HOMEPAGE, "index.html"),
];

/// Startup failures. Any of these aborts the build before work begins.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to read template {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse template {name}: {source}")]
    Parse {
        name: &'static str,
        source: Box<handlebars::TemplateError>,
    },
    #[error("failed to render layout fragment {name}: {source}")]
    Layout {
        name: &'static str,
        source: Box<handlebars::RenderError>,
    },
}

/// Per-page failure. The page is skipped; the build continues.
#[derive(Error, Debug)]
#[error("failed to render {template}: {source}")]
pub struct RenderError {
    pub template: &'static str,
    source: Box<handlebars::RenderError>,
}

/// The two layout fragments shared by every page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    pub start: String,
    pub end: String,
}

/// Link target for previous/next navigation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Neighbor<'a> {
    pub slug: &'a str,
    pub title: Option<&'a str>,
    pub filename: &'a str,
}

impl<'a> From<&'a ItemMetadata> for Neighbor<'a> {
    fn from(meta: &'a ItemMetadata) -> Self {
        Self {
            slug: &meta.slug,
            title: meta.title.as_deref(),
            filename: &meta.filename,
        }
    }
}

/// One homepage entry.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CollectionEntry {
    pub name: String,
    pub count: usize,
}

/// Layout keys merged into every page's data.
///
/// `startTemplate` / `endTemplate` carry the same HTML as `start` / `end`
/// for templates written against those names.
#[derive(Serialize)]
struct LayoutData<'a> {
    start: &'a str,
    end: &'a str,
    #[serde(rename = "startTemplate")]
    start_template: &'a str,
    #[serde(rename = "endTemplate")]
    end_template: &'a str,
}

#[derive(Serialize)]
struct PageData<'a> {
    collection: &'a str,
    meta: &'a ItemMetadata,
    previous: Option<Neighbor<'a>>,
    next: Option<Neighbor<'a>>,
    #[serde(flatten)]
    layout: LayoutData<'a>,
}

#[derive(Serialize)]
struct IndexData<'a> {
    collection: &'a str,
    sketches: &'a [ItemMetadata],
    #[serde(flatten)]
    layout: LayoutData<'a>,
}

#[derive(Serialize)]
struct HomepageData<'a> {
    collections: &'a [CollectionEntry],
    #[serde(flatten)]
    layout: LayoutData<'a>,
}

/// Compiled template set plus the pre-rendered layout.
///
/// Read-only after [`Templates::load`], so one instance is shared by every
/// concurrent page render.
pub struct Templates {
    registry: Handlebars<'static>,
    layout: Layout,
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Templates")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl Templates {
    /// Load and compile all five templates from `dir`.
    ///
    /// With `strict`, a template that references a field missing from its
    /// data fails to render instead of producing an empty string.
    pub fn load(dir: &Path, strict: bool) -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(strict);

        for (name, file) in TEMPLATE_FILES {
            let path = dir.join(file);
            if !path.is_file() {
                return Err(TemplateError::Missing(path));
            }
            let source = std::fs::read_to_string(&path)
                .map_err(|source| TemplateError::Io { path, source })?;
            registry
                .register_template_string(name, source)
                .map_err(|e| TemplateError::Parse {
                    name,
                    source: Box::new(e),
                })?;
        }

        let fragment = |name: &'static str| {
            registry
                .render(name, &serde_json::json!({}))
                .map_err(|e| TemplateError::Layout {
                    name,
                    source: Box::new(e),
                })
        };
        let layout = Layout {
            start: fragment(START)?,
            end: fragment(END)?,
        };

        Ok(Self { registry, layout })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    fn layout_data(&self) -> LayoutData<'_> {
        LayoutData {
            start: &self.layout.start,
            end: &self.layout.end,
            start_template: &self.layout.start,
            end_template: &self.layout.end,
        }
    }

    fn render<T: Serialize>(
        &self,
        template: &'static str,
        data: &T,
    ) -> Result<String, RenderError> {
        self.registry
            .render(template, data)
            .map_err(|e| RenderError {
                template,
                source: Box::new(e),
            })
    }

    /// Render one item's page with its navigation neighbors.
    pub fn render_item_page(
        &self,
        collection: &str,
        meta: &ItemMetadata,
        previous: Option<&ItemMetadata>,
        next: Option<&ItemMetadata>,
    ) -> Result<String, RenderError> {
        self.render(
            ITEM_PAGE,
            &PageData {
                collection,
                meta,
                previous: previous.map(Neighbor::from),
                next: next.map(Neighbor::from),
                layout: self.layout_data(),
            },
        )
    }

    /// Render a collection index over its complete ordered item list.
    pub fn render_collection_index(
        &self,
        collection: &str,
        items: &[ItemMetadata],
    ) -> Result<String, RenderError> {
        self.render(
            COLLECTION_INDEX,
            &IndexData {
                collection,
                sketches: items,
                layout: self.layout_data(),
            },
        )
    }

    /// Render the site homepage.
    pub fn render_homepage(&self, collections: &[CollectionEntry]) -> Result<String, RenderError> {
        self.render(
            HOMEPAGE,
            &HomepageData {
                collections,
                layout: self.layout_data(),
            },
        )
    }
}

/// Neighbors of position `i` in an ordered list.
pub fn neighbors(
    items: &[ItemMetadata],
    i: usize,
) -> (Option<&ItemMetadata>, Option<&ItemMetadata>) {
    let previous = i.checked_sub(1).and_then(|p| items.get(p));
    (previous, items.get(i + 1))
}
