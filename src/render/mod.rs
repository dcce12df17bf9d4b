//! Bilingual Word-document rendering.
//!
//! Turns a markdown policy document into a paginated HTML document that word
//! processors open as a `.doc` file. The renderer owns its numbering: section
//! and subsection numbers are recomputed from the raw text on every call and
//! have no relation to the ids of the [`section`](crate::section) model.
//!
//! ## Document Layout
//!
//! ```text
//! cover (logo, title, Arabic label)
//! ── page break ──
//! table of contents
//! ── page break ──
//! 1. First section          (page break before every later section)
//!    1.1 Subsection
//! ...
//! ── page break ──           (only with a process diagram)
//! process diagram
//! ── page break ──
//! approval table
//! footer
//! ```
//!
//! ## Submodules
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stateful line scanner: sections, subsections, blocks, bilingual lookahead |
//! | [`table`] | Pipe-table parsing and English/Arabic abbreviation pairing |
//! | [`inline`] | Escaping plus bold, italic, underline, strikethrough, code |
//! | [`markup`] | Maud templates for every block and page |

pub mod inline;
pub mod markup;
pub mod scan;
pub mod table;

use crate::config::{self, DocConfig};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use maud::html;
use std::path::Path;

pub use scan::{Block, ScannedDocument, ScannedSection, scan_document};

const UNTITLED: &str = "Untitled Document";

/// Table-of-contents entry for a numbered `## ` section.
#[derive(Debug, Clone, PartialEq)]
pub struct TocSection {
    /// 1-based, in encounter order.
    pub number: usize,
    pub title: String,
    pub arabic_title: Option<String>,
    pub subsections: Vec<TocSubsection>,
}

/// Table-of-contents entry for a `### ` subsection.
#[derive(Debug, Clone, PartialEq)]
pub struct TocSubsection {
    /// `"<section>.<subsection>"`.
    pub number: String,
    pub title: String,
    pub arabic_title: Option<String>,
}

/// An image embedded in the document as a base64 data URI.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    pub mime: String,
    pub data: Vec<u8>,
}

impl EmbeddedImage {
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            data,
        }
    }

    /// Read an image file, guessing the MIME type from its extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self::new(mime_for(path), data))
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.data))
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

/// Per-document inputs that do not come from `config.toml`.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Cover title. Falls back to the first `# ` heading, then a stock title.
    pub title: Option<String>,
    pub logo: Option<EmbeddedImage>,
    /// Adds a process-diagram page after the content.
    pub diagram: Option<EmbeddedImage>,
}

/// Table of contents in encounter order.
pub fn table_of_contents(doc: &ScannedDocument) -> Vec<TocSection> {
    doc.sections.iter().map(|s| s.entry.clone()).collect()
}

/// Title used on the cover and in `<title>`.
pub fn document_title(doc: &ScannedDocument, options: &RenderOptions) -> String {
    options
        .title
        .as_deref()
        .or(doc.title.as_deref())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Render only the scanned body: preamble blocks and numbered sections.
pub fn render_content(doc: &ScannedDocument) -> String {
    html! {
        @for b in &doc.preamble {
            (markup::block(b))
        }
        @for (i, section) in doc.sections.iter().enumerate() {
            (markup::section(section, i == 0))
        }
    }
    .into_string()
}

/// Render a complete Word-HTML document from markdown.
pub fn render_document(markdown: &str, options: &RenderOptions, config: &DocConfig) -> String {
    let doc = scan_document(markdown);
    let title = document_title(&doc, options);
    let toc = table_of_contents(&doc);
    let css = config::generate_brand_css(&config.brand, &config.page);
    let logo = options.logo.as_ref().map(EmbeddedImage::data_uri);
    let diagram = options.diagram.as_ref().map(EmbeddedImage::data_uri);

    tracing::debug!(
        title = %title,
        sections = toc.len(),
        subsections = toc.iter().map(|s| s.subsections.len()).sum::<usize>(),
        "document scanned"
    );

    let body = html! {
        body {
            div.WordSection1 {
                (markup::cover(&title, &config.cover.organization, &config.cover.arabic_label, logo.as_deref()))
                (markup::page_break())
                (markup::table_of_contents(&toc))
                (markup::page_break())
                div.content {
                    (maud::PreEscaped(render_content(&doc)))
                }
                @if let Some(src) = &diagram {
                    (markup::diagram_page(src))
                }
                (markup::page_break())
                (markup::approval_table(&config.approval))
                (markup::footer(&config.footer))
            }
        }
    };

    format!(
        "<!DOCTYPE html>\n{}{}{}{}",
        markup::HTML_OPEN,
        markup::head(&title, &css).into_string(),
        body.into_string(),
        markup::HTML_CLOSE
    )
}
