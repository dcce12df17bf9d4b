//! # Policy Doc
//!
//! Section-level editing and bilingual Word export for bank policy documents.
//! A policy is a single markdown file: English text, each element followed by
//! its Arabic translation inside a `<div dir="rtl">` block.
//!
//! # Architecture: Two Independent Components
//!
//! ```text
//! 1. Section model   markdown  →  [Section]   →  markdown   (split, edit, move, join)
//! 2. Renderer        markdown  →  Word HTML   →  .doc       (numbering, TOC, bilingual layout)
//! ```
//!
//! The two components share no data. The only contract between them is
//! textual: heading lines (`#` markers at column 0) and the RTL wrapper
//! convention. Section ids are editing handles; the renderer recomputes its
//! own numbering from the raw text on every call.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`section`] | Parse, reconstruct, placeholder, update, reorder and lookup of sections |
//! | [`numbering`] | Heading recognition and `1.2 ` number-prefix parsing |
//! | [`render`] | Markdown scanner and Word-HTML templates (Maud) |
//! | [`export`] | `.doc` file production, single and batch |
//! | [`template`] | Bilingual JSON templates and the standard policy skeleton |
//! | [`store`] | Persistence port for section lists |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Pure Core, Injected Storage
//!
//! Every section and render operation takes its input by reference and returns
//! a new value. Nothing in the core performs I/O; persistence goes through the
//! [`store::DocumentStore`] trait and files are only written by [`export`].
//!
//! ## Renumber on Every Render
//!
//! Headings may already carry numbers from an earlier export (`## 3. Scope`).
//! The scanner strips any leading dotted number and counts sections itself,
//! so rendering is idempotent and numbers never compound.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/). Interpolation is
//! escaped by default, so text from the policy can never inject markup. Inline
//! formatting escapes first and only then adds its own tags.
//!
//! ## Word HTML Instead of OOXML
//!
//! Word opens an HTML file with a `.doc` extension when the root element
//! declares the Office namespaces. This keeps the output a readable text file
//! with no zip container, at the cost of Word-specific CSS for page breaks and
//! page size.
//!
//! ## Degrade, Never Fail
//!
//! Malformed tables are split on a best-effort basis, an abbreviations table
//! without an Arabic counterpart renders alone, and an unclosed RTL block runs
//! to the end of the document. Only file I/O can fail.

pub mod config;
pub mod export;
pub mod numbering;
pub mod output;
pub mod render;
pub mod section;
pub mod store;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;
