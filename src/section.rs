//! Addressable sections of a single markdown document.
//!
//! A document is split at every ATX heading into an ordered list of
//! [`Section`] records. Editors work on one section at a time (regenerate it,
//! replace its text, move it) and then [`reconstruct`] the full document.
//!
//! ## Identity and Order
//!
//! - `id` (`section-<n>`) is assigned once, at parse or placeholder time, and
//!   never renumbered.
//! - `order` is the authoritative position. After every parse, reorder, or
//!   outline initialization the `order` values of a list are exactly `0..N-1`.
//!
//! ## Reorder Contract
//!
//! [`reorder_sections`] first sorts its input by `order`, then treats both
//! indices as positions in that sorted list. Callers therefore never depend on
//! the storage order of the slice they pass in.
//!
//! All operations are pure: they take a slice and return a new `Vec`.

use crate::numbering::parse_heading;
use serde::{Deserialize, Serialize};

/// Marker body of a section that has not been generated yet.
pub const PLACEHOLDER_NOTICE: &str = "*This section has not been generated yet. Click \"Generate Section\" to create content.*";

/// A heading-delimited span of a markdown document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Stable handle (`section-<n>`), never renumbered.
    pub id: String,
    /// Heading text without the leading `#` markers.
    pub title: String,
    /// Heading level, 1–6.
    pub level: u8,
    /// Full text including the heading line, trimmed.
    pub content: String,
    /// Zero-based line of the heading at parse time.
    pub start_line: usize,
    /// Zero-based last line of the section at parse time.
    pub end_line: usize,
    /// False only for placeholders awaiting generation.
    pub generated: bool,
    /// Position among siblings; the ordering key for reconstruction.
    pub order: usize,
}

impl Section {
    pub fn is_placeholder(&self) -> bool {
        !self.generated
    }
}

fn section_id(index: usize) -> String {
    format!("section-{index}")
}

/// Accumulates lines for the section currently open during [`parse_sections`].
struct OpenSection {
    title: String,
    level: u8,
    start_line: usize,
    lines: Vec<String>,
}

impl OpenSection {
    fn close(self, index: usize, end_line: usize) -> Section {
        Section {
            id: section_id(index),
            title: self.title,
            level: self.level,
            content: self.lines.join("\n").trim().to_string(),
            start_line: self.start_line,
            end_line,
            generated: true,
            order: index,
        }
    }
}

/// Split a document into sections at every heading line.
///
/// Text before the first heading has no section to attach to and is dropped,
/// so a document without headings yields an empty list.
pub fn parse_sections(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<OpenSection> = None;
    let mut last_line = 0;

    for (i, line) in text.lines().enumerate() {
        last_line = i;
        if let Some(heading) = parse_heading(line) {
            if let Some(open) = current.take() {
                let index = sections.len();
                sections.push(open.close(index, i.saturating_sub(1)));
            }
            current = Some(OpenSection {
                title: heading.text.to_string(),
                level: heading.level,
                start_line: i,
                lines: vec![line.to_string()],
            });
        } else if let Some(open) = current.as_mut() {
            open.lines.push(line.to_string());
        }
    }

    if let Some(open) = current {
        let index = sections.len();
        sections.push(open.close(index, last_line));
    }

    sections
}

/// Sections sorted by `order`, stable with respect to the input slice.
fn sorted_by_order(sections: &[Section]) -> Vec<Section> {
    let mut sorted = sections.to_vec();
    sorted.sort_by_key(|s| s.order);
    sorted
}

/// Reassemble a document: contents sorted by `order`, separated by a blank line.
pub fn reconstruct(sections: &[Section]) -> String {
    let mut ordered: Vec<&Section> = sections.iter().collect();
    ordered.sort_by_key(|s| s.order);
    ordered
        .iter()
        .map(|s| s.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build a section that is still waiting for generated content.
///
/// Levels outside 1–6 are clamped into range.
pub fn create_placeholder(title: &str, level: u8, order: usize) -> Section {
    let level = level.clamp(1, 6);
    let title = title.trim();
    Section {
        id: section_id(order),
        title: title.to_string(),
        level,
        content: format!(
            "{} {}\n\n{}",
            "#".repeat(level as usize),
            title,
            PLACEHOLDER_NOTICE
        ),
        start_line: 0,
        end_line: 0,
        generated: false,
        order,
    }
}

/// Placeholders for a whole outline, ordered `0..N-1` as given.
pub fn outline_placeholders<S: AsRef<str>>(outline: &[(S, u8)]) -> Vec<Section> {
    outline
        .iter()
        .enumerate()
        .map(|(order, (title, level))| create_placeholder(title.as_ref(), *level, order))
        .collect()
}

/// Replace one section's content and mark it generated.
///
/// An unknown `id` returns an unchanged copy of the list.
pub fn update_section(sections: &[Section], id: &str, new_content: &str) -> Vec<Section> {
    if find_section(sections, id).is_none() {
        tracing::warn!(id, "update for unknown section ignored");
    }
    sections
        .iter()
        .map(|s| {
            if s.id == id {
                Section {
                    content: new_content.to_string(),
                    generated: true,
                    ..s.clone()
                }
            } else {
                s.clone()
            }
        })
        .collect()
}

/// Move the section at position `from` to position `to` and renumber `order`.
///
/// Positions refer to the list sorted by `order`. An out-of-range `from`
/// moves nothing; an out-of-range `to` is clamped to the last position.
pub fn reorder_sections(sections: &[Section], from: usize, to: usize) -> Vec<Section> {
    let mut sorted = sorted_by_order(sections);

    if from < sorted.len() {
        let last = sorted.len() - 1;
        if to > last {
            tracing::warn!(from, to, last, "reorder target clamped");
        }
        let moved = sorted.remove(from);
        sorted.insert(to.min(last), moved);
    } else {
        tracing::warn!(from, len = sorted.len(), "reorder source out of range");
    }

    for (i, section) in sorted.iter_mut().enumerate() {
        section.order = i;
    }
    sorted
}

/// Linear lookup by id.
pub fn find_section<'a>(sections: &'a [Section], id: &str) -> Option<&'a Section> {
    sections.iter().find(|s| s.id == id)
}

/// Sections still waiting for generation, in document order.
pub fn pending_sections(sections: &[Section]) -> Vec<&Section> {
    let mut pending: Vec<&Section> = sections.iter().filter(|s| s.is_placeholder()).collect();
    pending.sort_by_key(|s| s.order);
    pending
}
