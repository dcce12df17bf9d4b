//! CLI output formatting for every subcommand.
//!
//! # Information-First Display
//!
//! Every entity leads with its position and title. Ids, line spans and file
//! paths follow as indented context lines, so the output reads as an outline
//! of the document while still letting users find the handle to edit.
//!
//! # Output Format
//!
//! ## Sections (`split`, `show`, `update`, `reorder`, `placeholder`)
//!
//! ```text
//! 001 Credit Policy (section-0)
//!     Lines: 1-4
//!     001 Purpose (section-2)
//!         Lines: 6-18
//!         Preview: This policy sets the **minimum standards** for granting...
//!     002 Scope (section-4) [placeholder]
//! ```
//!
//! ## Render
//!
//! ```text
//! Credit Policy → out/credit-policy.doc
//!     1. Purpose / الغرض
//!     2. Scope
//!         2.1 Head Office / المكتب الرئيسي
//! 3 sections, 1 subsection
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::export::BatchResult;
use crate::render::TocSection;
use crate::section::Section;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut.trim_end())
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// `English / Arabic`, or just the English title.
fn bilingual_title(title: &str, arabic: Option<&str>) -> String {
    match arabic {
        Some(ar) => format!("{title} / {ar}"),
        None => title.to_string(),
    }
}

/// First body line after the heading, for a one-line preview.
fn preview(section: &Section) -> Option<String> {
    section
        .content
        .lines()
        .skip(1)
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(|l| truncate(l, 60))
}

// ============================================================================
// Sections
// ============================================================================

/// Format a section list as an indented outline in `order` sequence.
///
/// Depth follows heading level relative to the shallowest heading, and
/// positions count siblings at each depth.
pub fn format_sections(sections: &[Section]) -> Vec<String> {
    let mut ordered: Vec<&Section> = sections.iter().collect();
    ordered.sort_by_key(|s| s.order);

    let min_level = ordered.iter().map(|s| s.level).min().unwrap_or(1);
    let mut positions = [0usize; 6];
    let mut lines = Vec::new();

    for section in ordered {
        let depth = usize::from(section.level.saturating_sub(min_level)).min(5);
        positions[depth] += 1;
        for deeper in &mut positions[depth + 1..] {
            *deeper = 0;
        }

        let marker = if section.is_placeholder() { " [placeholder]" } else { "" };
        lines.push(format!(
            "{}{} {} ({}){}",
            indent(depth),
            format_index(positions[depth]),
            section.title,
            section.id,
            marker
        ));
        if section.is_placeholder() {
            continue;
        }
        lines.push(format!(
            "{}    Lines: {}-{}",
            indent(depth),
            section.start_line + 1,
            section.end_line + 1
        ));
        if let Some(text) = preview(section) {
            lines.push(format!("{}    Preview: {}", indent(depth), text));
        }
    }

    lines
}

pub fn print_sections(sections: &[Section]) {
    for line in format_sections(sections) {
        println!("{}", line);
    }
}

/// Summary after a section list was stored.
pub fn format_stored(key: &str, sections: &[Section]) -> Vec<String> {
    let pending = sections.iter().filter(|s| s.is_placeholder()).count();
    let mut summary = format!("Stored {} under \"{}\"", plural(sections.len(), "section"), key);
    if pending > 0 {
        summary.push_str(&format!(" ({} pending)", pending));
    }
    let mut lines = vec![summary];
    lines.extend(format_sections(sections));
    lines
}

pub fn print_stored(key: &str, sections: &[Section]) {
    for line in format_stored(key, sections) {
        println!("{}", line);
    }
}

// ============================================================================
// Render
// ============================================================================

/// Table of contents as plain text, subsections indented.
pub fn format_toc(toc: &[TocSection]) -> Vec<String> {
    let mut lines = Vec::new();
    for section in toc {
        lines.push(format!(
            "{}. {}",
            section.number,
            bilingual_title(&section.title, section.arabic_title.as_deref())
        ));
        for sub in &section.subsections {
            lines.push(format!(
                "{}{} {}",
                indent(1),
                sub.number,
                bilingual_title(&sub.title, sub.arabic_title.as_deref())
            ));
        }
    }
    lines
}

/// Title, artifact path, outline and counts for one exported document.
pub fn format_export_output(title: &str, path: &Path, toc: &[TocSection]) -> Vec<String> {
    let mut lines = vec![format!("{} → {}", title, path.display())];
    lines.extend(format_toc(toc).into_iter().map(|l| format!("{}{}", indent(1), l)));
    let subsections: usize = toc.iter().map(|s| s.subsections.len()).sum();
    lines.push(format!(
        "{}, {}",
        plural(toc.len(), "section"),
        plural(subsections, "subsection")
    ));
    lines
}

pub fn print_export_output(title: &str, path: &Path, toc: &[TocSection]) {
    for line in format_export_output(title, path, toc) {
        println!("{}", line);
    }
}

/// One line per batch input, then a total.
pub fn format_batch_output(results: &[BatchResult]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut failed = 0;
    for (i, r) in results.iter().enumerate() {
        match &r.result {
            Ok(path) => lines.push(format!(
                "{} {} → {}",
                format_index(i + 1),
                r.source.display(),
                path.display()
            )),
            Err(e) => {
                failed += 1;
                lines.push(format!("{} {}", format_index(i + 1), r.source.display()));
                lines.push(format!("{}Error: {}", indent(1), e));
            }
        }
    }
    let mut total = format!("Exported {}", plural(results.len() - failed, "document"));
    if failed > 0 {
        total.push_str(&format!(", {} failed", failed));
    }
    lines.push(total);
    lines
}

pub fn print_batch_output(results: &[BatchResult]) {
    for line in format_batch_output(results) {
        println!("{}", line);
    }
}

// ============================================================================
// Templates
// ============================================================================

/// Translation completeness report for a template.
pub fn format_translation_report(missing: &[String]) -> Vec<String> {
    if missing.is_empty() {
        return vec!["All Arabic translations present".to_string()];
    }
    let mut lines = vec![format!("Missing Arabic translations ({})", missing.len())];
    lines.extend(missing.iter().map(|path| format!("{}{}", indent(1), path)));
    lines
}

/// Translation warnings go to stderr so stdout stays clean markdown.
pub fn eprint_translation_report(missing: &[String]) {
    for line in format_translation_report(missing) {
        eprintln!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportError;
    use crate::render::{TocSubsection, scan_document, table_of_contents};
    use crate::section::{create_placeholder, parse_sections};
    use crate::test_helpers::*;
    use std::path::PathBuf;

    #[test]
    fn index_is_zero_padded() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("تحدد هذه السياسة", 4), "تحدد...");
    }

    #[test]
    fn sections_outline_by_level() {
        let sections = parse_sections("# Policy\n## Purpose\nWhy.\n## Scope\n### Branches\nAll.");
        let lines = format_sections(&sections);
        assert_eq!(
            lines,
            vec![
                "001 Policy (section-0)",
                "    Lines: 1-1",
                "    001 Purpose (section-1)",
                "        Lines: 2-3",
                "        Preview: Why.",
                "    002 Scope (section-2)",
                "        Lines: 4-4",
                "        001 Branches (section-3)",
                "            Lines: 5-6",
                "            Preview: All.",
            ]
        );
    }

    #[test]
    fn sections_follow_order_field() {
        let mut sections = parse_sections(PURPOSE_SCOPE);
        sections[0].order = 1;
        sections[1].order = 0;
        let lines = format_sections(&sections);
        assert!(lines[0].contains("Scope"));
    }

    #[test]
    fn placeholders_are_marked() {
        let lines = format_sections(&[create_placeholder("Risk", 2, 0)]);
        assert_eq!(lines, vec!["001 Risk (section-0) [placeholder]"]);
    }

    #[test]
    fn stored_summary_counts_pending() {
        let sections = vec![create_placeholder("A", 2, 0), create_placeholder("B", 2, 1)];
        let lines = format_stored("credit", &sections);
        assert_eq!(lines[0], "Stored 2 sections under \"credit\" (2 pending)");
    }

    #[test]
    fn toc_shows_arabic_titles() {
        let toc = vec![TocSection {
            number: 1,
            title: "Scope".into(),
            arabic_title: Some("النطاق".into()),
            subsections: vec![TocSubsection {
                number: "1.1".into(),
                title: "Branches".into(),
                arabic_title: None,
            }],
        }];
        assert_eq!(format_toc(&toc), vec!["1. Scope / النطاق", "    1.1 Branches"]);
    }

    #[test]
    fn export_output_counts() {
        let toc = table_of_contents(&scan_document(&sample_policy_markdown()));
        let lines = format_export_output("Credit Policy", Path::new("out/credit-policy.doc"), &toc);
        assert_eq!(lines[0], "Credit Policy → out/credit-policy.doc");
        assert_eq!(lines[1], "    1. Purpose / الغرض");
        assert_eq!(lines.last().unwrap(), "3 sections, 2 subsections");
    }

    #[test]
    fn batch_output_reports_failures() {
        let results = vec![
            BatchResult {
                source: PathBuf::from("a.md"),
                result: Ok(PathBuf::from("out/a.doc")),
            },
            BatchResult {
                source: PathBuf::from("b.md"),
                result: Err(ExportError::Io(std::io::Error::other("disk full"))),
            },
        ];
        assert_eq!(
            format_batch_output(&results),
            vec![
                "001 a.md → out/a.doc",
                "002 b.md",
                "    Error: failed to generate document: disk full",
                "Exported 1 document, 1 failed",
            ]
        );
    }

    #[test]
    fn translation_report() {
        assert_eq!(
            format_translation_report(&[]),
            vec!["All Arabic translations present"]
        );
        let lines = format_translation_report(&["Footer.Arabic".to_string()]);
        assert_eq!(lines, vec!["Missing Arabic translations (1)", "    Footer.Arabic"]);
    }
}
