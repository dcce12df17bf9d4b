//! Single forward pass over markdown lines.
//!
//! The scanner is stateful: it counts sections and subsections as it meets
//! `## ` and `### ` headings, so numbering is always recomputed from the text
//! and never compounds with numbers left in the titles by an earlier render.
//!
//! ## Bilingual Lookahead
//!
//! An Arabic counterpart immediately follows its English original, wrapped in
//! a line-delimited RTL block:
//!
//! ```text
//! ## Abbreviations
//! <div dir="rtl">
//! ## الاختصارات
//! </div>
//! ```
//!
//! Headings look ahead for an RTL block holding a heading of the same level.
//! Abbreviation tables look ahead for an RTL block holding a table; a `## `
//! heading in that same block names the section if nothing else did. Anything
//! else inside an RTL block, including an RTL heading with no English
//! original, becomes a plain right-to-left paragraph block.

use super::table::{self, BilingualTable, Table};
use super::{TocSection, TocSubsection};
use crate::numbering::{parse_heading, strip_number_prefix};

const RTL_OPEN: &str = "<div dir=\"rtl\">";
const RTL_OPEN_SINGLE_QUOTED: &str = "<div dir='rtl'>";
const RTL_CLOSE: &str = "</div>";

/// A rendered unit of body content.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(String),
    /// Heading outside the numbered `##`/`###` scheme.
    Heading {
        level: u8,
        text: String,
    },
    Subsection(TocSubsection),
    Table(Table),
    RtlTable(Table),
    BilingualTable(BilingualTable),
    /// Right-to-left lines, one line break each.
    Rtl(Vec<String>),
    List(Vec<String>),
}

/// A numbered `## ` section and the blocks up to the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedSection {
    pub entry: TocSection,
    pub blocks: Vec<Block>,
}

/// Result of scanning a whole document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScannedDocument {
    /// First `# ` heading before any section.
    pub title: Option<String>,
    pub arabic_title: Option<String>,
    /// Blocks before the first section.
    pub preamble: Vec<Block>,
    pub sections: Vec<ScannedSection>,
}

/// Contents of an RTL wrapper and the line index where it closes.
struct RtlBlock<'a> {
    inner: Vec<&'a str>,
    end: usize,
}

impl<'a> RtlBlock<'a> {
    fn non_blank(&self) -> Vec<&'a str> {
        self.inner
            .iter()
            .map(|&l| l.trim())
            .filter(|l| !l.is_empty())
            .collect()
    }
}

/// Arabic table found in the RTL block after an abbreviations table, with
/// the other lines of that block.
struct RtlTablePair<'a> {
    arabic: Table,
    before: Vec<&'a str>,
    after: Vec<&'a str>,
    end: usize,
}

fn opens_rtl(line: &str) -> Option<usize> {
    line.find(RTL_OPEN)
        .map(|i| i + RTL_OPEN.len())
        .or_else(|| line.find(RTL_OPEN_SINGLE_QUOTED).map(|i| i + RTL_OPEN_SINGLE_QUOTED.len()))
}

/// Text of an RTL line, without heading markers.
fn rtl_text(line: &str) -> String {
    match parse_heading(line) {
        Some(heading) => {
            tracing::debug!(text = heading.text, "orphan RTL heading rendered as text");
            heading.text.to_string()
        }
        None => line.to_string(),
    }
}

fn is_bullet(line: &str) -> bool {
    line.starts_with("- ") || line.starts_with("* ")
}

/// Scan a markdown document into numbered sections and content blocks.
pub fn scan_document(markdown: &str) -> ScannedDocument {
    Scanner::new(markdown).run()
}

struct Scanner<'a> {
    lines: Vec<&'a str>,
    pos: usize,
    section_count: usize,
    subsection_count: usize,
    doc: ScannedDocument,
}

impl<'a> Scanner<'a> {
    fn new(markdown: &'a str) -> Self {
        Self {
            lines: markdown.lines().collect(),
            pos: 0,
            section_count: 0,
            subsection_count: 0,
            doc: ScannedDocument::default(),
        }
    }

    fn run(mut self) -> ScannedDocument {
        while self.pos < self.lines.len() {
            let raw: &'a str = self.lines[self.pos];
            let line = raw.trim();

            if line.is_empty() {
                self.pos += 1;
            } else if let Some(heading) = parse_heading(line) {
                match heading.level {
                    1 => self.title_heading(heading.text),
                    2 => self.section_heading(heading.text),
                    3 => self.subsection_heading(heading.text),
                    level => {
                        self.push(Block::Heading {
                            level,
                            text: heading.text.to_string(),
                        });
                        self.pos += 1;
                    }
                }
            } else if opens_rtl(line).is_some() {
                self.rtl_block();
            } else if table::is_table_line(line) {
                self.table();
            } else if is_bullet(line) {
                self.list();
            } else {
                self.push(Block::Paragraph(line.to_string()));
                self.pos += 1;
            }
        }
        self.doc
    }

    fn push(&mut self, block: Block) {
        match self.doc.sections.last_mut() {
            Some(section) => section.blocks.push(block),
            None => self.doc.preamble.push(block),
        }
    }

    fn next_non_blank(&self, from: usize) -> Option<usize> {
        (from..self.lines.len()).find(|&i| !self.lines[i].trim().is_empty())
    }

    /// Read the RTL wrapper opened on line `start`. An unclosed wrapper runs
    /// to the end of the document.
    fn read_rtl_block(&self, start: usize) -> Option<RtlBlock<'a>> {
        let first = self.lines[start];
        let after_open = &first[opens_rtl(first)?..];

        if let Some(close) = after_open.find(RTL_CLOSE) {
            return Some(RtlBlock {
                inner: vec![&after_open[..close]],
                end: start,
            });
        }

        let mut inner = vec![after_open];
        for i in start + 1..self.lines.len() {
            let line = self.lines[i];
            if let Some(close) = line.find(RTL_CLOSE) {
                inner.push(&line[..close]);
                return Some(RtlBlock { inner, end: i });
            }
            inner.push(line);
        }
        tracing::warn!(line = start, "RTL block is never closed");
        Some(RtlBlock {
            inner,
            end: self.lines.len() - 1,
        })
    }

    /// Arabic heading of the same level wrapped in the RTL block after `line`.
    fn paired_rtl_heading(&self, line: usize, level: u8) -> Option<(String, usize)> {
        let next = self.next_non_blank(line + 1)?;
        let block = self.read_rtl_block(next)?;
        match block.non_blank().as_slice() {
            [only] => {
                let heading = parse_heading(only)?;
                (heading.level == level)
                    .then(|| (strip_number_prefix(heading.text).to_string(), block.end))
            }
            _ => None,
        }
    }

    /// Consume a heading and its Arabic pair, returning both titles.
    fn take_heading(&mut self, text: &str, level: u8) -> (String, Option<String>) {
        let title = strip_number_prefix(text).to_string();
        match self.paired_rtl_heading(self.pos, level) {
            Some((arabic, end)) => {
                self.pos = end + 1;
                (title, Some(arabic))
            }
            None => {
                self.pos += 1;
                (title, None)
            }
        }
    }

    fn title_heading(&mut self, text: &str) {
        let (title, arabic) = self.take_heading(text, 1);
        if self.doc.title.is_none() && self.doc.sections.is_empty() {
            self.doc.title = Some(title);
            self.doc.arabic_title = arabic;
        } else {
            self.push(Block::Heading {
                level: 1,
                text: title,
            });
            if let Some(arabic) = arabic {
                self.push(Block::Rtl(vec![arabic]));
            }
        }
    }

    fn section_heading(&mut self, text: &str) {
        let (title, arabic_title) = self.take_heading(text, 2);
        self.section_count += 1;
        self.subsection_count = 0;
        self.doc.sections.push(ScannedSection {
            entry: TocSection {
                number: self.section_count,
                title,
                arabic_title,
                subsections: Vec::new(),
            },
            blocks: Vec::new(),
        });
    }

    fn subsection_heading(&mut self, text: &str) {
        let (title, arabic_title) = self.take_heading(text, 3);
        let Some(section) = self.doc.sections.last_mut() else {
            tracing::debug!(title = %title, "subsection before any section rendered unnumbered");
            self.push(Block::Heading { level: 3, text: title });
            if let Some(arabic) = arabic_title {
                self.push(Block::Rtl(vec![arabic]));
            }
            return;
        };

        self.subsection_count += 1;
        let subsection = TocSubsection {
            number: format!("{}.{}", self.section_count, self.subsection_count),
            title,
            arabic_title,
        };
        section.entry.subsections.push(subsection.clone());
        section.blocks.push(Block::Subsection(subsection));
    }

    fn rtl_block(&mut self) {
        let Some(block) = self.read_rtl_block(self.pos) else {
            self.pos += 1;
            return;
        };
        let lines = block.non_blank();
        self.pos = block.end + 1;

        if !lines.is_empty() && lines.iter().all(|l| table::is_table_line(l)) {
            self.push(Block::RtlTable(table::parse_table(&lines)));
            return;
        }

        self.push(Block::Rtl(lines.iter().map(|l| rtl_text(l)).collect()));
    }

    /// Use an RTL `## ` heading as the Arabic title of the current section,
    /// unless that section already has one.
    fn adopt_arabic_title(&mut self, text: &str) -> bool {
        match self.doc.sections.last_mut() {
            Some(section) if section.entry.arabic_title.is_none() => {
                section.entry.arabic_title = Some(strip_number_prefix(text).to_string());
                true
            }
            _ => false,
        }
    }

    fn table(&mut self) {
        let start = self.pos;
        let end = (start..self.lines.len())
            .find(|&i| !table::is_table_line(self.lines[i]))
            .unwrap_or(self.lines.len());
        let english = table::parse_table(&self.lines[start..end]);
        self.pos = end;

        if english.is_abbreviation_table() {
            if let Some(pair) = self.paired_rtl_table(end) {
                tracing::debug!("abbreviation table paired with Arabic table");
                self.pos = pair.end + 1;

                let mut before = Vec::new();
                for line in pair.before {
                    match parse_heading(line) {
                        Some(h) if h.level == 2 && self.adopt_arabic_title(h.text) => {}
                        _ => before.push(rtl_text(line)),
                    }
                }
                if !before.is_empty() {
                    self.push(Block::Rtl(before));
                }
                self.push(Block::BilingualTable(table::pair_tables(&english, &pair.arabic)));
                if !pair.after.is_empty() {
                    self.push(Block::Rtl(pair.after.iter().map(|l| rtl_text(l)).collect()));
                }
                return;
            }
            tracing::debug!("abbreviation table has no Arabic pair, rendering English only");
        }
        self.push(Block::Table(english));
    }

    /// First run of table lines in the RTL block starting at or after `from`.
    ///
    /// The block may also carry the Arabic section heading or notes around
    /// the table; those lines are returned alongside it.
    fn paired_rtl_table(&self, from: usize) -> Option<RtlTablePair<'a>> {
        let next = self.next_non_blank(from)?;
        let block = self.read_rtl_block(next)?;
        let lines = block.non_blank();
        let start = lines.iter().position(|l| table::is_table_line(l))?;
        let len = lines[start..]
            .iter()
            .take_while(|l| table::is_table_line(l))
            .count();
        let arabic = table::parse_table(&lines[start..start + len]);
        if arabic.data_rows().count() == 0 {
            return None;
        }
        Some(RtlTablePair {
            arabic,
            before: lines[..start].to_vec(),
            after: lines[start + len..].to_vec(),
            end: block.end,
        })
    }

    fn list(&mut self) {
        let mut items = Vec::new();
        while let Some(line) = self.lines.get(self.pos).copied().map(str::trim) {
            if !is_bullet(line) {
                break;
            }
            items.push(line[2..].trim().to_string());
            self.pos += 1;
        }
        self.push(Block::List(items));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    fn section_titles(doc: &ScannedDocument) -> Vec<(usize, String)> {
        doc.sections
            .iter()
            .map(|s| (s.entry.number, s.entry.title.clone()))
            .collect()
    }

    #[test]
    fn sections_are_numbered_in_encounter_order() {
        let doc = scan_document("## Purpose\ntext\n## Scope\nmore");
        assert_eq!(
            section_titles(&doc),
            vec![(1, "Purpose".to_string()), (2, "Scope".to_string())]
        );
    }

    #[test]
    fn existing_numbers_are_stripped() {
        let doc = scan_document("## 3. Some Title\n\n### 3.4 Detail");
        assert_eq!(doc.sections[0].entry.number, 1);
        assert_eq!(doc.sections[0].entry.title, "Some Title");
        assert_eq!(doc.sections[0].entry.subsections[0].number, "1.1");
        assert_eq!(doc.sections[0].entry.subsections[0].title, "Detail");
    }

    #[test]
    fn subsection_count_resets_per_section() {
        let doc = scan_document("## A\n### a1\n### a2\n## B\n### b1");
        let numbers: Vec<&str> = doc
            .sections
            .iter()
            .flat_map(|s| s.entry.subsections.iter().map(|x| x.number.as_str()))
            .collect();
        assert_eq!(numbers, vec!["1.1", "1.2", "2.1"]);
    }

    #[test]
    fn arabic_section_title_is_paired_and_skipped() {
        let doc = scan_document("## Purpose\n<div dir=\"rtl\">\n## الغرض\n</div>\n\nBody");
        let entry = &doc.sections[0].entry;
        assert_eq!(entry.arabic_title.as_deref(), Some("الغرض"));
        assert_eq!(doc.sections[0].blocks, vec![Block::Paragraph("Body".into())]);
    }

    #[test]
    fn arabic_subsection_title_is_paired() {
        let doc = scan_document("## Scope\n### Branches\n<div dir=\"rtl\">\n### الفروع\n</div>");
        let sub = &doc.sections[0].entry.subsections[0];
        assert_eq!(sub.arabic_title.as_deref(), Some("الفروع"));
        assert_eq!(doc.sections[0].blocks.len(), 1);
    }

    #[test]
    fn rtl_heading_of_other_level_is_not_paired() {
        let doc = scan_document("## Scope\n<div dir=\"rtl\">\n### النطاق\n</div>");
        assert_eq!(doc.sections[0].entry.arabic_title, None);
        assert_eq!(doc.sections[0].blocks, vec![Block::Rtl(vec!["النطاق".into()])]);
    }

    #[test]
    fn orphan_rtl_block_is_paragraph() {
        let doc = scan_document("## Scope\n\nText\n\n<div dir=\"rtl\">\nسطر أول\nسطر ثان\n</div>");
        assert_eq!(
            doc.sections[0].blocks[1],
            Block::Rtl(vec!["سطر أول".into(), "سطر ثان".into()])
        );
    }

    #[test]
    fn single_line_rtl_block() {
        let doc = scan_document("<div dir=\"rtl\">مرحبا</div>");
        assert_eq!(doc.preamble, vec![Block::Rtl(vec!["مرحبا".into()])]);
    }

    #[test]
    fn unclosed_rtl_block_runs_to_end() {
        let doc = scan_document("<div dir=\"rtl\">\nسطر\n");
        assert_eq!(doc.preamble, vec![Block::Rtl(vec!["سطر".into()])]);
    }

    #[test]
    fn abbreviation_tables_are_paired() {
        let doc = scan_document(&abbreviations_markdown());
        let section = &doc.sections[0];
        assert_eq!(section.entry.title, "Abbreviations");
        assert_eq!(section.entry.arabic_title.as_deref(), Some("الاختصارات"));
        match &section.blocks[..] {
            [Block::BilingualTable(t)] => {
                assert_eq!(t.rows.len(), 2);
                assert_eq!(t.rows[0].english_term, "KYC");
                assert_eq!(t.rows[0].arabic_full_form, "اعرف عميلك");
            }
            other => panic!("expected one bilingual table, got {other:?}"),
        }
    }

    #[test]
    fn abbreviation_table_without_pair_falls_back() {
        let doc = scan_document("## Abbreviations\n\n| Term | Full Form |\n|---|---|\n| KYC | Know Your Customer |\n\nAfter.");
        match &doc.sections[0].blocks[..] {
            [Block::Table(t), Block::Paragraph(p)] => {
                assert_eq!(t.rows.len(), 2);
                assert_eq!(p, "After.");
            }
            other => panic!("unexpected blocks {other:?}"),
        }
    }

    #[test]
    fn abbreviation_table_followed_by_rtl_prose_falls_back() {
        let doc = scan_document(
            "| Term | Full Form |\n|---|---|\n| A | Alpha |\n<div dir=\"rtl\">\nنص\n</div>",
        );
        assert!(matches!(doc.preamble[0], Block::Table(_)));
        assert_eq!(doc.preamble[1], Block::Rtl(vec!["نص".into()]));
    }

    #[test]
    fn arabic_heading_and_table_in_one_rtl_block() {
        let doc = scan_document(
            "## Abbreviations\n\n| Term | Full Form |\n|---|---|\n| KYC | Know Your Customer |\n\n<div dir=\"rtl\">\n## الاختصارات\n\n| المصطلح | الشكل الكامل |\n|---|---|\n| KYC | اعرف عميلك |\n</div>\n\nAfter.",
        );
        let section = &doc.sections[0];
        assert_eq!(section.entry.arabic_title.as_deref(), Some("الاختصارات"));
        match &section.blocks[..] {
            [Block::BilingualTable(t), Block::Paragraph(p)] => {
                assert_eq!(t.rows[0].arabic_full_form, "اعرف عميلك");
                assert_eq!(p, "After.");
            }
            other => panic!("expected bilingual table, got {other:?}"),
        }
    }

    #[test]
    fn shared_rtl_block_keeps_existing_title_and_notes() {
        let doc = scan_document(&format!(
            "{}\n\n| Term | Full Form |\n|---|---|\n| A | Alpha |\n\n<div dir=\"rtl\">\n## عنوان آخر\n| المصطلح | الشكل الكامل |\n|---|---|\n| A | ألفا |\nملاحظة\n</div>",
            "## Abbreviations\n<div dir=\"rtl\">\n## الاختصارات\n</div>"
        ));
        let section = &doc.sections[0];
        assert_eq!(section.entry.arabic_title.as_deref(), Some("الاختصارات"));
        match &section.blocks[..] {
            [Block::Rtl(before), Block::BilingualTable(t), Block::Rtl(after)] => {
                assert_eq!(before, &vec!["عنوان آخر".to_string()]);
                assert_eq!(t.rows.len(), 1);
                assert_eq!(after, &vec!["ملاحظة".to_string()]);
            }
            other => panic!("unexpected blocks {other:?}"),
        }
    }

    #[test]
    fn rtl_table_outside_pairing() {
        let doc = scan_document("<div dir=\"rtl\">\n| المصطلح | التعريف |\n|---|---|\n| أ | ب |\n</div>");
        match &doc.preamble[..] {
            [Block::RtlTable(t)] => assert_eq!(t.rows.len(), 2),
            other => panic!("unexpected blocks {other:?}"),
        }
    }

    #[test]
    fn title_heading_becomes_document_title() {
        let doc = scan_document("# Credit Policy\n<div dir=\"rtl\">\n# سياسة الائتمان\n</div>\n## Purpose");
        assert_eq!(doc.title.as_deref(), Some("Credit Policy"));
        assert_eq!(doc.arabic_title.as_deref(), Some("سياسة الائتمان"));
        assert!(doc.preamble.is_empty());
        assert_eq!(doc.sections.len(), 1);
    }

    #[test]
    fn deep_headings_are_unnumbered() {
        let doc = scan_document("## A\n#### Note");
        assert_eq!(
            doc.sections[0].blocks,
            vec![Block::Heading {
                level: 4,
                text: "Note".into()
            }]
        );
    }

    #[test]
    fn subsection_before_section_is_unnumbered() {
        let doc = scan_document("### Loose\n## A");
        assert!(matches!(doc.preamble[0], Block::Heading { level: 3, .. }));
        assert_eq!(doc.sections[0].entry.number, 1);
    }

    #[test]
    fn bullets_group_into_list() {
        let doc = scan_document("- one\n- two\n* three\n\nafter");
        assert_eq!(
            doc.preamble,
            vec![
                Block::List(vec!["one".into(), "two".into(), "three".into()]),
                Block::Paragraph("after".into())
            ]
        );
    }

    #[test]
    fn rescanning_numbered_headings_does_not_compound() {
        let doc = scan_document("## 1. Purpose\n## 2. Scope\n### 2.1 Branches");
        let again = scan_document("## Purpose\n## Scope\n### Branches");
        assert_eq!(doc, again);
    }

    #[test]
    fn empty_document() {
        assert_eq!(scan_document(""), ScannedDocument::default());
    }
}
