//! Maud templates for the Word-compatible HTML document.
//!
//! Every text fragment goes through [`format_inline`], which escapes it before
//! adding inline tags, so it is interpolated with `PreEscaped`.

use super::inline::format_inline;
use super::scan::{Block, ScannedSection};
use super::table::{BilingualTable, Table};
use super::{TocSection, TocSubsection};
use crate::config::{ApprovalConfig, FooterConfig};
use maud::{Markup, PreEscaped, html};

/// Word-HTML namespaces on the root element, so the file opens as a document.
pub const HTML_OPEN: &str = r#"<html xmlns:o="urn:schemas-microsoft-com:office:office" xmlns:w="urn:schemas-microsoft-com:office:word" xmlns="http://www.w3.org/TR/REC-html40">"#;
pub const HTML_CLOSE: &str = "</html>";

/// Opens in Print Layout rather than Web Layout.
const WORD_VIEW: &str = "<!--[if gte mso 9]><xml><w:WordDocument><w:View>Print</w:View><w:Zoom>100</w:Zoom></w:WordDocument></xml><![endif]-->";

fn inline(text: &str) -> PreEscaped<String> {
    PreEscaped(format_inline(text))
}

/// Hard page break understood by Word.
pub fn page_break() -> Markup {
    html! {
        br.page-break clear="all" style="page-break-before: always";
    }
}

pub fn head(title: &str, css: &str) -> Markup {
    html! {
        head {
            meta charset="utf-8";
            meta name="ProgId" content="Word.Document";
            title { (title) }
            (PreEscaped(WORD_VIEW))
            style { (PreEscaped(css)) }
        }
    }
}

pub fn cover(title: &str, organization: &str, arabic_label: &str, logo: Option<&str>) -> Markup {
    html! {
        div.cover {
            @if let Some(src) = logo {
                img.logo src=(src) alt="Logo" width="160";
            }
            @if !organization.is_empty() {
                p.organization { (organization) }
            }
            h1.cover-title { (inline(title)) }
            p.cover-label dir="rtl" { (arabic_label) }
        }
    }
}

fn toc_subsection(sub: &TocSubsection) -> Markup {
    html! {
        p.toc-subsection {
            (sub.number) " " (inline(&sub.title))
            @if let Some(arabic) = &sub.arabic_title {
                span.toc-arabic dir="rtl" { " " (inline(arabic)) }
            }
        }
    }
}

pub fn table_of_contents(sections: &[TocSection]) -> Markup {
    html! {
        div.toc {
            h2.toc-title { "Table of Contents" }
            p.toc-title-ar dir="rtl" { "جدول المحتويات" }
            @for section in sections {
                p.toc-section {
                    (section.number) ". " (inline(&section.title))
                    @if let Some(arabic) = &section.arabic_title {
                        span.toc-arabic dir="rtl" { " " (inline(arabic)) }
                    }
                }
                @for sub in &section.subsections {
                    (toc_subsection(sub))
                }
            }
        }
    }
}

fn table(table: &Table, rtl: bool) -> Markup {
    html! {
        table.doc-table dir=[rtl.then_some("rtl")] {
            @for row in &table.rows {
                tr {
                    @for cell in &row.cells {
                        @if row.is_header {
                            th { (inline(cell)) }
                        } @else {
                            td { (inline(cell)) }
                        }
                    }
                }
            }
        }
    }
}

fn bilingual_table(table: &BilingualTable) -> Markup {
    html! {
        table.doc-table.bilingual-table {
            @if let Some(h) = &table.header {
                tr {
                    th { (inline(&h.english_term)) }
                    th { (inline(&h.english_full_form)) }
                    th dir="rtl" { (inline(&h.arabic_full_form)) }
                    th dir="rtl" { (inline(&h.arabic_term)) }
                }
            }
            @for row in &table.rows {
                tr {
                    td { (inline(&row.english_term)) }
                    td { (inline(&row.english_full_form)) }
                    td dir="rtl" { (inline(&row.arabic_full_form)) }
                    td dir="rtl" { (inline(&row.arabic_term)) }
                }
            }
        }
    }
}

fn subsection_header(sub: &TocSubsection) -> Markup {
    html! {
        div.subsection-header {
            h3 { (sub.number) " " (inline(&sub.title)) }
            @if let Some(arabic) = &sub.arabic_title {
                h3 dir="rtl" { (inline(arabic)) }
            }
        }
    }
}

fn heading(level: u8, text: &str) -> Markup {
    let text = inline(text);
    html! {
        @match level {
            1 => h1 { (text) },
            2 => h2 { (text) },
            3 => h3 { (text) },
            4 => h4 { (text) },
            5 => h5 { (text) },
            _ => h6 { (text) },
        }
    }
}

pub fn block(block: &Block) -> Markup {
    match block {
        Block::Paragraph(text) => html! { p { (inline(text)) } },
        Block::Heading { level, text } => heading(*level, text),
        Block::Subsection(sub) => subsection_header(sub),
        Block::Table(t) => table(t, false),
        Block::RtlTable(t) => table(t, true),
        Block::BilingualTable(t) => bilingual_table(t),
        Block::Rtl(lines) => html! {
            div.rtl-block dir="rtl" {
                @for line in lines {
                    (inline(line)) br;
                }
            }
        },
        Block::List(items) => html! {
            ul {
                @for item in items {
                    li { (inline(item)) }
                }
            }
        },
    }
}

/// A numbered section: page break unless first, header block, content container.
pub fn section(section: &ScannedSection, first: bool) -> Markup {
    let entry = &section.entry;
    html! {
        @if !first {
            (page_break())
        }
        div.section-header {
            h2.section-title { (entry.number) ". " (inline(&entry.title)) }
            @if let Some(arabic) = &entry.arabic_title {
                h2.section-title-ar dir="rtl" { (inline(arabic)) }
            }
        }
        div.section-content {
            @for b in &section.blocks {
                (block(b))
            }
        }
    }
}

pub fn diagram_page(src: &str) -> Markup {
    html! {
        (page_break())
        div.diagram-page {
            h2 { "Process Diagram" }
            p.diagram-title-ar dir="rtl" { "مخطط الإجراءات" }
            img.diagram src=(src) alt="Process diagram" width="600";
        }
    }
}

pub fn approval_table(approval: &ApprovalConfig) -> Markup {
    html! {
        div.approval {
            h2 { "Document Approval" }
            table.doc-table.approval-table {
                tr {
                    @for header in &approval.headers {
                        th { (header) }
                    }
                }
                @for row in &approval.rows {
                    tr {
                        @for cell in row {
                            td { (cell) }
                        }
                    }
                }
            }
        }
    }
}

pub fn footer(footer: &FooterConfig) -> Markup {
    html! {
        div.footer {
            p { (footer.text) }
        }
    }
}
