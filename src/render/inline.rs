//! Inline run formatting for paragraphs, headings, and table cells.
//!
//! Text is HTML-escaped first, then markdown runs are replaced in a fixed
//! order so nesting composes: bold, italic, underline, strikethrough, code.
//! `**x**` must be consumed before `*x*` can match its inner asterisks.

use maud::html;
use regex::Regex;
use std::sync::LazyLock;

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static UNDERLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"__(.+?)__").unwrap());
static STRIKE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~~(.+?)~~").unwrap());
static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`(.+?)`").unwrap());

/// Escape HTML special characters using maud's own escaping.
pub fn escape(text: &str) -> String {
    html! { (text) }.into_string()
}

/// Escape `text` and convert its inline markdown runs to HTML tags.
pub fn format_inline(text: &str) -> String {
    let escaped = escape(text);
    let out = BOLD.replace_all(&escaped, "<strong>$1</strong>");
    let out = ITALIC.replace_all(&out, "<em>$1</em>");
    let out = UNDERLINE.replace_all(&out, "<u>$1</u>");
    let out = STRIKE.replace_all(&out, "<strike>$1</strike>");
    let out = CODE.replace_all(&out, "<code>$1</code>");
    out.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold() {
        assert_eq!(format_inline("**Note**"), "<strong>Note</strong>");
    }

    #[test]
    fn italic() {
        assert_eq!(format_inline("an *important* rule"), "an <em>important</em> rule");
    }

    #[test]
    fn underline_and_strike() {
        assert_eq!(format_inline("__must__"), "<u>must</u>");
        assert_eq!(format_inline("~~old~~"), "<strike>old</strike>");
    }

    #[test]
    fn inline_code() {
        assert_eq!(format_inline("use `KYC-01`"), "use <code>KYC-01</code>");
    }

    #[test]
    fn italic_nested_in_bold() {
        assert_eq!(
            format_inline("**bold *inner* text**"),
            "<strong>bold <em>inner</em> text</strong>"
        );
    }

    #[test]
    fn mixed_runs_leave_no_markers() {
        let html = format_inline("**bold** and *italic* and `code`");
        assert_eq!(
            html,
            "<strong>bold</strong> and <em>italic</em> and <code>code</code>"
        );
        assert!(!html.contains('*'));
        assert!(!html.contains('`'));
    }

    #[test]
    fn html_is_escaped_before_formatting() {
        let html = format_inline("**<script>**");
        assert_eq!(html, "<strong>&lt;script&gt;</strong>");
    }

    #[test]
    fn unmatched_markers_stay_literal() {
        assert_eq!(format_inline("5 * 3"), "5 * 3");
    }

    #[test]
    fn arabic_text_passes_through() {
        assert_eq!(format_inline("**الغرض**"), "<strong>الغرض</strong>");
    }
}
