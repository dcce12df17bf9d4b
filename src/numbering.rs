//! Heading recognition and numeric-prefix parsing.
//!
//! Both the section model and the renderer read the same textual convention:
//! ATX headings (`#` to `######`) whose titles may carry a number prefix left
//! over from an earlier render (`3. Scope`, `2.1 Background`). This module
//! parses both parts consistently. It owns no data structure; the two
//! components share only the text format.
//!
//! ## Number Prefixes
//!
//! A prefix is a run of dot-separated digit groups, an optional trailing dot,
//! and at least one space:
//! - `3. Some Title` → number="3", title="Some Title"
//! - `2.1 Background` → number="2.1", title="Background"
//! - `1.2.3. Deep` → number="1.2.3", title="Deep"
//! - `Purpose` → number=None, title="Purpose"
//! - `2024` → number=None, title="2024" (no space, nothing follows)

/// Result of splitting a heading title like `2.1 Background`.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberedTitle<'a> {
    /// Dotted number prefix if present, without the trailing dot.
    pub number: Option<&'a str>,
    /// Title text with the prefix removed.
    pub title: &'a str,
}

/// An ATX heading line split into its level and raw title text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heading<'a> {
    pub level: u8,
    pub text: &'a str,
}

/// Parse an ATX heading: 1–6 `#` at column 0, whitespace, then non-empty text.
///
/// Seven or more `#`, a missing space, or an empty title are not headings.
pub fn parse_heading(line: &str) -> Option<Heading<'_>> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }
    let text = rest.trim();
    if text.is_empty() {
        return None;
    }
    Some(Heading {
        level: hashes as u8,
        text,
    })
}

/// Split an optional dotted number prefix off a heading title.
pub fn split_number_prefix(title: &str) -> NumberedTitle<'_> {
    let title = title.trim();
    let mut end = 0;
    let mut expect_digit = true;
    for (i, c) in title.char_indices() {
        if c.is_ascii_digit() {
            expect_digit = false;
            end = i + 1;
        } else if c == '.' && !expect_digit {
            expect_digit = true;
            end = i + 1;
        } else {
            break;
        }
    }
    if end == 0 {
        return NumberedTitle {
            number: None,
            title,
        };
    }
    let rest = &title[end..];
    if !rest.starts_with(|c: char| c.is_whitespace()) || rest.trim().is_empty() {
        return NumberedTitle {
            number: None,
            title,
        };
    }
    NumberedTitle {
        number: Some(title[..end].trim_end_matches('.')),
        title: rest.trim_start(),
    }
}

/// Title text with any number prefix removed.
pub fn strip_number_prefix(title: &str) -> &str {
    split_number_prefix(title).title
}
