//! Shared test utilities for the policy-doc test suite.
//!
//! Provides sample bilingual policy documents and bulk extractors over
//! section lists.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let sections = parse_sections(&sample_policy_markdown());
//! assert_eq!(titles(&sections)[1], "سياسة الائتمان");
//! assert_eq!(orders(&sections), (0..sections.len()).collect::<Vec<_>>());
//! ```

use crate::section::Section;

// =========================================================================
// Sample documents
// =========================================================================

/// Two sections, no Arabic.
pub const PURPOSE_SCOPE: &str = "## Purpose\n\nThis is the purpose.\n\n## Scope\n\nApplies to all staff.";

/// A bilingual credit policy: document title, three numbered sections, two
/// subsections under Scope, a bullet list and a paired abbreviations table.
pub fn sample_policy_markdown() -> String {
    r#"# Credit Policy
<div dir="rtl">
# سياسة الائتمان
</div>

## Purpose
<div dir="rtl">
## الغرض
</div>

This policy sets the **minimum standards** for granting credit.

<div dir="rtl">
تحدد هذه السياسة المعايير الدنيا لمنح الائتمان.
</div>

## Scope

Applies to all lending units.

### Head Office
<div dir="rtl">
### المكتب الرئيسي
</div>

- Corporate lending
- Treasury

### Branches

Retail lending only.

## Abbreviations
<div dir="rtl">
## الاختصارات
</div>

| Term | Full Form |
|---|---|
| AML | Anti-Money Laundering |

<div dir="rtl">
| المصطلح | الشكل الكامل |
|---|---|
| AML | مكافحة غسل الأموال |
</div>
"#
    .to_string()
}

/// One abbreviations section with a paired Arabic title and table.
pub fn abbreviations_markdown() -> String {
    r#"## Abbreviations
<div dir="rtl">
## الاختصارات
</div>

| Term | Full Form |
|------|-----------|
| KYC | Know Your Customer |
| AML | Anti-Money Laundering |

<div dir="rtl">
| المصطلح | الشكل الكامل |
|------|-----------|
| KYC | اعرف عميلك |
| AML | مكافحة غسل الأموال |
</div>
"#
    .to_string()
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Titles in storage order.
pub fn titles(sections: &[Section]) -> Vec<&str> {
    sections.iter().map(|s| s.title.as_str()).collect()
}

/// `order` values in storage order.
pub fn orders(sections: &[Section]) -> Vec<usize> {
    sections.iter().map(|s| s.order).collect()
}
