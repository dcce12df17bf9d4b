//! Bilingual document templates.
//!
//! A template is a tree of English/Arabic pairs, usually read from JSON:
//!
//! ```json
//! {
//!   "DocumentTitle": { "English": "Credit Policy", "Arabic": "سياسة الائتمان" },
//!   "DocumentSections": [
//!     {
//!       "SectionTitle": { "English": "Abbreviations", "Arabic": "الاختصارات" },
//!       "Content": [
//!         { "Term": { "English": "KYC", "Arabic": "KYC" },
//!           "FullForm": { "English": "Know Your Customer", "Arabic": "اعرف عميلك" } }
//!       ]
//!     },
//!     {
//!       "SectionTitle": { "English": "Roles", "Arabic": "الأدوار" },
//!       "SubSections": [
//!         { "Title": { "English": "Board", "Arabic": "المجلس" },
//!           "Content": { "English": "Approves the policy.", "Arabic": "يعتمد السياسة." } }
//!       ]
//!     }
//!   ],
//!   "Footer": { "English": "Internal Use Only", "Arabic": "للاستخدام الداخلي" }
//! }
//! ```
//!
//! [`DocumentTemplate::to_markdown`] writes every English element followed by
//! its Arabic counterpart in an RTL block, which is the layout the renderer
//! pairs into bilingual headings and four-column abbreviation tables. A
//! missing Arabic leaf produces an empty RTL block; use
//! [`DocumentTemplate::missing_translations`] to find them first.

use serde::{Deserialize, Serialize};

const RTL_OPEN: &str = "<div dir=\"rtl\">";
const RTL_CLOSE: &str = "</div>";

/// An English text and its Arabic translation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Bilingual {
    pub english: String,
    #[serde(default)]
    pub arabic: String,
}

impl Bilingual {
    pub fn new(english: impl Into<String>, arabic: impl Into<String>) -> Self {
        Self {
            english: english.into(),
            arabic: arabic.into(),
        }
    }

    fn is_untranslated(&self) -> bool {
        !self.english.trim().is_empty() && self.arabic.trim().is_empty()
    }
}

/// One entry of a section's `Content` list.
///
/// Consecutive abbreviations (or definitions) are written as one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentItem {
    Abbreviation {
        #[serde(rename = "Term")]
        term: Bilingual,
        #[serde(rename = "FullForm")]
        full_form: Bilingual,
    },
    Definition {
        #[serde(rename = "Term")]
        term: Bilingual,
        #[serde(rename = "Definition")]
        definition: Bilingual,
    },
    Paragraph(Bilingual),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateSubSection {
    pub title: Bilingual,
    #[serde(default)]
    pub content: Bilingual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateSection {
    pub section_title: Bilingual,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<ContentItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_sections: Vec<TemplateSubSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DocumentTemplate {
    pub document_title: Bilingual,
    #[serde(default)]
    pub document_sections: Vec<TemplateSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<Bilingual>,
}

#[derive(Clone, Copy, PartialEq)]
enum TableKind {
    Abbreviations,
    Definitions,
}

impl TableKind {
    fn headers(self) -> ([&'static str; 2], [&'static str; 2]) {
        match self {
            TableKind::Abbreviations => (["Term", "Full Form"], ["المصطلح", "الشكل الكامل"]),
            TableKind::Definitions => (["Term", "Definition"], ["المصطلح", "التعريف"]),
        }
    }
}

fn table_pair(item: &ContentItem) -> Option<(TableKind, &Bilingual, &Bilingual)> {
    match item {
        ContentItem::Abbreviation { term, full_form } => {
            Some((TableKind::Abbreviations, term, full_form))
        }
        ContentItem::Definition { term, definition } => {
            Some((TableKind::Definitions, term, definition))
        }
        ContentItem::Paragraph(_) => None,
    }
}

/// Table cells are single-line and must not contain the column separator.
fn cell(text: &str) -> String {
    text.trim().replace('|', "/").replace('\n', " ")
}

fn rtl(out: &mut Vec<String>, lines: Vec<String>) {
    out.push(RTL_OPEN.to_string());
    out.extend(lines);
    out.push(RTL_CLOSE.to_string());
    out.push(String::new());
}

fn heading(out: &mut Vec<String>, level: usize, text: &Bilingual) {
    let hashes = "#".repeat(level);
    out.push(format!("{hashes} {}", text.english.trim()));
    let arabic = text.arabic.trim();
    let inner = if arabic.is_empty() {
        Vec::new()
    } else {
        vec![format!("{hashes} {arabic}")]
    };
    rtl(out, inner);
}

fn paragraph(out: &mut Vec<String>, text: &Bilingual) {
    out.push(text.english.trim().to_string());
    out.push(String::new());
    let arabic = text.arabic.trim();
    let inner = if arabic.is_empty() {
        Vec::new()
    } else {
        vec![arabic.to_string()]
    };
    rtl(out, inner);
}

fn table(out: &mut Vec<String>, kind: TableKind, rows: &[(&Bilingual, &Bilingual)]) {
    let (english, arabic) = kind.headers();
    out.push(format!("| {} | {} |", english[0], english[1]));
    out.push("|---|---|".to_string());
    for (term, value) in rows {
        out.push(format!("| {} | {} |", cell(&term.english), cell(&value.english)));
    }
    out.push(String::new());

    let mut inner = vec![
        format!("| {} | {} |", arabic[0], arabic[1]),
        "|---|---|".to_string(),
    ];
    for (term, value) in rows {
        let term = if term.arabic.trim().is_empty() {
            &term.english
        } else {
            &term.arabic
        };
        inner.push(format!("| {} | {} |", cell(term), cell(&value.arabic)));
    }
    rtl(out, inner);
}

fn section_content(out: &mut Vec<String>, content: &[ContentItem]) {
    let mut i = 0;
    while i < content.len() {
        match table_pair(&content[i]) {
            Some((kind, ..)) => {
                let rows: Vec<(&Bilingual, &Bilingual)> = content[i..]
                    .iter()
                    .map_while(|item| {
                        table_pair(item)
                            .filter(|(k, ..)| *k == kind)
                            .map(|(_, term, value)| (term, value))
                    })
                    .collect();
                i += rows.len();
                table(out, kind, &rows);
            }
            None => {
                if let ContentItem::Paragraph(text) = &content[i] {
                    paragraph(out, text);
                }
                i += 1;
            }
        }
    }
}

impl DocumentTemplate {
    /// Markdown in the English-then-Arabic layout the renderer pairs.
    pub fn to_markdown(&self) -> String {
        let mut out = Vec::new();
        heading(&mut out, 1, &self.document_title);
        for section in &self.document_sections {
            heading(&mut out, 2, &section.section_title);
            section_content(&mut out, &section.content);
            for sub in &section.sub_sections {
                heading(&mut out, 3, &sub.title);
                if !sub.content.english.trim().is_empty() {
                    paragraph(&mut out, &sub.content);
                }
            }
        }
        out.join("\n").trim_end().to_string() + "\n"
    }

    /// Paths of English leaves whose Arabic translation is empty.
    pub fn missing_translations(&self) -> Vec<String> {
        let mut missing = Vec::new();
        let mut check = |path: String, text: &Bilingual| {
            if text.is_untranslated() {
                missing.push(format!("{path}.Arabic"));
            }
        };

        check("DocumentTitle".to_string(), &self.document_title);
        for (s, section) in self.document_sections.iter().enumerate() {
            let base = format!("DocumentSections[{s}]");
            check(format!("{base}.SectionTitle"), &section.section_title);
            for (c, item) in section.content.iter().enumerate() {
                let path = format!("{base}.Content[{c}]");
                match item {
                    ContentItem::Abbreviation { full_form, .. } => {
                        check(format!("{path}.FullForm"), full_form);
                    }
                    ContentItem::Definition { term, definition } => {
                        check(format!("{path}.Term"), term);
                        check(format!("{path}.Definition"), definition);
                    }
                    ContentItem::Paragraph(text) => check(path, text),
                }
            }
            for (n, sub) in section.sub_sections.iter().enumerate() {
                let path = format!("{base}.SubSections[{n}]");
                check(format!("{path}.Title"), &sub.title);
                check(format!("{path}.Content"), &sub.content);
            }
        }
        if let Some(footer) = &self.footer {
            check("Footer".to_string(), footer);
        }
        missing
    }

    /// Footer line for the rendered document, English then Arabic.
    pub fn footer_text(&self) -> Option<String> {
        let footer = self.footer.as_ref()?;
        let english = footer.english.trim();
        let arabic = footer.arabic.trim();
        match (english.is_empty(), arabic.is_empty()) {
            (true, true) => None,
            (false, true) => Some(english.to_string()),
            (true, false) => Some(arabic.to_string()),
            (false, false) => Some(format!("{english} / {arabic}")),
        }
    }

    /// Heading outline as `(title, level)` pairs, ready for placeholder creation.
    pub fn outline(&self) -> Vec<(String, u8)> {
        let mut outline = vec![(self.document_title.english.trim().to_string(), 1)];
        for section in &self.document_sections {
            outline.push((section.section_title.english.trim().to_string(), 2));
            for sub in &section.sub_sections {
                outline.push((sub.title.english.trim().to_string(), 3));
            }
        }
        outline
    }
}

fn paragraph_item(english: &str, arabic: &str) -> ContentItem {
    ContentItem::Paragraph(Bilingual::new(english, arabic))
}

fn abbreviation(term: &str, english: &str, arabic: &str) -> ContentItem {
    ContentItem::Abbreviation {
        term: Bilingual::new(term, term),
        full_form: Bilingual::new(english, arabic),
    }
}

fn definition(term: (&str, &str), text: (&str, &str)) -> ContentItem {
    ContentItem::Definition {
        term: Bilingual::new(term.0, term.1),
        definition: Bilingual::new(text.0, text.1),
    }
}

fn sub_section(title: (&str, &str), content: (&str, &str)) -> TemplateSubSection {
    TemplateSubSection {
        title: Bilingual::new(title.0, title.1),
        content: Bilingual::new(content.0, content.1),
    }
}

fn section(
    title: (&str, &str),
    content: Vec<ContentItem>,
    sub_sections: Vec<TemplateSubSection>,
) -> TemplateSection {
    TemplateSection {
        section_title: Bilingual::new(title.0, title.1),
        content,
        sub_sections,
    }
}

/// The standard bank-policy skeleton, fully translated.
pub fn standard_policy_template(title: Bilingual) -> DocumentTemplate {
    DocumentTemplate {
        document_title: title,
        document_sections: vec![
            section(
                ("Purpose", "الغرض"),
                vec![paragraph_item(
                    "This policy sets out the principles and minimum requirements the bank applies.",
                    "تحدد هذه السياسة المبادئ والمتطلبات الدنيا التي يطبقها البنك.",
                )],
                vec![],
            ),
            section(
                ("Scope", "النطاق"),
                vec![paragraph_item(
                    "This policy applies to all departments, branches and staff of the bank.",
                    "تنطبق هذه السياسة على جميع إدارات البنك وفروعه وموظفيه.",
                )],
                vec![],
            ),
            section(
                ("Abbreviations", "الاختصارات"),
                vec![
                    abbreviation("AML", "Anti-Money Laundering", "مكافحة غسل الأموال"),
                    abbreviation("KYC", "Know Your Customer", "اعرف عميلك"),
                    abbreviation("CBO", "Central Bank of Oman", "البنك المركزي العماني"),
                ],
                vec![],
            ),
            section(
                ("Definitions", "التعريفات"),
                vec![
                    definition(
                        ("Bank", "البنك"),
                        ("The institution that owns this policy.", "المؤسسة المالكة لهذه السياسة."),
                    ),
                    definition(
                        ("Policy Owner", "مالك السياسة"),
                        (
                            "The department accountable for maintaining this policy.",
                            "الإدارة المسؤولة عن تحديث هذه السياسة.",
                        ),
                    ),
                ],
                vec![],
            ),
            section(
                ("Policy Statements", "بيانات السياسة"),
                vec![paragraph_item(
                    "The bank shall comply with all applicable laws and regulations.",
                    "يلتزم البنك بجميع القوانين واللوائح المعمول بها.",
                )],
                vec![],
            ),
            section(
                ("Roles and Responsibilities", "الأدوار والمسؤوليات"),
                vec![],
                vec![
                    sub_section(
                        ("Board of Directors", "مجلس الإدارة"),
                        ("Approves the policy and its amendments.", "يعتمد السياسة وتعديلاتها."),
                    ),
                    sub_section(
                        ("Policy Owner", "مالك السياسة"),
                        (
                            "Maintains the policy and monitors compliance.",
                            "يحدث السياسة ويراقب الالتزام بها.",
                        ),
                    ),
                    sub_section(
                        ("Compliance Department", "إدارة الالتزام"),
                        (
                            "Reviews the policy against regulatory requirements.",
                            "تراجع السياسة وفق المتطلبات الرقابية.",
                        ),
                    ),
                ],
            ),
            section(
                ("Review and Approval", "المراجعة والاعتماد"),
                vec![paragraph_item(
                    "This policy is reviewed at least once a year or when regulations change.",
                    "تتم مراجعة هذه السياسة مرة واحدة سنوياً على الأقل أو عند تغير اللوائح.",
                )],
                vec![],
            ),
        ],
        footer: Some(Bilingual::new("Internal Use Only", "للاستخدام الداخلي فقط")),
    }
}
