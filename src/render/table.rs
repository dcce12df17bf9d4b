//! Pipe tables and bilingual abbreviation tables.
//!
//! Tables are parsed best-effort: the row right before a dash separator row is
//! a header, every other row is data, and cells are split on `|` and trimmed.
//! Ragged rows are kept as they are.
//!
//! An English table whose header has a `Term` cell and a `Full Form` cell can be
//! paired with the Arabic table that follows it. The pair renders as one
//! four-column table:
//!
//! ```text
//! | English term | English full form | Arabic full form | Arabic term |
//! ```

/// One parsed row of a pipe table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<String>,
    pub is_header: bool,
}

/// A pipe table in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

impl Table {
    /// First header row, if the table had a separator.
    pub fn header(&self) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.is_header)
    }

    /// Data rows (everything that is not a header).
    pub fn data_rows(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter().filter(|r| !r.is_header)
    }

    /// Whether the header marks an abbreviations table (`Term` / `Full Form`).
    pub fn is_abbreviation_table(&self) -> bool {
        self.header().is_some_and(|h| {
            let has = |name: &str| h.cells.iter().any(|c| c.trim().eq_ignore_ascii_case(name));
            has("Term") && has("Full Form")
        })
    }

    fn is_ragged(&self) -> bool {
        let mut widths = self.rows.iter().map(|r| r.cells.len());
        match widths.next() {
            Some(first) => widths.any(|w| w != first),
            None => false,
        }
    }
}

/// A row of the combined English/Arabic abbreviations table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BilingualRow {
    pub english_term: String,
    pub english_full_form: String,
    pub arabic_full_form: String,
    pub arabic_term: String,
}

/// English and Arabic abbreviation tables merged row by row.
#[derive(Debug, Clone, PartialEq)]
pub struct BilingualTable {
    pub header: Option<BilingualRow>,
    pub rows: Vec<BilingualRow>,
}

/// Whether a line belongs to a pipe table.
pub fn is_table_line(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

/// Whether a table line is a `|---|:---:|` separator row.
pub fn is_separator_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('|')
        && trimmed.contains('-')
        && trimmed
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' ' | '\t'))
}

/// Split a table line into trimmed cells, ignoring the outer pipes.
pub fn split_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

/// Parse consecutive table lines. A missing separator means no header row.
pub fn parse_table<S: AsRef<str>>(lines: &[S]) -> Table {
    let mut rows = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if is_separator_row(line) {
            continue;
        }
        let is_header = lines
            .get(i + 1)
            .is_some_and(|next| is_separator_row(next.as_ref()));
        rows.push(TableRow {
            cells: split_cells(line),
            is_header,
        });
    }
    let table = Table { rows };
    if table.is_ragged() {
        tracing::warn!("table rows have differing cell counts");
    }
    table
}

fn cell(row: Option<&TableRow>, index: usize) -> String {
    row.and_then(|r| r.cells.get(index))
        .cloned()
        .unwrap_or_default()
}

fn combine(english: Option<&TableRow>, arabic: Option<&TableRow>) -> BilingualRow {
    BilingualRow {
        english_term: cell(english, 0),
        english_full_form: cell(english, 1),
        arabic_full_form: cell(arabic, 1),
        arabic_term: cell(arabic, 0),
    }
}

/// Merge an English abbreviations table with its Arabic counterpart.
///
/// Rows are paired by position. When the counts differ the shorter side
/// contributes empty cells.
pub fn pair_tables(english: &Table, arabic: &Table) -> BilingualTable {
    let header = match (english.header(), arabic.header()) {
        (None, None) => None,
        (en, ar) => Some(combine(en, ar)),
    };

    let en_rows: Vec<&TableRow> = english.data_rows().collect();
    let ar_rows: Vec<&TableRow> = arabic.data_rows().collect();
    if en_rows.len() != ar_rows.len() {
        tracing::warn!(
            english = en_rows.len(),
            arabic = ar_rows.len(),
            "abbreviation tables have different row counts"
        );
    }

    let count = en_rows.len().max(ar_rows.len());
    let rows = (0..count)
        .map(|i| combine(en_rows.get(i).copied(), ar_rows.get(i).copied()))
        .collect();

    BilingualTable { header, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_detection() {
        assert!(is_separator_row("|---|---|"));
        assert!(is_separator_row("| :--- | ---: |"));
        assert!(!is_separator_row("| a | b |"));
        assert!(!is_separator_row("| | |"));
    }

    #[test]
    fn cells_are_split_and_trimmed() {
        assert_eq!(split_cells("| KYC |  Know Your Customer |"), vec!["KYC", "Know Your Customer"]);
    }

    #[test]
    fn cells_without_outer_pipes() {
        assert_eq!(split_cells("|a|b"), vec!["a", "b"]);
    }

    #[test]
    fn row_before_separator_is_header() {
        let table = parse_table(&["| Term | Full Form |", "|---|---|", "| AML | Anti-Money Laundering |"]);
        assert_eq!(table.rows.len(), 2);
        assert!(table.rows[0].is_header);
        assert!(!table.rows[1].is_header);
        assert!(table.is_abbreviation_table());
    }

    #[test]
    fn missing_separator_has_no_header() {
        let table = parse_table(&["| a | b |", "| c | d |"]);
        assert!(table.header().is_none());
        assert_eq!(table.data_rows().count(), 2);
    }

    #[test]
    fn ragged_rows_are_kept() {
        let table = parse_table(&["| a | b | c |", "|---|---|---|", "| d |"]);
        assert_eq!(table.rows[1].cells, vec!["d"]);
    }

    #[test]
    fn definitions_table_is_not_abbreviations() {
        let table = parse_table(&["| Term | Definition |", "|---|---|"]);
        assert!(!table.is_abbreviation_table());
    }

    #[test]
    fn abbreviation_header_needs_exact_cells() {
        let loose = parse_table(&["| Terms of Use | Full Form Notes |", "|---|---|"]);
        assert!(!loose.is_abbreviation_table());
        let cased = parse_table(&["|  term | FULL FORM |", "|---|---|"]);
        assert!(cased.is_abbreviation_table());
    }

    #[test]
    fn pairing_orders_columns() {
        let en = parse_table(&["| Term | Full Form |", "|---|---|", "| KYC | Know Your Customer |"]);
        let ar = parse_table(&["| المصطلح | الشكل الكامل |", "|---|---|", "| KYC | اعرف عميلك |"]);
        let paired = pair_tables(&en, &ar);

        let header = paired.header.unwrap();
        assert_eq!(header.english_term, "Term");
        assert_eq!(header.arabic_term, "المصطلح");

        assert_eq!(
            paired.rows,
            vec![BilingualRow {
                english_term: "KYC".into(),
                english_full_form: "Know Your Customer".into(),
                arabic_full_form: "اعرف عميلك".into(),
                arabic_term: "KYC".into(),
            }]
        );
    }

    #[test]
    fn pairing_pads_short_side() {
        let en = parse_table(&["| Term | Full Form |", "|---|---|", "| A | Alpha |", "| B | Beta |"]);
        let ar = parse_table(&["| المصطلح | الشكل الكامل |", "|---|---|", "| A | ألفا |"]);
        let paired = pair_tables(&en, &ar);
        assert_eq!(paired.rows.len(), 2);
        assert_eq!(paired.rows[1].english_term, "B");
        assert_eq!(paired.rows[1].arabic_full_form, "");
    }
}
