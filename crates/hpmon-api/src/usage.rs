// Usage page extraction.
//
// The printer's usage view carries its lifetime page counters in the
// `tbl-1851` table: second row, second column for simplex, third for duplex.
// html5ever inserts the implicit <tbody>, so the path holds for firmware that
// omits it.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Error;

/// `id` attribute of the usage table.
pub const USAGE_TABLE_ID: &str = "tbl-1851";

/// Characters firmware uses as digit-group separators.
const GROUP_SEPARATORS: [char; 5] = [',', ' ', '\u{a0}', '\u{202f}', '\''];

/// Lifetime page counters read from one usage page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub simplex: u64,
    pub duplex: u64,
}

/// One of the two counter cells in the usage table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Simplex,
    Duplex,
}

impl Cell {
    pub fn name(self) -> &'static str {
        match self {
            Self::Simplex => "simplex",
            Self::Duplex => "duplex",
        }
    }

    fn column(self) -> usize {
        match self {
            Self::Simplex => 2,
            Self::Duplex => 3,
        }
    }

    /// CSS selector for the cell's value `<div>`.
    pub fn selector(self) -> String {
        format!(
            "#{USAGE_TABLE_ID} > tbody > tr:nth-of-type(2) > td:nth-of-type({}) > div",
            self.column()
        )
    }
}

/// A parsed usage page.
pub struct UsagePage {
    document: Html,
}

impl UsagePage {
    /// Parse markup leniently. Only an empty body is refused here; anything
    /// else becomes a document, however broken.
    pub fn parse(markup: &str) -> Result<Self, Error> {
        if markup.trim().is_empty() {
            return Err(Error::Parse("empty response body".into()));
        }
        Ok(Self {
            document: Html::parse_document(markup),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::parse(decode(bytes)?)
    }

    /// Read both counters. Either both are returned or neither.
    pub fn counters(&self) -> Result<Counters, Error> {
        Ok(Counters {
            simplex: self.cell(Cell::Simplex)?,
            duplex: self.cell(Cell::Duplex)?,
        })
    }

    pub fn cell(&self, cell: Cell) -> Result<u64, Error> {
        let selector = Selector::parse(&cell.selector())
            .map_err(|e| Error::Parse(format!("invalid selector for {}: {e:?}", cell.name())))?;

        let element = self
            .document
            .select(&selector)
            .next()
            .ok_or(Error::PathNotFound { cell: cell.name() })?;

        let text: String = element.text().collect();
        trace!(cell = cell.name(), raw = %text, "matched usage cell");
        parse_count(cell, &text)
    }
}

/// View a raw body as markup. Invalid UTF-8 is refused rather than patched
/// with replacement characters.
pub fn decode(bytes: &[u8]) -> Result<&str, Error> {
    std::str::from_utf8(bytes)
        .map_err(|e| Error::Parse(format!("body is not valid UTF-8: {e}")))
}

/// Parse markup and read both counters.
pub fn extract(markup: &str) -> Result<Counters, Error> {
    UsagePage::parse(markup)?.counters()
}

/// Strip group separators and parse a base-10 page count.
fn parse_count(cell: Cell, raw: &str) -> Result<u64, Error> {
    let digits: String = raw
        .trim()
        .chars()
        .filter(|c| !GROUP_SEPARATORS.contains(c))
        .collect();

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::NumericFormat {
            cell: cell.name(),
            text: raw.trim().to_owned(),
        });
    }

    digits.parse().map_err(|_| Error::NumericFormat {
        cell: cell.name(),
        text: raw.trim().to_owned(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn page(simplex: &str, duplex: &str) -> String {
        format!(
            r#"<html><body>
            <table id="tbl-1851" class="hpTable">
              <tbody>
                <tr><th>Type</th><th>Simplex</th><th>Duplex</th></tr>
                <tr>
                  <td><div>Letter</div></td>
                  <td><div>{simplex}</div></td>
                  <td><div>{duplex}</div></td>
                </tr>
              </tbody>
            </table>
            </body></html>"#
        )
    }

    #[test]
    fn strips_thousands_separators() {
        let counters = extract(&page("12,345", "1,000,001")).unwrap();
        assert_eq!(
            counters,
            Counters {
                simplex: 12_345,
                duplex: 1_000_001
            }
        );
    }

    #[test]
    fn tolerates_whitespace_and_nbsp_grouping() {
        let counters = extract(&page("  12\u{a0}345 ", "\n 500\n")).unwrap();
        assert_eq!(counters.simplex, 12_345);
        assert_eq!(counters.duplex, 500);
    }

    #[test]
    fn missing_tbody_is_inserted_by_parser() {
        let markup = r#"<table id="tbl-1851">
            <tr><td>a</td><td><div>x</div></td><td><div>y</div></td></tr>
            <tr><td>Letter</td><td><div>7</div></td><td><div>3</div></td></tr>
            </table>"#;
        assert_eq!(
            extract(markup).unwrap(),
            Counters {
                simplex: 7,
                duplex: 3
            }
        );
    }

    #[test]
    fn unclosed_tags_still_parse() {
        let markup = r#"<html><body><table id="tbl-1851"><tbody>
            <tr><td>h<td>h<td>h
            <tr><td>Letter<td><div>42</div><td><div>9</div>
            "#;
        assert_eq!(
            extract(markup).unwrap(),
            Counters {
                simplex: 42,
                duplex: 9
            }
        );
    }

    #[test]
    fn missing_table_is_path_not_found() {
        let markup = "<html><body><table id=\"other\"></table></body></html>";
        assert!(matches!(
            extract(markup),
            Err(Error::PathNotFound { cell: "simplex" })
        ));
    }

    #[test]
    fn missing_duplex_column_is_path_not_found() {
        let markup = r#"<table id="tbl-1851"><tbody>
            <tr><td></td><td><div>1</div></td></tr>
            <tr><td>Letter</td><td><div>10</div></td></tr>
            </tbody></table>"#;
        assert!(matches!(
            extract(markup),
            Err(Error::PathNotFound { cell: "duplex" })
        ));
    }

    #[test]
    fn non_numeric_cell_is_numeric_format() {
        let err = extract(&page("N/A", "500")).unwrap_err();
        match err {
            Error::NumericFormat { cell, text } => {
                assert_eq!(cell, "simplex");
                assert_eq!(text, "N/A");
            }
            other => panic!("expected NumericFormat, got {other:?}"),
        }
    }

    #[test]
    fn empty_cell_is_numeric_format() {
        assert!(matches!(
            extract(&page("1", "")),
            Err(Error::NumericFormat { cell: "duplex", .. })
        ));
    }

    #[test]
    fn negative_and_decimal_values_are_rejected() {
        assert!(matches!(
            extract(&page("-5", "1")),
            Err(Error::NumericFormat { .. })
        ));
        assert!(matches!(
            extract(&page("5.5", "1")),
            Err(Error::NumericFormat { .. })
        ));
    }

    #[test]
    fn overflowing_value_is_numeric_format() {
        assert!(matches!(
            extract(&page("99999999999999999999999", "1")),
            Err(Error::NumericFormat { .. })
        ));
    }

    #[test]
    fn empty_body_is_parse_failure() {
        assert!(matches!(extract("  \n"), Err(Error::Parse(_))));
    }

    #[test]
    fn invalid_utf8_is_parse_failure() {
        assert!(matches!(
            UsagePage::from_bytes(&[0x3c, 0xff, 0xfe, 0x3e]),
            Err(Error::Parse(_))
        ));
    }
}
