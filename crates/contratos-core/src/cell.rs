/// Raw spreadsheet cell model.
///
/// Loaders normalize whatever their source library produces into
/// [`CellValue`] at the matrix boundary, so the rest of the engine never sees
/// library-specific cell types. Rows may be ragged; always read through
/// [`cell_at`] rather than indexing.
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single raw cell value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// A cell the source already typed as a calendar date.
    Date(NaiveDate),
    /// A numeric cell (including unformatted Excel date serials).
    Number(f64),
    /// Free text as typed in the sheet.
    Text(String),
    /// An empty, null, or error cell.
    #[default]
    Empty,
}

/// A sheet as an ordered sequence of rows. Row 0 is the header row.
pub type RawSheet = Vec<Vec<CellValue>>;

/// A named sheet handed to the extractor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetInput {
    /// Sheet (tab) name, used for provenance and default contract numbers.
    pub name: String,
    /// Header row followed by data rows.
    pub rows: RawSheet,
}

impl SheetInput {
    /// Creates a named sheet from its rows.
    pub fn new(name: impl Into<String>, rows: RawSheet) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

static EMPTY: CellValue = CellValue::Empty;

/// Returns the cell at `col` in `row`, or [`CellValue::Empty`] when the row is short.
pub fn cell_at(row: &[CellValue], col: usize) -> &CellValue {
    row.get(col).unwrap_or(&EMPTY)
}

/// Returns `true` when every cell in the row is blank.
pub fn row_is_blank(row: &[CellValue]) -> bool {
    row.iter().all(CellValue::is_blank)
}

impl CellValue {
    /// Returns `true` for [`CellValue::Empty`], whitespace-only text and NaN.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(n) => n.is_nan(),
            Self::Date(_) => false,
        }
    }

    /// Returns the numeric payload of a [`CellValue::Number`] cell.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Number(_) | Self::Text(_) | Self::Date(_) | Self::Empty => None,
        }
    }

    /// Returns the trimmed text of a [`CellValue::Text`] cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.trim()),
            Self::Number(_) | Self::Date(_) | Self::Empty => None,
        }
    }

    /// Renders the cell as trimmed display text; blank cells give `""`.
    ///
    /// Whole numbers render without a fractional part so that a numeric
    /// contract number like `123` does not become `"123.0"`.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.trim().to_owned(),
            Self::Number(n) => format_number(*n),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::Empty => String::new(),
        }
    }
}

fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return String::new();
    }
    if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Empty, Into::into)
    }
}

/// Builds a text-only [`RawSheet`] from string literals. Empty strings become blank cells.
pub fn text_sheet(rows: &[&[&str]]) -> RawSheet {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|s| {
                    if s.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::from(*s)
                    }
                })
                .collect()
        })
        .collect()
}
