/// Spreadsheet loading for the contract extraction engine.
///
/// This crate turns file bytes into [`SheetInput`] matrices for
/// [`contratos_core`]. The `calamine`, `csv` and `zip` dependencies are
/// confined to this crate and do not bleed into `contratos-core`.
///
/// # Formats
///
/// | Detected by | Format | Reader |
/// |---|---|---|
/// | `PK` signature + `xl/workbook.xml` | `.xlsx` / `.xlsm` | `calamine::Xlsx` |
/// | `PK` signature + `content.xml` | `.ods` | `calamine::Ods` |
/// | OLE2 signature | `.xls` | `calamine::Xls` |
/// | anything else | delimited text | `csv` |
///
/// For `.xlsx` files the 1904 epoch flag is read from the archive and
/// reported on [`Workbook::date1904`]; callers fold it into
/// `ExtractionConfig::date1904`.
use std::fmt;
use std::io::Cursor;
use std::path::Path;

use calamine::{Ods, Reader, Xls, Xlsx, open_workbook_from_rs};
use contratos_core::SheetInput;
use tracing::{debug, info, warn};

mod epoch;
pub mod error;
mod sheet;
mod text;

pub use epoch::workbook_uses_1904;
pub use error::LoadError;
pub use sheet::{cell_from_data, range_to_rows};
pub use text::{decode_text, parse_delimited, sniff_delimiter};

const OLE_SIGNATURE: &[u8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";
const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// Container format of a loaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Office Open XML workbook.
    Xlsx,
    /// Legacy binary workbook.
    Xls,
    /// OpenDocument spreadsheet.
    Ods,
    /// Delimited text.
    Csv,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
            Self::Ods => "ods",
            Self::Csv => "csv",
        };
        f.write_str(s)
    }
}

/// Every sheet of one file, ready for extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    /// Display name used in provenance (file name without directories).
    pub file_name: String,
    pub format: SourceFormat,
    /// Whether the workbook declares the Mac 1904 date system.
    pub date1904: bool,
    /// Sheets in workbook order. Delimited text gives exactly one sheet.
    pub sheets: Vec<SheetInput>,
}

impl Workbook {
    /// Names of all sheets, in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    /// Returns the sheet called `name`, compared case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MissingSheet`] listing the available names.
    pub fn sheet(&self, name: &str) -> Result<&SheetInput, LoadError> {
        let wanted = name.trim().to_lowercase();
        self.sheets
            .iter()
            .find(|s| s.name.trim().to_lowercase() == wanted)
            .ok_or_else(|| LoadError::MissingSheet {
                sheet: name.to_owned(),
                available: self.sheet_names(),
            })
    }

    /// Keeps only the sheet called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MissingSheet`] when no sheet matches.
    pub fn retain_sheet(&mut self, name: &str) -> Result<(), LoadError> {
        let kept = self.sheet(name)?.clone();
        self.sheets = vec![kept];
        Ok(())
    }
}

/// Detects the container format from the leading bytes.
pub fn detect_format(bytes: &[u8]) -> SourceFormat {
    if bytes.starts_with(OLE_SIGNATURE) {
        return SourceFormat::Xls;
    }
    if bytes.starts_with(ZIP_SIGNATURE) {
        let Ok(mut archive) = zip::ZipArchive::new(Cursor::new(bytes)) else {
            return SourceFormat::Xlsx;
        };
        if archive.by_name("content.xml").is_ok() {
            return SourceFormat::Ods;
        }
        return SourceFormat::Xlsx;
    }
    SourceFormat::Csv
}

/// Loads every sheet from in-memory file bytes.
///
/// `file_name` is used for provenance and as the sheet name of delimited
/// text (without its extension).
///
/// # Errors
///
/// - [`LoadError::ExcelRead`] when the workbook container is corrupt.
/// - [`LoadError::Csv`] when delimited text is malformed.
/// - [`LoadError::NoSheets`] when no sheet has any cells.
pub fn load_bytes(bytes: Vec<u8>, file_name: &str) -> Result<Workbook, LoadError> {
    let format = detect_format(&bytes);
    let mut date1904 = false;
    let sheets = match format {
        SourceFormat::Xlsx => {
            date1904 = workbook_uses_1904(Cursor::new(bytes.as_slice()));
            read_workbook::<Xlsx<_>>(Cursor::new(bytes))?
        }
        SourceFormat::Xls => read_workbook::<Xls<_>>(Cursor::new(bytes))?,
        SourceFormat::Ods => read_workbook::<Ods<_>>(Cursor::new(bytes))?,
        SourceFormat::Csv => {
            let text = decode_text(&bytes);
            let rows = parse_delimited(&text)?;
            vec![SheetInput::new(file_stem(file_name), rows)]
        }
    };

    let sheets: Vec<SheetInput> = sheets.into_iter().filter(|s| !s.rows.is_empty()).collect();
    if sheets.is_empty() {
        return Err(LoadError::NoSheets {
            file: file_name.to_owned(),
        });
    }
    info!(
        file = file_name,
        %format,
        date1904,
        sheets = sheets.len(),
        "spreadsheet loaded"
    );
    Ok(Workbook {
        file_name: file_name.to_owned(),
        format,
        date1904,
        sheets,
    })
}

/// Reads every worksheet of a `calamine` workbook. Unreadable sheets are skipped.
fn read_workbook<R>(cursor: Cursor<Vec<u8>>) -> Result<Vec<SheetInput>, LoadError>
where
    R: Reader<Cursor<Vec<u8>>>,
    R::Error: fmt::Display,
{
    let mut workbook: R = open_workbook_from_rs(cursor).map_err(|e: R::Error| {
        LoadError::ExcelRead {
            detail: e.to_string(),
        }
    })?;
    let names = workbook.sheet_names();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        match workbook.worksheet_range(&name) {
            Ok(range) => {
                debug!(sheet = %name, start = ?range.start(), "sheet read");
                sheets.push(SheetInput::new(name, range_to_rows(&range)));
            }
            Err(e) => warn!(sheet = %name, error = %e, "sheet skipped: unreadable"),
        }
    }
    Ok(sheets)
}

fn file_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map_or_else(|| file_name.to_owned(), |s| s.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use contratos_core::CellValue;

    use super::*;

    #[test]
    fn signatures_pick_the_reader() {
        assert_eq!(detect_format(OLE_SIGNATURE), SourceFormat::Xls);
        assert_eq!(detect_format(b"Numero;Valor\n"), SourceFormat::Csv);
        assert_eq!(detect_format(b""), SourceFormat::Csv);
    }

    #[test]
    fn csv_bytes_load_as_one_sheet_named_after_the_file() {
        let bytes = b"N\xFAmero;Valor\n001/2024;R$ 10,00\n".to_vec();
        let wb = load_bytes(bytes, "contratos_2024.csv").expect("load csv");
        assert_eq!(wb.format, SourceFormat::Csv);
        assert!(!wb.date1904);
        assert_eq!(wb.sheet_names(), vec!["contratos_2024".to_owned()]);
        assert_eq!(wb.sheets[0].rows[0][0], CellValue::from("Número"));
    }

    #[test]
    fn empty_text_has_no_sheets() {
        let err = load_bytes(Vec::new(), "vazio.csv").expect_err("no sheets");
        assert!(matches!(err, LoadError::NoSheets { .. }));
    }

    #[test]
    fn sheet_lookup_ignores_case_and_reports_alternatives() {
        let mut wb = load_bytes(b"a;b\n1;2\n".to_vec(), "Plan.csv").expect("load");
        assert!(wb.sheet("plan").is_ok());
        let err = wb.retain_sheet("Outra").expect_err("missing");
        assert!(err.to_string().contains("Plan"), "{err}");
        wb.retain_sheet("PLAN").expect("retain");
        assert_eq!(wb.sheets.len(), 1);
    }

    #[test]
    fn corrupt_zip_is_a_read_error() {
        let mut bytes = ZIP_SIGNATURE.to_vec();
        bytes.extend_from_slice(b"not really an archive");
        let err = load_bytes(bytes, "quebrado.xlsx").expect_err("corrupt");
        assert!(matches!(err, LoadError::ExcelRead { .. }));
    }
}
