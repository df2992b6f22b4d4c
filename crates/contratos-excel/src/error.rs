/// Errors produced while loading a spreadsheet.
use thiserror::Error;

/// All error conditions that can occur while turning file bytes into sheets.
///
/// Only structural failures are errors here. Cell-level oddities (bad dates,
/// error cells, ragged rows) are passed through to the extractor, which
/// degrades them to defaults.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The workbook container could not be opened or a sheet could not be read.
    #[error("workbook read error: {detail}")]
    ExcelRead {
        /// Human-readable description of the error.
        detail: String,
    },

    /// A delimited text file could not be parsed.
    #[error("CSV read error at record {record}: {detail}")]
    Csv {
        /// Zero-based record index where parsing stopped.
        record: usize,
        /// Human-readable description of the error.
        detail: String,
    },

    /// The file contained no sheet with any cells.
    #[error("no sheets with data found in {file:?}")]
    NoSheets {
        /// Display name of the file.
        file: String,
    },

    /// A sheet was requested by name and is not in the workbook.
    #[error("sheet {sheet:?} not found; available: {}", available.join(", "))]
    MissingSheet {
        /// The requested sheet name.
        sheet: String,
        /// Names of the sheets that do exist.
        available: Vec<String>,
    },
}
