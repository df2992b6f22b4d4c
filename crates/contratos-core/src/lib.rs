#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod cell;
pub mod columns;
pub mod config;
pub mod dates;
pub mod enums;
pub mod extract;
pub mod money;
pub mod normalize;
pub mod prazo;
pub mod record;
pub mod serde_helpers;
pub mod synonyms;
pub mod trace;
pub mod validation;

pub use cell::{CellValue, RawSheet, SheetInput, cell_at, row_is_blank};
pub use columns::{ColumnAnalysis, analyze_columns, best_columns};
pub use config::ExtractionConfig;
pub use dates::{
    DateFormatStrategy, DateParseError, DateParseOptions, date_to_serial, detect_format,
    parse_date, serial_to_date,
};
pub use enums::{
    ContractStatus, DataType, DateAssumption, DateFormat, DateRole, DayMonthOrder, Modalidade,
    PrazoUnidade,
};
pub use extract::{SheetExtraction, extract, extract_sheet, extract_workbook};
pub use money::parse_value;
pub use normalize::normalize;
pub use prazo::{Prazo, period_between};
pub use record::{Provenance, StructuredContractRecord};
pub use synonyms::{ContractField, RECOMMENDED_FIELDS, REQUIRED_FIELDS, score_header};
pub use trace::{ExtractionTrace, TraceEvent};
pub use validation::{
    RowIssue, RowIssueKind, Severity, ValidationReport, validate, validate_rows, validate_with,
};

/// Crate version, as reported by the CLI.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
