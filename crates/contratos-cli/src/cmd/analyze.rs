//! Implementation of `contratos analyze <file>`.
//!
//! Classifies every header column of every sheet and shows the field each
//! one was mapped to, without extracting records. Useful for diagnosing why
//! a sheet fails validation.
//!
//! Output:
//! - Human: a per-sheet table on stdout, reports on stderr.
//! - JSON: `[{"sheet": ..., "columns": [...], "report": {...}}]` on stdout.
use std::io::Write as _;

use contratos_core::{ColumnAnalysis, ValidationReport, analyze_columns, validate_with};
use serde::Serialize;

use crate::cmd::Session;
use crate::error::{CliError, write_error};
use crate::format::{
    FormatMode, FormatterConfig, Tally, write_analyses_human, write_report, write_summary,
};

/// Column analysis of one sheet.
#[derive(Debug, Serialize)]
pub struct SheetAnalysis {
    pub sheet: String,
    pub columns: Vec<ColumnAnalysis>,
    pub report: ValidationReport,
}

/// Analyzes every sheet that has a header row and at least one data row.
pub fn analyze_session(session: &Session) -> Vec<SheetAnalysis> {
    session
        .workbook
        .sheets
        .iter()
        .filter_map(|sheet| {
            let (headers, data) = sheet.rows.split_first()?;
            if data.is_empty() {
                return None;
            }
            let columns = analyze_columns(headers, data, &session.config);
            let report = validate_with(&columns, &session.config);
            Some(SheetAnalysis {
                sheet: sheet.name.clone(),
                columns,
                report,
            })
        })
        .collect()
}

/// Runs the `analyze` command.
///
/// # Errors
///
/// Returns [`CliError::IoError`] if stdout or stderr cannot be written.
pub fn run(session: &Session, mode: FormatMode, fmt_config: &FormatterConfig) -> Result<(), CliError> {
    let analyses = analyze_session(session);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match mode {
        FormatMode::Json => {
            let json = serde_json::to_string_pretty(&analyses).map_err(|e| CliError::IoError {
                source: "json".to_owned(),
                detail: e.to_string(),
            })?;
            writeln!(out, "{json}").map_err(|e| write_error("stdout", &e))?;
        }
        FormatMode::Human => {
            for sheet in &analyses {
                write_analyses_human(&mut out, &sheet.sheet, &sheet.columns)
                    .map_err(|e| write_error("stdout", &e))?;
            }
        }
    }

    let stderr = std::io::stderr();
    let mut err_out = stderr.lock();
    let mut tally = Tally::default();
    for sheet in &analyses {
        write_report(&mut err_out, &sheet.sheet, &sheet.report, mode, fmt_config)
            .map_err(|e| write_error("stderr", &e))?;
        tally.add_report(&sheet.report);
    }
    write_summary(&mut err_out, &tally, mode, fmt_config).map_err(|e| write_error("stderr", &e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
