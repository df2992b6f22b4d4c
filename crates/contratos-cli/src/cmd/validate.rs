//! Implementation of `contratos validate <file>`.
//!
//! Runs the full pipeline and emits sheet reports and row issues to stderr.
//! Nothing is written to stdout.
//!
//! Exit codes:
//! - 0 = every sheet maps all required fields
//! - 1 = at least one sheet is missing a required field, or no sheet had
//!   any data rows to extract
//! - 2 = the input could not be loaded
use std::time::Instant;

use contratos_core::extract_workbook;

use crate::cmd::Session;
use crate::cmd::extract::write_diagnostics;
use crate::error::{CliError, write_error};
use crate::format::{FormatMode, FormatterConfig, write_timing};

/// Runs the `validate` command.
///
/// # Errors
///
/// - [`CliError::ValidationErrors`] if any sheet report is invalid.
/// - [`CliError::NothingExtracted`] if no record could be extracted.
/// - [`CliError::IoError`] if stderr cannot be written.
pub fn run(session: &Session, mode: FormatMode, fmt_config: &FormatterConfig) -> Result<(), CliError> {
    let started = Instant::now();
    let extractions = extract_workbook(
        &session.workbook.sheets,
        &session.workbook.file_name,
        &session.config,
    );
    let tally = write_diagnostics(&extractions, mode, fmt_config)?;

    let stderr = std::io::stderr();
    let mut err_out = stderr.lock();
    write_timing(&mut err_out, "validated", started.elapsed(), mode, fmt_config)
        .map_err(|e| write_error("stderr", &e))?;

    if tally.invalid_sheets > 0 {
        Err(CliError::ValidationErrors)
    } else if tally.records == 0 {
        Err(CliError::NothingExtracted {
            source: session.workbook.file_name.clone(),
        })
    } else {
        Ok(())
    }
}
