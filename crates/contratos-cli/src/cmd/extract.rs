//! Implementation of `contratos extract <file>`.
//!
//! Runs the full pipeline over every usable sheet and writes the records.
//!
//! - `--format json` (or `--output <path>`): one JSON array of records.
//! - `--format human`: one aligned line per record on stdout.
//!
//! Sheet reports and row issues go to stderr. Extraction never fails on
//! content: unmapped fields fall back to placeholders and are reported, so
//! the exit code is 0 whenever the input could be loaded.
use std::io::Write as _;
use std::path::Path;
use std::time::Instant;

use contratos_core::{SheetExtraction, StructuredContractRecord, extract_workbook};

use crate::cmd::Session;
use crate::error::{CliError, write_error};
use crate::format::{
    FormatMode, FormatterConfig, Tally, write_records_human, write_report, write_row_issue,
    write_nothing_extracted, write_summary, write_timing, write_trace,
};

/// Options for the `extract` subcommand.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions<'a> {
    pub output: Option<&'a Path>,
    pub compact: bool,
    pub mode: FormatMode,
}

/// Runs the `extract` command.
///
/// # Errors
///
/// Returns [`CliError::IoError`] if stdout, stderr, or the `--output` file
/// cannot be written.
pub fn run(
    session: &Session,
    options: &ExtractOptions<'_>,
    fmt_config: &FormatterConfig,
) -> Result<(), CliError> {
    let started = Instant::now();
    let extractions = extract_workbook(
        &session.workbook.sheets,
        &session.workbook.file_name,
        &session.config,
    );
    let records: Vec<&StructuredContractRecord> =
        extractions.iter().flat_map(|s| s.records.iter()).collect();

    // --- Data ---
    match (options.output, options.mode) {
        (Some(path), _) => {
            let json = render_json(&records, options.compact)?;
            std::fs::write(path, json + "\n")
                .map_err(|e| write_error(&path.display().to_string(), &e))?;
        }
        (None, FormatMode::Json) => {
            let json = render_json(&records, options.compact)?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            writeln!(out, "{json}").map_err(|e| write_error("stdout", &e))?;
        }
        (None, FormatMode::Human) => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            write_records_human(&mut out, &records).map_err(|e| write_error("stdout", &e))?;
        }
    }

    // --- Diagnostics ---
    let tally = write_diagnostics(&extractions, options.mode, fmt_config)?;
    let stderr = std::io::stderr();
    let mut err_out = stderr.lock();
    if tally.records == 0 {
        write_nothing_extracted(&mut err_out, &session.workbook.file_name, options.mode, fmt_config)
            .map_err(|e| write_error("stderr", &e))?;
    }
    if let Some(path) = options.output {
        if !fmt_config.quiet && options.mode == FormatMode::Human {
            writeln!(err_out, "wrote {} records to {}", tally.records, path.display())
                .map_err(|e| write_error("stderr", &e))?;
        }
    }
    write_timing(&mut err_out, "extracted", started.elapsed(), options.mode, fmt_config)
        .map_err(|e| write_error("stderr", &e))?;
    Ok(())
}

/// Writes every sheet's trace, report and row issues to stderr, then the summary.
///
/// Shared with `validate`, which prints the same diagnostics without the data.
///
/// # Errors
///
/// Returns [`CliError::IoError`] if stderr cannot be written.
pub fn write_diagnostics(
    extractions: &[SheetExtraction],
    mode: FormatMode,
    fmt_config: &FormatterConfig,
) -> Result<Tally, CliError> {
    let stderr = std::io::stderr();
    let mut err_out = stderr.lock();
    let mut tally = Tally::default();
    for sheet in extractions {
        for event in sheet.trace.iter() {
            write_trace(&mut err_out, &sheet.sheet_name, event, mode, fmt_config)
                .map_err(|e| write_error("stderr", &e))?;
        }
        write_report(&mut err_out, &sheet.sheet_name, &sheet.report, mode, fmt_config)
            .map_err(|e| write_error("stderr", &e))?;
        for issue in &sheet.row_issues {
            write_row_issue(&mut err_out, &sheet.sheet_name, issue, mode, fmt_config)
                .map_err(|e| write_error("stderr", &e))?;
            tally.add_issue(issue);
        }
        tally.add_report(&sheet.report);
        tally.records += sheet.records.len();
    }
    write_summary(&mut err_out, &tally, mode, fmt_config).map_err(|e| write_error("stderr", &e))?;
    Ok(tally)
}

fn render_json(records: &[&StructuredContractRecord], compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(records)
    } else {
        serde_json::to_string_pretty(records)
    };
    rendered.map_err(|e| CliError::IoError {
        source: "json".to_owned(),
        detail: e.to_string(),
    })
}
