/// Output formatting: human-readable and JSON (NDJSON) modes.
///
/// Diagnostics (sheet reports, row issues, trace events, the summary) go to
/// stderr; data (records, column analyses) goes to stdout.
///
/// - **Human mode** (default): one line per diagnostic, with the severity
///   tag color-coded. Colors are disabled when `--no-color` is set, the
///   `NO_COLOR` environment variable is present (per <https://no-color.org>),
///   or stderr is not a TTY.
/// - **JSON mode**: each diagnostic is a single-line JSON object (NDJSON)
///   tagged with the sheet it belongs to.
///
/// Quiet mode suppresses every diagnostic except the ones that make the
/// command fail. Verbose mode adds trace events and timing.
use std::io::{IsTerminal as _, Write};
use std::time::Duration;

use contratos_core::{
    ColumnAnalysis, RowIssue, Severity, StructuredContractRecord, TraceEvent, ValidationReport,
};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Color support detection
// ---------------------------------------------------------------------------

/// Returns `true` if ANSI color codes should be emitted to stderr.
///
/// Colors are disabled when any of the following conditions hold:
/// - `no_color_flag` is `true` (the `--no-color` CLI flag was passed).
/// - The `NO_COLOR` environment variable is present (any non-empty value).
/// - stderr is not a TTY (e.g. the output is piped to a file).
pub fn colors_enabled(no_color_flag: bool) -> bool {
    if no_color_flag {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stderr().is_terminal()
}

// ---------------------------------------------------------------------------
// ANSI escape sequences
// ---------------------------------------------------------------------------

const ANSI_RED: &str = "\x1b[31m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_CYAN: &str = "\x1b[36m";
const ANSI_DIM: &str = "\x1b[2m";
const ANSI_RESET: &str = "\x1b[0m";

// ---------------------------------------------------------------------------
// FormatterConfig
// ---------------------------------------------------------------------------

/// Configuration for the formatter, derived from CLI flags.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Whether ANSI colors are enabled.
    pub colors: bool,
    /// Suppress all non-error stderr output.
    pub quiet: bool,
    /// Emit trace events and timing to stderr.
    pub verbose: bool,
}

impl FormatterConfig {
    /// Constructs a [`FormatterConfig`] from the raw CLI flags.
    ///
    /// `no_color_flag` is the `--no-color` boolean. Color detection also
    /// checks the `NO_COLOR` env var and the stderr TTY state.
    pub fn from_flags(no_color_flag: bool, quiet: bool, verbose: bool) -> Self {
        Self {
            colors: colors_enabled(no_color_flag),
            quiet,
            verbose,
        }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.colors {
            format!("{color}{text}{ANSI_RESET}")
        } else {
            text.to_owned()
        }
    }
}

/// Output format selection, mirroring the CLI `--format` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMode {
    /// Human-readable, optionally colored output.
    Human,
    /// Structured JSON / NDJSON output.
    Json,
}

impl From<&crate::cli::OutputFormat> for FormatMode {
    fn from(format: &crate::cli::OutputFormat) -> Self {
        match format {
            crate::cli::OutputFormat::Human => Self::Human,
            crate::cli::OutputFormat::Json => Self::Json,
        }
    }
}

// ---------------------------------------------------------------------------
// Tally
// ---------------------------------------------------------------------------

/// Running counts for the final summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub sheets: usize,
    pub invalid_sheets: usize,
    pub records: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl Tally {
    /// Counts one sheet's report.
    pub fn add_report(&mut self, report: &ValidationReport) {
        self.sheets += 1;
        if !report.is_valid {
            self.invalid_sheets += 1;
        }
        self.warnings += report.warnings.len();
        self.infos += report.suggestions.len();
    }

    /// Counts one row issue.
    pub fn add_issue(&mut self, issue: &RowIssue) {
        match issue.severity {
            Severity::Warning => self.warnings += 1,
            Severity::Info => self.infos += 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Sheet reports
// ---------------------------------------------------------------------------

/// Writes a sheet's validation report.
///
/// Human format:
/// ```text
/// [E] Plan1: missing required fields: numero, contratante
/// [W] Plan1: Campo obrigatório "numero" não foi identificado em nenhuma coluna
/// [I] Plan1: Adicione uma coluna para "modalidade" para melhorar a extração
/// ```
///
/// The `[E]` line survives quiet mode; warnings and suggestions do not.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_report<W: Write>(
    writer: &mut W,
    sheet: &str,
    report: &ValidationReport,
    mode: FormatMode,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    match mode {
        FormatMode::Human => {
            if !report.missing_fields.is_empty() {
                writeln!(
                    writer,
                    "{} {sheet}: missing required fields: {}",
                    config.paint(ANSI_RED, "[E]"),
                    report.missing_fields.join(", ")
                )?;
            }
            if config.quiet {
                return Ok(());
            }
            for warning in &report.warnings {
                writeln!(writer, "{} {sheet}: {warning}", config.paint(ANSI_YELLOW, "[W]"))?;
            }
            for suggestion in &report.suggestions {
                writeln!(writer, "{} {sheet}: {suggestion}", config.paint(ANSI_CYAN, "[I]"))?;
            }
            Ok(())
        }
        FormatMode::Json => {
            if config.quiet && report.is_valid {
                return Ok(());
            }
            write_ndjson(
                writer,
                &SheetScoped {
                    sheet,
                    item: &ReportLine { report },
                },
            )
        }
    }
}

#[derive(Serialize)]
struct ReportLine<'a> {
    report: &'a ValidationReport,
}

// ---------------------------------------------------------------------------
// Row issues
// ---------------------------------------------------------------------------

/// Writes a single [`RowIssue`].
///
/// Human format: `[W] Plan1 linha 7 (003/2024): Data de término anterior à data de início`
///
/// Row issues never fail a command, so quiet mode suppresses all of them.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_row_issue<W: Write>(
    writer: &mut W,
    sheet: &str,
    issue: &RowIssue,
    mode: FormatMode,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet {
        return Ok(());
    }
    match mode {
        FormatMode::Human => {
            let tag = match issue.severity {
                Severity::Warning => config.paint(ANSI_YELLOW, "[W]"),
                Severity::Info => config.paint(ANSI_CYAN, "[I]"),
            };
            writeln!(
                writer,
                "{tag} {sheet} linha {} ({}): {}",
                issue.row_number, issue.numero, issue.message
            )
        }
        FormatMode::Json => write_ndjson(writer, &SheetScoped { sheet, item: issue }),
    }
}

// ---------------------------------------------------------------------------
// Trace events
// ---------------------------------------------------------------------------

/// Writes a trace event. A no-op unless `config.verbose` is set.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_trace<W: Write>(
    writer: &mut W,
    sheet: &str,
    event: &TraceEvent,
    mode: FormatMode,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if !config.verbose {
        return Ok(());
    }
    match mode {
        FormatMode::Human => writeln!(writer, "{} {sheet}: {event}", config.paint(ANSI_DIM, "[T]")),
        FormatMode::Json => write_ndjson(writer, &SheetScoped { sheet, item: event }),
    }
}

// ---------------------------------------------------------------------------
// Summary and timing
// ---------------------------------------------------------------------------

/// Writes the summary line.
///
/// Human format: `2 sheets (1 invalid), 14 records: 3 warnings, 1 info`
///
/// JSON format:
/// `{"summary":{"sheets":2,"invalid_sheets":1,"records":14,"warnings":3,"info":1}}`
///
/// In quiet mode the summary is suppressed.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_summary<W: Write>(
    writer: &mut W,
    tally: &Tally,
    mode: FormatMode,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet {
        return Ok(());
    }
    match mode {
        FormatMode::Human => {
            let invalid = if tally.invalid_sheets > 0 {
                format!(" ({} invalid)", tally.invalid_sheets)
            } else {
                String::new()
            };
            writeln!(
                writer,
                "{} {}{invalid}, {} {}: {} {}, {} info",
                tally.sheets,
                pluralize(tally.sheets, "sheet", "sheets"),
                tally.records,
                pluralize(tally.records, "record", "records"),
                tally.warnings,
                pluralize(tally.warnings, "warning", "warnings"),
                tally.infos,
            )
        }
        FormatMode::Json => writeln!(
            writer,
            r#"{{"summary":{{"sheets":{},"invalid_sheets":{},"records":{},"warnings":{},"info":{}}}}}"#,
            tally.sheets, tally.invalid_sheets, tally.records, tally.warnings, tally.infos,
        ),
    }
}

/// Warns that the input held no sheet with data rows.
///
/// Human format: `[W] cabecalho.csv: nothing could be extracted`
///
/// Suppressed in quiet mode; `validate` reports the same condition as its error.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_nothing_extracted<W: Write>(
    writer: &mut W,
    file: &str,
    mode: FormatMode,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet {
        return Ok(());
    }
    match mode {
        FormatMode::Human => writeln!(
            writer,
            "{} {file}: nothing could be extracted",
            config.paint(ANSI_YELLOW, "[W]")
        ),
        FormatMode::Json => write_ndjson(
            writer,
            &NothingExtracted {
                file,
                warning: "nothing could be extracted",
            },
        ),
    }
}

#[derive(Serialize)]
struct NothingExtracted<'a> {
    file: &'a str,
    warning: &'a str,
}

/// Writes timing information in verbose human mode.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_timing<W: Write>(
    writer: &mut W,
    label: &str,
    duration: Duration,
    mode: FormatMode,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if !config.verbose || mode == FormatMode::Json {
        return Ok(());
    }
    writeln!(writer, "{label} in {}ms", duration.as_millis())
}

// ---------------------------------------------------------------------------
// Data tables (stdout)
// ---------------------------------------------------------------------------

/// Writes one line per record: row, number, value, vigência, prazo, contractor.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_records_human<W: Write>(
    writer: &mut W,
    records: &[&StructuredContractRecord],
) -> std::io::Result<()> {
    for r in records {
        let inicio = r.data_inicio.map_or_else(|| "?".to_owned(), |d| d.to_string());
        let termino = r.data_termino.map_or_else(|| "?".to_owned(), |d| d.to_string());
        let prazo = r.prazo().map_or_else(|| "-".to_owned(), |p| p.to_string());
        writeln!(
            writer,
            "{:>5}  {:<16}  {:>16}  {inicio}..{termino}  {prazo:<10}  {}",
            r.provenance.row_number,
            r.numero,
            format_money(r.valor),
            r.contratada,
        )?;
    }
    Ok(())
}

/// Writes a sheet heading followed by one line per analyzed column.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_analyses_human<W: Write>(
    writer: &mut W,
    sheet: &str,
    analyses: &[ColumnAnalysis],
) -> std::io::Result<()> {
    writeln!(writer, "{sheet}")?;
    for a in analyses {
        let field = a.field.map_or_else(|| "-".to_owned(), |f| f.to_string());
        let detail = a
            .date_strategy
            .as_ref()
            .map(|s| format!("{} ({:.0}%)", s.format, s.confidence * 100.0))
            .or_else(|| a.pattern.clone())
            .unwrap_or_default();
        writeln!(
            writer,
            "  {:>3}  {:<28}  {:<8}  {:<14}  {:>4.0}%  {:>3}/{:<3} empty  {detail}",
            a.index,
            a.header,
            a.data_type.to_string(),
            field,
            a.confidence * 100.0,
            a.empty_count,
            a.total_count,
        )?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Pairs a serializable item with the sheet it came from.
#[derive(Serialize)]
struct SheetScoped<'a, T: Serialize> {
    sheet: &'a str,
    #[serde(flatten)]
    item: &'a T,
}

fn write_ndjson<W: Write, T: Serialize>(writer: &mut W, value: &T) -> std::io::Result<()> {
    let line = serde_json::to_string(value).map_err(std::io::Error::other)?;
    writeln!(writer, "{line}")
}

/// Renders a value the Brazilian way: `R$ 1.234.567,89`.
fn format_money(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("R$ {grouped},{frac_part}")
}

/// Returns the singular or plural form of `word` depending on `count`.
fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
