/// Command module for the `contratos` CLI.
///
/// Each submodule implements one subcommand. The `run` function in each
/// module takes a loaded [`Session`] and returns `Ok(())` on success or a
/// [`crate::error::CliError`] on failure. Everything the subcommands share
/// (reading the input, choosing sheets, building the extraction config)
/// lives here.
use std::path::{Path, PathBuf};

use contratos_core::{DayMonthOrder, ExtractionConfig};
use contratos_excel::Workbook;
use tracing::{debug, info};

use crate::cli::SourceArgs;
use crate::error::CliError;
use crate::io::read_input;

pub mod analyze;
pub mod extract;
pub mod validate;

/// Global flags that influence loading and extraction.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub max_file_size: u64,
    pub config: Option<PathBuf>,
    pub date1904: bool,
    pub month_first: bool,
    pub reference_year: Option<i32>,
}

/// A loaded workbook plus the settings to extract it with.
#[derive(Debug)]
pub struct Session {
    pub workbook: Workbook,
    pub config: ExtractionConfig,
}

/// Reads and decodes the input, narrows it to `--sheet`, and resolves the
/// extraction config.
///
/// Precedence for each setting: command-line flag, then the `--config`
/// file, then the built-in default. A workbook that declares the 1904 date
/// system always switches the epoch on.
///
/// # Errors
///
/// Returns a [`CliError`] with exit code 2 when the input, the workbook, or
/// the config file cannot be read.
pub fn load_session(source: &SourceArgs, options: &LoadOptions) -> Result<Session, CliError> {
    let mut config = match &options.config {
        Some(path) => load_config(path)?,
        None => ExtractionConfig::default(),
    };

    let input = read_input(&source.file, options.max_file_size)?;
    let label = input.file_name.clone();
    let mut workbook = contratos_excel::load_bytes(input.bytes, &input.file_name).map_err(|e| {
        CliError::LoadFailed {
            source: label.clone(),
            detail: e.to_string(),
        }
    })?;
    if let Some(name) = &source.sheet {
        workbook
            .retain_sheet(name)
            .map_err(|e| CliError::LoadFailed {
                source: label.clone(),
                detail: e.to_string(),
            })?;
    }

    if options.date1904 || workbook.date1904 {
        config = config.with_date1904(true);
    }
    if options.month_first {
        config = config.with_day_month_bias(DayMonthOrder::MonthFirst);
    }
    if let Some(year) = options.reference_year {
        config = config.with_reference_year(year);
    }
    info!(
        file = %label,
        sheets = workbook.sheets.len(),
        date1904 = config.date1904,
        "session ready"
    );
    Ok(Session { workbook, config })
}

/// Parses an [`ExtractionConfig`] from a TOML file. Missing keys keep their defaults.
///
/// # Errors
///
/// Returns [`CliError::InvalidConfig`] if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<ExtractionConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError::InvalidConfig {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    let config: ExtractionConfig = toml::from_str(&text).map_err(|e| CliError::InvalidConfig {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    debug!(path = %path.display(), ?config, "config loaded");
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
