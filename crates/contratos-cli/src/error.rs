/// CLI error types with associated exit codes.
///
/// [`CliError`] is the top-level error type for the `contratos` binary. Every
/// variant maps to a stable exit code (1 or 2) via [`CliError::exit_code`]:
///
/// - Exit code **2**: input failure. The file, the workbook inside it, or
///   the configuration could not be read at all.
/// - Exit code **1**: logical failure. Extraction ran, but validation found
///   required fields with no confidently mapped column.
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

/// All error conditions that the `contratos` CLI can produce.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: input failures ---
    /// A file argument could not be found on the filesystem.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The process lacks permission to read a file.
    PermissionDenied {
        /// The path that could not be read.
        path: PathBuf,
    },

    /// The input exceeds the configured `--max-file-size` limit.
    FileTooLarge {
        /// `"-"` for stdin, or the filesystem path.
        source: String,
        /// The configured size limit in bytes.
        limit: u64,
        /// The actual size in bytes, if known (`None` for stdin).
        actual: Option<u64>,
    },

    /// An I/O error occurred while reading from stdin.
    StdinReadError {
        /// The underlying I/O error message.
        detail: String,
    },

    /// A generic I/O error not covered by the more specific variants above.
    IoError {
        /// A human-readable label for the source or destination.
        source: String,
        /// The underlying I/O error message.
        detail: String,
    },

    /// The bytes were read but are not a usable spreadsheet.
    LoadFailed {
        /// A human-readable label for the source.
        source: String,
        /// The loader's error message.
        detail: String,
    },

    /// The `--config` file could not be read or parsed.
    InvalidConfig {
        /// Path of the configuration file.
        path: PathBuf,
        /// The parser's error message.
        detail: String,
    },

    // --- Exit code 1: logical failures ---
    /// At least one sheet is missing required fields.
    ///
    /// The report has already been printed; this variant exists so `main`
    /// can exit with code 1 cleanly.
    ValidationErrors,

    /// No sheet had a header row followed by data rows, so no record was produced.
    NothingExtracted {
        /// File name of the input.
        source: String,
    },
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::StdinReadError { .. }
            | Self::IoError { .. }
            | Self::LoadFailed { .. }
            | Self::InvalidConfig { .. } => 2,

            Self::ValidationErrors | Self::NothingExtracted { .. } => 1,
        }
    }

    /// Returns a human-readable error message suitable for printing to stderr.
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::PermissionDenied { path } => {
                format!("error: permission denied: {}", path.display())
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: Some(actual),
            } => {
                format!("error: file too large: {source} is {actual} bytes, limit is {limit} bytes")
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: None,
            } => {
                format!("error: file too large: {source} exceeded limit of {limit} bytes")
            }
            Self::StdinReadError { detail } => {
                format!("error: failed to read stdin: {detail}")
            }
            Self::IoError { source, detail } => {
                format!("error: I/O error on {source}: {detail}")
            }
            Self::LoadFailed { source, detail } => {
                format!("error: cannot load spreadsheet {source}: {detail}")
            }
            Self::InvalidConfig { path, detail } => {
                format!("error: invalid config {}: {detail}", path.display())
            }
            Self::ValidationErrors => {
                "error: validation failed: required fields are missing".to_owned()
            }
            Self::NothingExtracted { source } => {
                format!(
                    "error: nothing could be extracted from {source}: no sheet has a header row followed by data"
                )
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}

/// Wraps an output write failure.
pub fn write_error(target: &str, e: &std::io::Error) -> CliError {
    CliError::IoError {
        source: target.to_owned(),
        detail: e.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
