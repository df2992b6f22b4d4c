//! Clap CLI definition: root struct, subcommands, and shared argument types.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
///
/// Parsing `"-"` yields [`PathOrStdin::Stdin`]; anything else yields
/// [`PathOrStdin::Path`].
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

/// Output format for CLI commands.
///
/// `Human` emits colored diagnostics to stderr and aligned text to stdout.
/// `Json` emits NDJSON diagnostics and a single JSON document for data.
#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, optionally colored output (default).
    Human,
    /// Structured JSON / NDJSON output.
    Json,
}

/// Arguments shared by every subcommand that reads a spreadsheet.
#[derive(Args, Clone, Debug)]
pub struct SourceArgs {
    /// Spreadsheet (.xlsx, .xls, .ods, .csv), or `-` for stdin.
    #[arg(value_name = "FILE")]
    pub file: PathOrStdin,

    /// Process only the sheet with this name (case-insensitive).
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,
}

/// All top-level subcommands exposed by the `contratos` binary.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract contract records from a spreadsheet.
    Extract {
        #[command(flatten)]
        source: SourceArgs,
        /// Write the records as JSON to this file instead of stdout.
        #[arg(long, short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,
        /// Emit minified JSON with no extraneous whitespace.
        #[arg(long)]
        compact: bool,
    },

    /// Show how each column was classified and mapped to a contract field.
    Analyze {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Check that every required field maps to a column; exit 1 if not.
    Validate {
        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Root CLI struct for the `contratos` binary.
///
/// All global flags are defined here and marked `global = true` so that clap
/// propagates them to every subcommand.
#[derive(Debug, Parser)]
#[command(
    name = "contratos",
    version = contratos_core::version(),
    about = "Municipal contract spreadsheet extractor",
    long_about = "Reads municipal contract spreadsheets (.xlsx, .xls, .ods, .csv),\n\
                  maps their columns to contract fields, and extracts structured\n\
                  contract records with provenance and validation findings."
)]
pub struct Cli {
    /// Active subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Output format: human (default) or json.
    #[arg(long, short = 'f', default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Suppress all stderr output except errors (incompatible with `--verbose`).
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Increase stderr verbosity: trace events, timing, debug logs
    /// (incompatible with `--quiet`).
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Maximum input file size in bytes.
    ///
    /// Can also be set via the `CONTRATOS_MAX_FILE_SIZE` environment variable.
    /// The CLI flag takes precedence over the environment variable.
    /// Default: 268435456 (256 MB).
    #[arg(
        long,
        global = true,
        env = "CONTRATOS_MAX_FILE_SIZE",
        default_value = "268435456"
    )]
    pub max_file_size: u64,

    /// Disable ANSI color codes in human output.
    ///
    /// Also respects the `NO_COLOR` environment variable per
    /// <https://no-color.org>.
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// TOML file with extraction settings (thresholds, date bias, epoch).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Read numeric date serials with the Mac 1904 epoch.
    ///
    /// `.xlsx` files that declare the 1904 system are detected automatically.
    #[arg(long, global = true)]
    pub date1904: bool,

    /// Read ambiguous `a/b/yyyy` dates as month/day instead of day/month.
    #[arg(long, global = true)]
    pub month_first: bool,

    /// Year that anchors the two-digit-year window (default: current year).
    #[arg(long, global = true, value_name = "YEAR")]
    pub reference_year: Option<i32>,
}
