use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod cmd;
mod error;
mod format;
mod io;

use cli::{Cli, Command};

use cmd::LoadOptions;
use cmd::extract::ExtractOptions;
use error::CliError;
use format::{FormatMode, FormatterConfig};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    if let Err(err) = run(&cli) {
        eprintln!("{}", err.message());
        process::exit(err.exit_code());
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over the verbosity flags.
fn init_tracing(quiet: bool, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let mode = FormatMode::from(&cli.format);
    let fmt_config = FormatterConfig::from_flags(cli.no_color, cli.quiet, cli.verbose);
    let options = LoadOptions {
        max_file_size: cli.max_file_size,
        config: cli.config.clone(),
        date1904: cli.date1904,
        month_first: cli.month_first,
        reference_year: cli.reference_year,
    };

    match &cli.command {
        Command::Extract {
            source,
            output,
            compact,
        } => {
            let session = cmd::load_session(source, &options)?;
            let extract_options = ExtractOptions {
                output: output.as_deref(),
                compact: *compact,
                mode,
            };
            cmd::extract::run(&session, &extract_options, &fmt_config)
        }
        Command::Analyze { source } => {
            let session = cmd::load_session(source, &options)?;
            cmd::analyze::run(&session, mode, &fmt_config)
        }
        Command::Validate { source } => {
            let session = cmd::load_session(source, &options)?;
            cmd::validate::run(&session, mode, &fmt_config)
        }
    }
}
