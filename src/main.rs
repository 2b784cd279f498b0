use anyhow::Context;
use clap::Parser;
use gustavo::args::{Args, Command};
use gustavo::config::TripConfig;
use gustavo::{import, report, Result, TripState};
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let config = TripConfig::load(args.common().trip_config())?;

    match args.command() {
        Command::Ledger(ledger_args) => {
            let state = load_state(ledger_args.file(), &config, None)?;
            print!("{}", report::render_ledger(state.ledger(), state.skipped()));
        }

        Command::Summary(summary_args) => {
            let filters = summary_args.filters().to_filter_state(&config)?;
            let state = load_state(summary_args.file(), &config, Some(filters))?;
            print!("{}", report::render_summary(state.summary()));
        }

        Command::List(list_args) => {
            let filters = list_args.filters().to_filter_state(&config)?;
            let state = load_state(list_args.file(), &config, Some(filters))?;
            print!("{}", report::render_list(state.filtered_spends()));
        }
    }
    Ok(())
}

/// Reads the CSV export (file or stdin), builds the trip state and applies any
/// filter selections from the command line.
fn load_state(
    file: Option<&PathBuf>,
    config: &TripConfig,
    filters: Option<gustavo::filter::FilterState>,
) -> Result<TripState> {
    let reader: Box<dyn Read> = match file {
        None => Box::new(std::io::stdin()),
        Some(path) => {
            let f = std::fs::File::open(path)
                .with_context(|| format!("Unable to open file {}", path.display()))?;
            Box::new(BufReader::new(f))
        }
    };
    let data = import::read_trip_data(reader, config)?;
    let mut state = TripState::new(data);
    if let Some(filters) = filters {
        state.update_filters(|f| *f = filters);
    }
    Ok(state)
}

/// Initializes the tracing subscriber.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use the default log level for this
            // crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
