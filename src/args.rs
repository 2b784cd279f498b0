//! These structs provide the CLI interface for the gustavo CLI.

use crate::config::TripConfig;
use crate::filter::{FilterState, Sort, SortField, SortOrder};
use crate::Result;
use anyhow::bail;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// gustavo: a command-line tool for trip expense tracking and cost splitting.
///
/// Reads a spreadsheet CSV export of trip spends, matches the people in it
/// against a trip configuration file, and reports who owes whom, per-person
/// and per-category totals, and the filtered spend list.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the pairwise debt ledger: who owes whom, net of all spends.
    ///
    /// The ledger always covers the complete spend list; filters do not apply
    /// to it.
    Ledger(LedgerArgs),
    /// Show spend totals by person, type, location and date.
    Summary(SummaryArgs),
    /// Show the spend list with filters, search and sorting applied.
    List(ListArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The trip configuration file naming the roster and locations.
    #[arg(long, env = "GUSTAVO_TRIP_CONFIG", default_value = "gustavo.json")]
    trip_config: PathBuf,
}

impl Common {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn trip_config(&self) -> &PathBuf {
        &self.trip_config
    }
}

#[derive(Debug, Parser, Clone)]
pub struct LedgerArgs {
    /// The CSV export to read. If not supplied, input is taken from stdin.
    #[arg(long, short = 'f')]
    file: Option<PathBuf>,
}

impl LedgerArgs {
    pub fn file(&self) -> Option<&PathBuf> {
        self.file.as_ref()
    }
}

#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    /// The CSV export to read. If not supplied, input is taken from stdin.
    #[arg(long, short = 'f')]
    file: Option<PathBuf>,

    #[clap(flatten)]
    filters: FilterArgs,
}

impl SummaryArgs {
    pub fn file(&self) -> Option<&PathBuf> {
        self.file.as_ref()
    }

    pub fn filters(&self) -> &FilterArgs {
        &self.filters
    }
}

#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    /// The CSV export to read. If not supplied, input is taken from stdin.
    #[arg(long, short = 'f')]
    file: Option<PathBuf>,

    #[clap(flatten)]
    filters: FilterArgs,
}

impl ListArgs {
    pub fn file(&self) -> Option<&PathBuf> {
        self.file.as_ref()
    }

    pub fn filters(&self) -> &FilterArgs {
        &self.filters
    }
}

/// Filter, search and sort flags shared by the summary and list subcommands.
#[derive(Debug, Parser, Clone, Default)]
pub struct FilterArgs {
    /// Keep only spends paid by this person (name or email, repeatable).
    #[arg(long = "payer")]
    payers: Vec<String>,

    /// Keep only spends shared by this person (name or email, repeatable).
    #[arg(long = "participant")]
    participants: Vec<String>,

    /// Keep only this spend type; "Other" matches untyped spends (repeatable).
    #[arg(long = "type")]
    types: Vec<String>,

    /// Keep only this location; "Other" matches unlocated spends (repeatable).
    #[arg(long = "location")]
    locations: Vec<String>,

    /// Free-text search over name, payer, location and date.
    #[arg(long)]
    search: Option<String>,

    /// Sort the list by this column.
    #[arg(long)]
    sort: Option<SortField>,

    /// Sort direction; only meaningful together with --sort.
    #[arg(long)]
    order: Option<SortOrder>,
}

impl FilterArgs {
    /// Resolves the flag values into a `FilterState`, mapping people through
    /// the trip configuration. Unknown people or an --order without --sort
    /// are CLI errors.
    pub fn to_filter_state(&self, config: &TripConfig) -> Result<FilterState> {
        let mut state = FilterState::default();

        for name in &self.payers {
            state.payers.toggle(resolve_person(config, name)?);
        }
        for name in &self.participants {
            state.participants.toggle(resolve_person(config, name)?);
        }
        for name in &self.types {
            state.types.toggle(name.as_str().into());
        }
        for name in &self.locations {
            state.locations.toggle(name.as_str().into());
        }
        if let Some(search) = &self.search {
            state.search = search.clone();
        }
        match (self.sort, self.order) {
            (Some(field), order) => {
                state.sort = Some(Sort {
                    field,
                    order: order.unwrap_or(SortOrder::Descending),
                });
            }
            (None, Some(_)) => bail!("--order requires --sort"),
            (None, None) => {}
        }
        Ok(state)
    }
}

fn resolve_person(config: &TripConfig, name: &str) -> Result<crate::model::Person> {
    match config.person_for(name) {
        Some(person) => Ok(person),
        None => bail!("'{name}' is not on the trip roster"),
    }
}
