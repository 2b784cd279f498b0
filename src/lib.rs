pub mod aggregate;
pub mod args;
pub mod config;
mod error;
pub mod filter;
pub mod import;
pub mod ledger;
pub mod model;
pub mod report;
pub mod split;
pub mod state;

pub use error::Error;
pub use error::Result;
pub use state::TripState;
