//! Types that represent the core data model, such as `Spend` and `Person`.

mod amount;
mod person;
mod spend;

pub use amount::{Amount, AmountError};
pub use person::{Person, Split};
pub use spend::{Location, Spend, SpendType, TripData, OTHER_LABEL};
