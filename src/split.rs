//! The split-cost calculator: one spend's per-person share.

use crate::model::{Amount, Split};

/// Returns the share of `cost` that each sharing person owes.
///
/// A spend split among `Everyone` divides by the roster size; an explicit
/// split divides by the number of people listed. Every aggregation pass calls
/// this for every spend, so it is a single division.
///
/// Panics if the divisor would be zero (empty roster with `Everyone`, or an
/// empty explicit list). Ingestion guarantees non-empty splits, so reaching
/// that panic is a bug, not bad data.
pub fn share(cost: Amount, split: &Split, roster_size: usize) -> Amount {
    cost.divided_among(split.way_count(roster_size))
}
