//! The `Spend` record and its category types.

use crate::model::{Amount, Person, Split};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// The label used when a spend has no type or location.
pub const OTHER_LABEL: &str = "Other";

/// Where money was spent (e.g. a city). Spends without a location are bucketed
/// under [`OTHER_LABEL`].
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn other() -> Self {
        Self(OTHER_LABEL.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<&str> for Location {
    fn from(name: &str) -> Self {
        Location::new(name)
    }
}

/// What kind of spend it was (e.g. "Food", "Transport"). Spends without a type
/// are bucketed under [`OTHER_LABEL`].
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpendType(String);

impl SpendType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn other() -> Self {
        Self(OTHER_LABEL.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for SpendType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<&str> for SpendType {
    fn from(name: &str) -> Self {
        SpendType::new(name)
    }
}

/// A single expense record imported from the trip spreadsheet.
///
/// Spends are immutable once ingested; the whole list is replaced on re-fetch
/// or trip switch. `converted_cost` is the authoritative amount for every
/// computation; `original_cost`/`currency` are display-only.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Spend {
    pub name: String,
    pub date: NaiveDate,
    /// Who fronted the money. Exactly one person, never "everyone".
    pub paid_by: Person,
    /// Who shares the cost.
    pub split: Split,
    /// The amount in the currency it was paid in. Display only.
    pub original_cost: Amount,
    /// The currency code of `original_cost`. Display only.
    pub currency: String,
    /// The amount converted to the trip's display currency. Authoritative.
    pub converted_cost: Amount,
    /// True when the upstream currency conversion failed. The spend still
    /// appears in groupings but contributes zero to every total, and the
    /// aggregate carries an "understated" signal.
    pub conversion_failed: bool,
    pub location: Option<Location>,
    pub spend_type: Option<SpendType>,
}

impl Spend {
    /// The type bucket for this spend, defaulting to "Other".
    pub fn type_bucket(&self) -> SpendType {
        self.spend_type.clone().unwrap_or_else(SpendType::other)
    }

    /// The location bucket for this spend, defaulting to "Other".
    pub fn location_bucket(&self) -> Location {
        self.location.clone().unwrap_or_else(Location::other)
    }

    /// The cost used in money totals: zero when the conversion failed.
    pub fn effective_cost(&self) -> Amount {
        if self.conversion_failed {
            Amount::ZERO
        } else {
            self.converted_cost
        }
    }
}

/// All the data for the currently selected trip: the roster and location list
/// from configuration plus the imported spend list.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TripData {
    /// The trip name, e.g. "Portugal 2023".
    pub trip: String,
    /// The fixed roster for the trip.
    pub roster: Vec<Person>,
    /// The locations configured for the trip.
    pub locations: Vec<Location>,
    /// The imported spend records, in spreadsheet order.
    pub spends: Vec<Spend>,
}
