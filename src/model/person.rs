//! People and split membership.
//!
//! A trip has a fixed roster of `Person` values; nobody is created or removed
//! at runtime. A spend is shared either by the whole roster or by an explicit
//! subset, which `Split` makes a compiler-checked distinction rather than a
//! sentinel hiding inside a person list.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// A member of the trip roster.
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Person(String);

impl Person {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Returns up to two uppercase initials, e.g. "Gus Fring" -> "GF".
    pub fn initials(&self) -> String {
        self.0
            .split_whitespace()
            .take(2)
            .filter_map(|word| word.chars().next())
            .flat_map(|c| c.to_uppercase())
            .collect()
    }
}

impl Display for Person {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<&str> for Person {
    fn from(name: &str) -> Self {
        Person::new(name)
    }
}

/// Who shares a spend's cost.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    /// Shared by the whole trip roster.
    Everyone,
    /// Shared by an explicit, non-empty subset of the roster.
    Among(Vec<Person>),
}

impl Split {
    /// The people who share the cost: the roster for `Everyone`, otherwise the
    /// explicit list. The payer is NOT removed here; payer exclusion is a
    /// ledger concern only.
    pub fn participants<'a>(&'a self, roster: &'a [Person]) -> &'a [Person] {
        match self {
            Split::Everyone => roster,
            Split::Among(people) => people,
        }
    }

    /// The number of ways the cost is divided.
    pub fn way_count(&self, roster_size: usize) -> usize {
        match self {
            Split::Everyone => roster_size,
            Split::Among(people) => people.len(),
        }
    }

    /// Whether `person` shares the cost.
    pub fn includes(&self, person: &Person, roster: &[Person]) -> bool {
        self.participants(roster).contains(person)
    }

    pub fn is_everyone(&self) -> bool {
        matches!(self, Split::Everyone)
    }
}
