//! Trip configuration handling for Gustavo.
//!
//! A trip configuration file is a JSON document naming the trip, its fixed
//! roster of people (with the email each person uses in the spreadsheet and an
//! optional display color), and the trip's locations. Selecting a different
//! trip means loading a different configuration and replacing all derived
//! state.

use crate::model::{Location, Person};
use crate::Result;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Display colors assigned to roster members that have none configured,
/// cycling in roster order.
const DEFAULT_COLORS: [&str; 6] = [
    "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#469990",
];

/// One roster member as configured: the display name, the email that
/// identifies them in the spreadsheet export, and an optional chart color.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PersonConfig {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// The configuration for one trip.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TripConfig {
    /// The trip name, e.g. "Portugal 2023".
    pub trip: String,
    /// The fixed roster. People are never added or removed at runtime.
    pub people: Vec<PersonConfig>,
    /// The locations spends can be tagged with.
    #[serde(default)]
    pub locations: Vec<String>,
}

impl TripConfig {
    /// Loads and validates a trip configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read trip config at {}", path.display()))?;
        let config: TripConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse trip config at {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.people.is_empty() {
            bail!("Trip config '{}' has an empty roster", self.trip);
        }
        for (ix, person) in self.people.iter().enumerate() {
            for other in &self.people[ix + 1..] {
                if person.name == other.name {
                    bail!("Duplicate roster name '{}'", person.name);
                }
                if person.email == other.email {
                    bail!("Duplicate roster email '{}'", person.email);
                }
            }
        }
        Ok(())
    }

    /// The roster as model `Person` values, in configuration order.
    pub fn roster(&self) -> Vec<Person> {
        self.people.iter().map(|p| Person::new(&p.name)).collect()
    }

    pub fn locations(&self) -> Vec<Location> {
        self.locations.iter().map(Location::new).collect()
    }

    /// Maps a spreadsheet email to the configured person. Also accepts the
    /// person's display name, which some exports use directly.
    pub fn person_for(&self, email_or_name: &str) -> Option<Person> {
        let key = email_or_name.trim();
        self.people
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(key) || p.name == key)
            .map(|p| Person::new(&p.name))
    }

    /// The display color for a roster member: the configured one, or a stable
    /// default assigned by roster position.
    pub fn color_of(&self, person: &Person) -> &str {
        self.people
            .iter()
            .position(|p| p.name == person.name())
            .map(|ix| {
                self.people[ix]
                    .color
                    .as_deref()
                    .unwrap_or(DEFAULT_COLORS[ix % DEFAULT_COLORS.len()])
            })
            .unwrap_or(DEFAULT_COLORS[0])
    }
}
