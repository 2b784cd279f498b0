//! CSV ingestion: turns a spreadsheet export into `Spend` records.
//!
//! The export carries one row per spend with emails identifying people. This
//! module is a collaborator of the computation core: it owns the tolerant
//! parsing (dates in a few formats, costs with dollar signs, conversion
//! failures flagged rather than fatal) and the email-to-person identity
//! mapping, so that the core receives shape-valid records.
//!
//! A malformed row is skipped with a warning rather than failing the batch,
//! matching the product's tolerance of partial data. A missing or unparseable
//! converted cost is not malformed: the row is kept with a zero cost and
//! `conversion_failed` set, so totals degrade instead of aborting.

use crate::config::TripConfig;
use crate::model::{Amount, Location, Spend, SpendType, Split, TripData};
use crate::Result;
use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::str::FromStr;
use tracing::{debug, warn};

/// The value of the "Split Between" cell that means the whole roster shares
/// the cost.
const EVERYONE: &str = "everyone";

/// Date formats seen in exports, tried in order.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];

// "Name","Date","Paid By","Split Between","Cost","Currency","Converted Cost","Location","Type"
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CsvRecord {
    pub(crate) name: String,
    pub(crate) date: String,
    #[serde(rename = "Paid By")]
    pub(crate) paid_by: String,
    #[serde(rename = "Split Between")]
    pub(crate) split_between: String,
    pub(crate) cost: String,
    pub(crate) currency: String,
    #[serde(rename = "Converted Cost")]
    pub(crate) converted_cost: String,
    #[serde(default)]
    pub(crate) location: String,
    #[serde(rename = "Type", default)]
    pub(crate) spend_type: String,
}

/// Reads a spreadsheet CSV export and produces the trip's spend records.
///
/// Returns an error only when the CSV itself cannot be read; individual bad
/// rows are skipped with a warning.
pub fn read_spends(reader: impl Read, config: &TripConfig) -> Result<Vec<Spend>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut spends = Vec::new();
    for (row_ix, result) in csv_reader.deserialize().enumerate() {
        let record: CsvRecord = result?;
        match spend_from_record(&record, config) {
            Ok(spend) => spends.push(spend),
            Err(e) => warn!("Skipping row {}: {e}", row_ix + 2),
        }
    }
    debug!("Imported {} spends for trip '{}'", spends.len(), config.trip);
    Ok(spends)
}

/// Reads the export and bundles it with the configured roster and locations.
pub fn read_trip_data(reader: impl Read, config: &TripConfig) -> Result<TripData> {
    Ok(TripData {
        trip: config.trip.clone(),
        roster: config.roster(),
        locations: config.locations(),
        spends: read_spends(reader, config)?,
    })
}

fn spend_from_record(record: &CsvRecord, config: &TripConfig) -> Result<Spend> {
    let date = parse_date(&record.date)?;

    let paid_by = config
        .person_for(&record.paid_by)
        .ok_or_else(|| anyhow!("Unknown payer '{}'", record.paid_by))?;

    let split = parse_split(&record.split_between, config)?;

    // A conversion failure upstream leaves the converted cost cell empty or
    // unparseable; the spend is kept at zero and flagged.
    let (converted_cost, conversion_failed) = match parse_cost(&record.converted_cost) {
        Some(amount) => (amount, false),
        None => (Amount::ZERO, true),
    };
    let original_cost = parse_cost(&record.cost).unwrap_or(Amount::ZERO);

    let location = non_empty(&record.location).map(Location::new);
    let spend_type = non_empty(&record.spend_type).map(SpendType::new);

    Ok(Spend {
        name: record.name.trim().to_string(),
        date,
        paid_by,
        split,
        original_cost,
        currency: record.currency.trim().to_string(),
        converted_cost,
        conversion_failed,
        location,
        spend_type,
    })
}

fn parse_date(s: &str) -> Result<chrono::NaiveDate> {
    let trimmed = s.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    bail!("Unparseable date '{s}'")
}

fn parse_split(s: &str, config: &TripConfig) -> Result<Split> {
    if s.trim().eq_ignore_ascii_case(EVERYONE) {
        return Ok(Split::Everyone);
    }
    let mut people = Vec::new();
    for part in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let person = config
            .person_for(part)
            .ok_or_else(|| anyhow!("Unknown splitter '{part}'"))?;
        if !people.contains(&person) {
            people.push(person);
        }
    }
    if people.is_empty() {
        bail!("Empty 'Split Between' cell");
    }
    Ok(Split::Among(people))
}

/// Empty cells mean "no value", not zero; an unparseable cell is also no
/// value so the caller can decide how to degrade.
fn parse_cost(s: &str) -> Option<Amount> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    Amount::from_str(trimmed).ok()
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Person;

    fn config() -> TripConfig {
        serde_json::from_str(
            r#"{
                "trip": "Portugal 2023",
                "people": [
                    {"name": "Walt", "email": "walt@example.com"},
                    {"name": "Jesse", "email": "jesse@example.com"},
                    {"name": "Mike", "email": "mike@example.com"}
                ],
                "locations": ["Lisbon"]
            }"#,
        )
        .unwrap()
    }

    const HEADER: &str =
        "Name,Date,Paid By,Split Between,Cost,Currency,Converted Cost,Location,Type";

    #[test]
    fn test_import_basic_rows() {
        let csv = format!(
            "{HEADER}\n\
             Dinner,2023-06-01,walt@example.com,Everyone,€81.00,EUR,$90.00,Lisbon,Food\n\
             Taxi,06/02/2023,jesse@example.com,jesse@example.com;mike@example.com,$20.00,USD,$20.00,,\n"
        );
        let spends = read_spends(csv.as_bytes(), &config()).unwrap();
        assert_eq!(spends.len(), 2);

        let dinner = &spends[0];
        assert_eq!(dinner.paid_by, Person::new("Walt"));
        assert_eq!(dinner.split, Split::Everyone);
        assert_eq!(dinner.converted_cost, Amount::from(90));
        assert!(!dinner.conversion_failed);
        assert_eq!(dinner.location, Some("Lisbon".into()));
        assert_eq!(dinner.spend_type, Some("Food".into()));

        let taxi = &spends[1];
        assert_eq!(
            taxi.split,
            Split::Among(vec![Person::new("Jesse"), Person::new("Mike")])
        );
        assert_eq!(taxi.date, chrono::NaiveDate::from_ymd_opt(2023, 6, 2).unwrap());
        assert_eq!(taxi.location, None);
        assert_eq!(taxi.spend_type, None);
    }

    #[test]
    fn test_missing_converted_cost_flags_conversion_failure() {
        let csv = format!(
            "{HEADER}\n\
             Dinner,2023-06-01,walt@example.com,Everyone,¥9000,JPY,,,\n"
        );
        let spends = read_spends(csv.as_bytes(), &config()).unwrap();
        assert_eq!(spends.len(), 1);
        assert!(spends[0].conversion_failed);
        assert!(spends[0].converted_cost.is_zero());
    }

    #[test]
    fn test_unknown_payer_row_is_skipped() {
        let csv = format!(
            "{HEADER}\n\
             Dinner,2023-06-01,lalo@example.com,Everyone,$10.00,USD,$10.00,,\n\
             Taxi,2023-06-02,walt@example.com,Everyone,$20.00,USD,$20.00,,\n"
        );
        let spends = read_spends(csv.as_bytes(), &config()).unwrap();
        assert_eq!(spends.len(), 1);
        assert_eq!(spends[0].name, "Taxi");
    }

    #[test]
    fn test_unparseable_date_row_is_skipped() {
        let csv = format!(
            "{HEADER}\n\
             Dinner,someday,walt@example.com,Everyone,$10.00,USD,$10.00,,\n"
        );
        let spends = read_spends(csv.as_bytes(), &config()).unwrap();
        assert!(spends.is_empty());
    }

    #[test]
    fn test_everyone_is_case_insensitive() {
        let csv = format!(
            "{HEADER}\n\
             Dinner,2023-06-01,walt@example.com,EVERYONE,$10.00,USD,$10.00,,\n"
        );
        let spends = read_spends(csv.as_bytes(), &config()).unwrap();
        assert_eq!(spends[0].split, Split::Everyone);
    }

    #[test]
    fn test_read_trip_data_carries_roster() {
        let csv = format!("{HEADER}\n");
        let data = read_trip_data(csv.as_bytes(), &config()).unwrap();
        assert_eq!(data.trip, "Portugal 2023");
        assert_eq!(data.roster.len(), 3);
        assert!(data.spends.is_empty());
    }
}
