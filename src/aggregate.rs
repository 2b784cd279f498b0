//! The filtered aggregation engine.
//!
//! Produces the totals behind every summary view: overall filtered spend,
//! spend attributed to the selected participants, and breakdowns by person,
//! type, location and date. Each breakdown is computed against the view that
//! holds its own filter dimension out, so (for example) the by-type totals do
//! not change when a type is selected, while still respecting the person and
//! location filters.
//!
//! Everything here is recomputed in full on every change. At hundreds of
//! records a linear pass is cheap, and a full rebuild keeps the outputs a pure
//! function of the inputs.

use crate::filter::{FilteredViews, Selection};
use crate::model::{Amount, Location, Person, Spend, SpendType};
use crate::split::share;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// A per-day money series with no gaps between its first and last day.
pub type DateSeries = BTreeMap<NaiveDate, Amount>;

/// Every aggregate the summary views consume.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Summary {
    /// Total spend under the type/location filters, ignoring the
    /// split-participant filter.
    pub filtered_total_spend: Amount,
    /// Spend attributed only to the selected participants over the fully
    /// filtered list. Equals the full cost sum when no participant filter is
    /// active (everyone is selected by default).
    pub filtered_people_total_spend: Amount,
    /// Each person's summed share, independent of the participant filter.
    pub total_spend_by_person: BTreeMap<Person, Amount>,
    /// Filter-adjusted spend per type bucket, independent of the type filter.
    pub total_spend_by_type: BTreeMap<SpendType, Amount>,
    /// Filter-adjusted spend per location bucket, independent of the location
    /// filter.
    pub total_spend_by_location: BTreeMap<Location, Amount>,
    /// Filter-adjusted spend per calendar day, densified so every day between
    /// the earliest and latest spend appears, even at zero.
    pub total_spend_by_date: DateSeries,
    /// Per-person daily series, densified over the same global date range so
    /// every series shares an x-axis.
    pub total_spend_by_date_by_person: BTreeMap<Person, DateSeries>,
    /// True when any aggregated spend failed currency conversion, meaning the
    /// money totals may be understated.
    pub understated: bool,
}

/// Computes every aggregate from the filtered views and the active
/// participant selection. Pure: reads snapshots, returns new maps.
pub fn summarize(
    views: &FilteredViews<'_>,
    participants: &Selection<Person>,
    roster: &[Person],
) -> Summary {
    let mut summary = Summary {
        understated: views
            .filtered
            .iter()
            .chain(&views.without_participant)
            .chain(&views.without_type)
            .chain(&views.without_location)
            .any(|s| s.conversion_failed),
        ..Summary::default()
    };

    for spend in &views.without_participant {
        summary.filtered_total_spend += spend.effective_cost();
    }

    // Per-person shares, held out from the participant filter so the
    // by-person cards stay stable while people are selected. Every roster
    // member gets a bucket even at zero spend.
    for person in roster {
        summary
            .total_spend_by_person
            .insert(person.clone(), Amount::ZERO);
    }
    for spend in &views.without_participant {
        let per_person = share(spend.effective_cost(), &spend.split, roster.len());
        for person in spend.split.participants(roster) {
            *summary
                .total_spend_by_person
                .entry(person.clone())
                .or_insert(Amount::ZERO) += per_person;
        }
    }

    for spend in &views.without_type {
        *summary
            .total_spend_by_type
            .entry(spend.type_bucket())
            .or_insert(Amount::ZERO) += adjusted_cost(spend, participants, roster);
    }

    for spend in &views.without_location {
        *summary
            .total_spend_by_location
            .entry(spend.location_bucket())
            .or_insert(Amount::ZERO) += adjusted_cost(spend, participants, roster);
    }

    for spend in &views.filtered {
        let adjusted = adjusted_cost(spend, participants, roster);
        summary.filtered_people_total_spend += adjusted;
        *summary
            .total_spend_by_date
            .entry(spend.date)
            .or_insert(Amount::ZERO) += adjusted;

        let per_person = share(spend.effective_cost(), &spend.split, roster.len());
        for person in spend.split.participants(roster) {
            if !participants.allows(person) {
                continue;
            }
            *summary
                .total_spend_by_date_by_person
                .entry(person.clone())
                .or_insert_with(BTreeMap::new)
                .entry(spend.date)
                .or_insert(Amount::ZERO) += per_person;
        }
    }

    // Densify the time series so charts get a contiguous x-axis. The
    // per-person series share the global range of the filtered list.
    let range = date_range(&summary.total_spend_by_date);
    densify(&mut summary.total_spend_by_date, range);
    for series in summary.total_spend_by_date_by_person.values_mut() {
        densify(series, range);
    }

    summary
}

/// The cost a spend contributes under the active participant selection: its
/// full cost when the selection is inactive, otherwise its per-person share
/// times the number of selected people who share it.
fn adjusted_cost(spend: &Spend, participants: &Selection<Person>, roster: &[Person]) -> Amount {
    if !participants.is_active() {
        return spend.effective_cost();
    }
    let selected = participants.count_selected(spend.split.participants(roster));
    share(spend.effective_cost(), &spend.split, roster.len()).times(selected)
}

fn date_range(series: &DateSeries) -> Option<(NaiveDate, NaiveDate)> {
    let first = *series.keys().next()?;
    let last = *series.keys().next_back()?;
    Some((first, last))
}

/// Inserts a zero entry for every day missing between `first` and `last`.
/// An empty series has no anchor and stays empty.
fn densify(series: &mut DateSeries, range: Option<(NaiveDate, NaiveDate)>) {
    let Some((first, last)) = range else {
        return;
    };
    let mut day = first;
    while day <= last {
        series.entry(day).or_insert(Amount::ZERO);
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{self, FilterState};
    use crate::model::Split;

    fn person(name: &str) -> Person {
        Person::new(name)
    }

    fn roster() -> Vec<Person> {
        vec![person("A"), person("B"), person("C")]
    }

    fn spend(name: &str, paid_by: &str, cost: i64, split: Split, day: u32) -> Spend {
        Spend {
            name: name.to_string(),
            date: NaiveDate::from_ymd_opt(2023, 1, day).unwrap(),
            paid_by: paid_by.into(),
            split,
            original_cost: Amount::from(cost),
            currency: "USD".to_string(),
            converted_cost: Amount::from(cost),
            conversion_failed: false,
            location: None,
            spend_type: None,
        }
    }

    fn summarize_with(spends: &[Spend], state: &FilterState) -> Summary {
        let roster = roster();
        let views = filter::apply(spends, state, &roster);
        summarize(&views, &state.participants, &roster)
    }

    #[test]
    fn test_empty_input_yields_empty_aggregates() {
        let summary = summarize_with(&[], &FilterState::default());
        assert!(summary.filtered_total_spend.is_zero());
        assert!(summary.filtered_people_total_spend.is_zero());
        assert!(summary.total_spend_by_type.is_empty());
        assert!(summary.total_spend_by_date.is_empty());
        assert!(!summary.understated);
        // Roster buckets exist even with no spends.
        assert_eq!(summary.total_spend_by_person.len(), 3);
    }

    #[test]
    fn test_totals_without_filters() {
        let spends = vec![
            spend("Taxi", "A", 30, Split::Everyone, 1),
            spend("Dinner", "B", 90, Split::Among(vec![person("B"), person("C")]), 2),
        ];
        let summary = summarize_with(&spends, &FilterState::default());
        assert_eq!(summary.filtered_total_spend, Amount::from(120));
        assert_eq!(summary.filtered_people_total_spend, Amount::from(120));
        // A: 10 from the taxi. B: 10 + 45. C: 10 + 45.
        assert_eq!(summary.total_spend_by_person[&person("A")], Amount::from(10));
        assert_eq!(summary.total_spend_by_person[&person("B")], Amount::from(55));
        assert_eq!(summary.total_spend_by_person[&person("C")], Amount::from(55));
    }

    #[test]
    fn test_selected_participant_scales_cost() {
        // $30 split among everyone, only A selected: (30 / 3) * 1 = 10.
        let spends = vec![spend("Taxi", "B", 30, Split::Everyone, 1)];
        let mut state = FilterState::default();
        state.participants.toggle(person("A"));
        let summary = summarize_with(&spends, &state);
        assert_eq!(summary.filtered_people_total_spend, Amount::from(10));
        // The headline total ignores the participant filter.
        assert_eq!(summary.filtered_total_spend, Amount::from(30));
        // So does the by-person map.
        assert_eq!(summary.total_spend_by_person[&person("B")], Amount::from(10));
    }

    #[test]
    fn test_by_type_ignores_the_type_filter_but_respects_others() {
        let mut spends = vec![
            spend("Taxi", "A", 30, Split::Everyone, 1),
            spend("Dinner", "B", 60, Split::Everyone, 2),
        ];
        spends[0].spend_type = Some("Transport".into());
        spends[1].spend_type = Some("Food".into());

        let mut state = FilterState::default();
        state.types.toggle(SpendType::new("Food"));
        let summary = summarize_with(&spends, &state);
        // Both types appear despite the Food selection.
        assert_eq!(
            summary.total_spend_by_type[&SpendType::new("Transport")],
            Amount::from(30)
        );
        assert_eq!(
            summary.total_spend_by_type[&SpendType::new("Food")],
            Amount::from(60)
        );
        // But the date series honors it.
        assert_eq!(summary.total_spend_by_date.len(), 1);
    }

    #[test]
    fn test_untyped_and_unlocated_bucket_under_other() {
        let spends = vec![spend("Mystery", "A", 12, Split::Everyone, 1)];
        let summary = summarize_with(&spends, &FilterState::default());
        assert_eq!(
            summary.total_spend_by_type[&SpendType::other()],
            Amount::from(12)
        );
        assert_eq!(
            summary.total_spend_by_location[&Location::other()],
            Amount::from(12)
        );
    }

    #[test]
    fn test_date_densification() {
        let spends = vec![
            spend("First", "A", 30, Split::Everyone, 1),
            spend("Last", "B", 60, Split::Everyone, 5),
        ];
        let summary = summarize_with(&spends, &FilterState::default());
        assert_eq!(summary.total_spend_by_date.len(), 5);
        for day in 2..=4 {
            let date = NaiveDate::from_ymd_opt(2023, 1, day).unwrap();
            assert_eq!(summary.total_spend_by_date[&date], Amount::ZERO);
        }
        assert_eq!(
            summary.total_spend_by_date[&NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()],
            Amount::from(30)
        );
    }

    #[test]
    fn test_per_person_series_share_the_global_range() {
        let spends = vec![
            spend("First", "A", 30, Split::Among(vec![person("A")]), 1),
            spend("Last", "B", 60, Split::Among(vec![person("B")]), 5),
        ];
        let summary = summarize_with(&spends, &FilterState::default());
        // A only spent on day 1, but the series spans the full filtered range.
        let a_series = &summary.total_spend_by_date_by_person[&person("A")];
        assert_eq!(a_series.len(), 5);
        assert_eq!(
            a_series[&NaiveDate::from_ymd_opt(2023, 1, 5).unwrap()],
            Amount::ZERO
        );
    }

    #[test]
    fn test_conversion_failed_counts_at_zero_and_flags_understated() {
        let mut bad = spend("Mystery", "A", 0, Split::Everyone, 1);
        bad.conversion_failed = true;
        bad.spend_type = Some("Food".into());
        let spends = vec![bad, spend("Taxi", "B", 30, Split::Everyone, 1)];
        let summary = summarize_with(&spends, &FilterState::default());
        assert!(summary.understated);
        // The failed spend still creates its bucket, at zero contribution.
        assert_eq!(
            summary.total_spend_by_type[&SpendType::new("Food")],
            Amount::ZERO
        );
        assert_eq!(summary.filtered_total_spend, Amount::from(30));
    }

    #[test]
    fn test_idempotent_reaggregation() {
        let spends = vec![
            spend("Taxi", "A", 30, Split::Everyone, 1),
            spend("Dinner", "B", 90, Split::Among(vec![person("B"), person("C")]), 4),
        ];
        let mut state = FilterState::default();
        state.participants.toggle(person("B"));
        let first = summarize_with(&spends, &state);
        let second = summarize_with(&spends, &state);
        assert_eq!(first, second);
    }
}
