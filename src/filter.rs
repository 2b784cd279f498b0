//! Filtering, sorting and searching the spend list.
//!
//! Every filter dimension follows the same rule: an empty selection is
//! inactive and keeps everything, a non-empty selection restricts. Filters
//! compose as an intersection in a fixed order (payer, participant, type,
//! location, search) and at most one sort applies last.
//!
//! The aggregation engine also needs "hold one dimension out" views so that,
//! for example, the by-type totals stay stable while the type filter itself
//! changes; [`apply`] produces those alongside the fully filtered list.

use crate::model::{Location, Person, Spend, SpendType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One filter dimension's set of selected values.
///
/// Empty means inactive, which is the identity transform (show everything),
/// never "show nothing".
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection<T: Ord> {
    selected: BTreeSet<T>,
}

impl<T: Ord> Default for Selection<T> {
    fn default() -> Self {
        Self {
            selected: BTreeSet::new(),
        }
    }
}

impl<T: Ord> Selection<T> {
    /// True when at least one value is selected.
    pub fn is_active(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Selects `value` if unselected, deselects it otherwise.
    pub fn toggle(&mut self, value: T) {
        if !self.selected.remove(&value) {
            self.selected.insert(value);
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn contains(&self, value: &T) -> bool {
        self.selected.contains(value)
    }

    /// Whether `value` passes this filter: inactive selections pass everything.
    pub fn allows(&self, value: &T) -> bool {
        !self.is_active() || self.selected.contains(value)
    }

    /// How many of `values` are selected.
    pub fn count_selected<'a>(&self, values: impl IntoIterator<Item = &'a T>) -> usize
    where
        T: 'a,
    {
        values.into_iter().filter(|v| self.selected.contains(v)).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.selected.iter()
    }
}

/// The sortable columns of the spend list.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Date,
    Cost,
    Name,
}

serde_plain::derive_display_from_serialize!(SortField);
serde_plain::derive_fromstr_from_deserialize!(SortField);

#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

serde_plain::derive_display_from_serialize!(SortOrder);
serde_plain::derive_fromstr_from_deserialize!(SortOrder);

/// The single active sort, if any.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

/// Every active filter, search and sort selection.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FilterState {
    /// Keep spends whose payer is selected.
    pub payers: Selection<Person>,
    /// Keep spends whose splitter set intersects the selection.
    pub participants: Selection<Person>,
    /// Keep spends whose type bucket is selected ("Other" for untyped).
    pub types: Selection<SpendType>,
    /// Keep spends whose location bucket is selected ("Other" for unlocated).
    pub locations: Selection<Location>,
    /// Free-text query over name, payer, location and date. Empty = identity.
    pub search: String,
    /// At most one sort is active at a time.
    pub sort: Option<Sort>,
}

impl FilterState {
    /// Cycles a sort column: none -> descending -> ascending -> none.
    /// Activating any column deactivates the others.
    pub fn toggle_sort(&mut self, field: SortField) {
        self.sort = match self.sort {
            Some(sort) if sort.field == field => match sort.order {
                SortOrder::Descending => Some(Sort {
                    field,
                    order: SortOrder::Ascending,
                }),
                SortOrder::Ascending => None,
            },
            _ => Some(Sort {
                field,
                order: SortOrder::Descending,
            }),
        };
    }

    /// True when no filter, search or sort is active.
    pub fn is_identity(&self) -> bool {
        !self.payers.is_active()
            && !self.participants.is_active()
            && !self.types.is_active()
            && !self.locations.is_active()
            && self.search.trim().is_empty()
            && self.sort.is_none()
    }

    fn payer_ok(&self, spend: &Spend) -> bool {
        self.payers.allows(&spend.paid_by)
    }

    /// A spend passes when its splitter set intersects the selection. A spend
    /// split among everyone always matches an active selection, since
    /// everyone participates.
    fn participant_ok(&self, spend: &Spend, roster: &[Person]) -> bool {
        !self.participants.is_active()
            || spend
                .split
                .participants(roster)
                .iter()
                .any(|p| self.participants.contains(p))
    }

    fn type_ok(&self, spend: &Spend) -> bool {
        self.types.allows(&spend.type_bucket())
    }

    fn location_ok(&self, spend: &Spend) -> bool {
        self.locations.allows(&spend.location_bucket())
    }
}

/// The filtered spend list plus the three hold-one-out views the aggregation
/// engine consumes. All lists preserve ingestion order except `filtered`,
/// which is relevance-ordered under an active search and re-ordered by the
/// active sort.
#[derive(Debug, Clone)]
pub struct FilteredViews<'a> {
    /// Every filter applied, then search relevance, then the active sort.
    pub filtered: Vec<&'a Spend>,
    /// Every filter except the split-participant filter.
    pub without_participant: Vec<&'a Spend>,
    /// Every filter except the type filter.
    pub without_type: Vec<&'a Spend>,
    /// Every filter except the location filter.
    pub without_location: Vec<&'a Spend>,
}

/// Runs the filter pipeline over `spends` and produces all four views.
pub fn apply<'a>(spends: &'a [Spend], state: &FilterState, roster: &[Person]) -> FilteredViews<'a> {
    let query = state.search.trim().to_lowercase();

    let mut filtered: Vec<(&Spend, SearchRank)> = Vec::new();
    let mut without_participant = Vec::new();
    let mut without_type = Vec::new();
    let mut without_location = Vec::new();

    for spend in spends {
        let payer = state.payer_ok(spend);
        let participant = state.participant_ok(spend, roster);
        let type_ = state.type_ok(spend);
        let location = state.location_ok(spend);
        let rank = search_rank(spend, &query);
        let search = query.is_empty() || rank.is_some();

        if payer && search {
            if participant && type_ && location {
                filtered.push((spend, rank.unwrap_or_default()));
            }
            if type_ && location {
                without_participant.push(spend);
            }
            if participant && location {
                without_type.push(spend);
            }
            if participant && type_ {
                without_location.push(spend);
            }
        }
    }

    // Relevance order only matters when a query is active; the sort below
    // overrides it.
    if !query.is_empty() {
        filtered.sort_by_key(|(_, rank)| *rank);
    }
    let mut filtered: Vec<&Spend> = filtered.into_iter().map(|(spend, _)| spend).collect();
    if let Some(sort) = state.sort {
        sort_spends(&mut filtered, sort);
    }

    FilteredViews {
        filtered,
        without_participant,
        without_type,
        without_location,
    }
}

/// Lower ranks are better matches: first by which field matched (name beats
/// payer beats location beats date), then by match position within the field.
type SearchRank = (usize, usize);

fn search_rank(spend: &Spend, query: &str) -> Option<SearchRank> {
    if query.is_empty() {
        return None;
    }
    let fields = [
        spend.name.to_lowercase(),
        spend.paid_by.name().to_lowercase(),
        spend.location_bucket().name().to_lowercase(),
        spend.date.to_string(),
    ];
    fields
        .iter()
        .enumerate()
        .find_map(|(field_ix, field)| field.find(query).map(|pos| (field_ix, pos)))
}

fn sort_spends(spends: &mut [&Spend], sort: Sort) {
    use std::cmp::Reverse;
    use SortField::*;
    use SortOrder::*;
    match (sort.field, sort.order) {
        (Date, Ascending) => spends.sort_by_key(|s| s.date),
        (Date, Descending) => spends.sort_by_key(|s| Reverse(s.date)),
        (Cost, Ascending) => spends.sort_by_key(|s| s.converted_cost),
        (Cost, Descending) => spends.sort_by_key(|s| Reverse(s.converted_cost)),
        (Name, Ascending) => spends.sort_by_key(|s| s.name.to_lowercase()),
        (Name, Descending) => spends.sort_by_key(|s| Reverse(s.name.to_lowercase())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Split};
    use chrono::NaiveDate;

    fn person(name: &str) -> Person {
        Person::new(name)
    }

    fn roster() -> Vec<Person> {
        vec![person("A"), person("B"), person("C")]
    }

    fn spend(name: &str, paid_by: &str, cost: i64, split: Split, day: u32) -> Spend {
        Spend {
            name: name.to_string(),
            date: NaiveDate::from_ymd_opt(2023, 6, day).unwrap(),
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

    fn sample() -> Vec<Spend> {
        vec![
            spend("Taxi", "A", 30, Split::Everyone, 3),
            spend("Dinner", "B", 90, Split::Among(vec![person("B"), person("C")]), 1),
            spend("Museum", "C", 45, Split::Among(vec![person("A")]), 2),
        ]
    }

    #[test]
    fn test_no_filters_is_identity() {
        let spends = sample();
        let views = apply(&spends, &FilterState::default(), &roster());
        let names: Vec<&str> = views.filtered.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Taxi", "Dinner", "Museum"]);
        assert_eq!(views.without_participant.len(), 3);
        assert_eq!(views.without_type.len(), 3);
        assert_eq!(views.without_location.len(), 3);
    }

    #[test]
    fn test_payer_filter_restricts() {
        let spends = sample();
        let mut state = FilterState::default();
        state.payers.toggle(person("B"));
        let views = apply(&spends, &state, &roster());
        assert_eq!(views.filtered.len(), 1);
        assert_eq!(views.filtered[0].name, "Dinner");
        // The payer filter applies to every view.
        assert_eq!(views.without_participant.len(), 1);
    }

    #[test]
    fn test_everyone_split_matches_any_participant_selection() {
        let spends = sample();
        let mut state = FilterState::default();
        state.participants.toggle(person("A"));
        let views = apply(&spends, &state, &roster());
        let names: Vec<&str> = views.filtered.iter().map(|s| s.name.as_str()).collect();
        // "Taxi" is split among everyone so A participates; "Museum" is split
        // to A explicitly; "Dinner" excludes A.
        assert_eq!(names, vec!["Taxi", "Museum"]);
        // The hold-out view ignores the participant filter.
        assert_eq!(views.without_participant.len(), 3);
    }

    #[test]
    fn test_untyped_spends_bucket_under_other() {
        let mut spends = sample();
        spends[0].spend_type = Some("Transport".into());
        let mut state = FilterState::default();
        state.types.toggle(SpendType::other());
        let views = apply(&spends, &state, &roster());
        let names: Vec<&str> = views.filtered.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Dinner", "Museum"]);
    }

    #[test]
    fn test_search_orders_by_relevance_and_empty_query_preserves_order() {
        let spends = vec![
            spend("Late dinner", "A", 10, Split::Everyone, 1),
            spend("Dinner", "B", 20, Split::Everyone, 2),
        ];
        let mut state = FilterState::default();
        state.search = "dinner".to_string();
        let views = apply(&spends, &state, &roster());
        let names: Vec<&str> = views.filtered.iter().map(|s| s.name.as_str()).collect();
        // "Dinner" matches at position 0 and outranks "Late dinner".
        assert_eq!(names, vec!["Dinner", "Late dinner"]);

        state.search = String::new();
        let views = apply(&spends, &state, &roster());
        let names: Vec<&str> = views.filtered.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Late dinner", "Dinner"]);
    }

    #[test]
    fn test_search_matches_payer_field() {
        let spends = sample();
        let mut state = FilterState::default();
        state.search = "c".to_string();
        let views = apply(&spends, &state, &roster());
        assert!(views.filtered.iter().any(|s| s.name == "Museum"));
    }

    #[test]
    fn test_sort_cycle_and_exclusivity() {
        let mut state = FilterState::default();
        state.toggle_sort(SortField::Date);
        assert_eq!(
            state.sort,
            Some(Sort {
                field: SortField::Date,
                order: SortOrder::Descending
            })
        );
        state.toggle_sort(SortField::Date);
        assert_eq!(
            state.sort,
            Some(Sort {
                field: SortField::Date,
                order: SortOrder::Ascending
            })
        );
        // A different column takes over rather than stacking.
        state.toggle_sort(SortField::Cost);
        assert_eq!(
            state.sort,
            Some(Sort {
                field: SortField::Cost,
                order: SortOrder::Descending
            })
        );
        state.toggle_sort(SortField::Cost);
        state.toggle_sort(SortField::Cost);
        assert_eq!(state.sort, None);
    }

    #[test]
    fn test_sort_by_cost_ascending() {
        let spends = sample();
        let mut state = FilterState::default();
        state.sort = Some(Sort {
            field: SortField::Cost,
            order: SortOrder::Ascending,
        });
        let views = apply(&spends, &state, &roster());
        let names: Vec<&str> = views.filtered.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Taxi", "Museum", "Dinner"]);
    }

    #[test]
    fn test_selection_toggle_roundtrip() {
        let mut selection: Selection<Person> = Selection::default();
        assert!(!selection.is_active());
        assert!(selection.allows(&person("A")));
        selection.toggle(person("A"));
        assert!(selection.is_active());
        assert!(selection.allows(&person("A")));
        assert!(!selection.allows(&person("B")));
        selection.toggle(person("A"));
        assert!(!selection.is_active());
    }
}
