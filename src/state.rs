//! The application-state container.
//!
//! `TripState` owns the current trip's data and filter selections and holds
//! the derived results (debt ledger, summary, filtered list). It is an
//! explicit object passed down to whoever needs it, not a global store. Every
//! mutation triggers a full synchronous recomputation: the ledger is always
//! rebuilt from the complete spend list, and the summary from the filtered
//! views. The core functions it calls are pure; this is the only place that
//! holds mutable state.

use crate::aggregate::{self, Summary};
use crate::filter::{self, FilterState, SortField};
use crate::ledger::{DebtLedger, SkippedSpend};
use crate::model::{Location, Person, Spend, SpendType, TripData};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Default, Debug, Clone)]
pub struct TripState {
    data: TripData,
    filters: FilterState,
    // Derived; rebuilt whole on every change.
    ledger: DebtLedger,
    skipped: Vec<SkippedSpend>,
    summary: Summary,
    filtered: Vec<Spend>,
}

impl TripState {
    pub fn new(data: TripData) -> Self {
        let mut state = Self {
            data,
            ..Self::default()
        };
        state.recompute();
        state
    }

    /// Switches trips: replaces all data, resets every filter selection, and
    /// rebuilds everything derived.
    pub fn set_trip(&mut self, data: TripData) {
        debug!("Switching to trip '{}'", data.trip);
        self.data = data;
        self.filters = FilterState::default();
        self.recompute();
    }

    /// Replaces the spend list wholesale (e.g. after a re-fetch). Filter
    /// selections survive; derived state is rebuilt.
    pub fn set_spends(&mut self, spends: Vec<Spend>) {
        self.data.spends = spends;
        self.recompute();
    }

    pub fn toggle_payer(&mut self, person: Person) {
        self.filters.payers.toggle(person);
        self.recompute();
    }

    pub fn toggle_participant(&mut self, person: Person) {
        self.filters.participants.toggle(person);
        self.recompute();
    }

    pub fn toggle_type(&mut self, spend_type: SpendType) {
        self.filters.types.toggle(spend_type);
        self.recompute();
    }

    pub fn toggle_location(&mut self, location: Location) {
        self.filters.locations.toggle(location);
        self.recompute();
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.filters.search = query.into();
        self.recompute();
    }

    pub fn toggle_sort(&mut self, field: SortField) {
        self.filters.toggle_sort(field);
        self.recompute();
    }

    /// Applies arbitrary filter changes in one recomputation pass.
    pub fn update_filters(&mut self, update: impl FnOnce(&mut FilterState)) {
        update(&mut self.filters);
        self.recompute();
    }

    pub fn data(&self) -> &TripData {
        &self.data
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// The pairwise debt ledger, always over the full unfiltered list.
    pub fn ledger(&self) -> &DebtLedger {
        &self.ledger
    }

    /// Spends that could not be applied to the ledger.
    pub fn skipped(&self) -> &[SkippedSpend] {
        &self.skipped
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// The fully filtered, searched and sorted spend list.
    pub fn filtered_spends(&self) -> &[Spend] {
        &self.filtered
    }

    fn recompute(&mut self) {
        let (ledger, skipped) = DebtLedger::build(&self.data.spends, &self.data.roster);
        self.ledger = ledger;
        self.skipped = skipped;

        // The spends the ledger refused are held out of the filtered views
        // too, so aggregation never invents buckets for people who are not on
        // the roster. A bad spend is excluded everywhere, not half-applied.
        let skipped_rows: BTreeSet<usize> = self.skipped.iter().map(|s| s.index).collect();
        let valid: Vec<Spend> = self
            .data
            .spends
            .iter()
            .enumerate()
            .filter(|(ix, _)| !skipped_rows.contains(ix))
            .map(|(_, spend)| spend.clone())
            .collect();

        let views = filter::apply(&valid, &self.filters, &self.data.roster);
        self.summary = aggregate::summarize(&views, &self.filters.participants, &self.data.roster);
        self.filtered = views.filtered.into_iter().cloned().collect();
    }
}
