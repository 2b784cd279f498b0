//! The pairwise debt ledger: for every pair of people, who owes whom.
//!
//! The ledger is always built from the full, unfiltered spend list and is
//! rebuilt from scratch whenever that list changes. It is derived data, never
//! mutated incrementally.

use crate::model::{Amount, Person, Spend, Split};
use crate::split::share;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Why a spend could not be applied to the ledger.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The payer is not on the trip roster.
    UnknownPayer(Person),
    /// A listed splitter is not on the trip roster.
    UnknownSplitter(Person),
}

/// A spend that was skipped during the ledger build, with the offending data.
///
/// A referentially inconsistent spend is skipped in its entirety; the ledger
/// never applies half of a spend.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SkippedSpend {
    /// Index of the spend in the input list.
    pub index: usize,
    pub name: String,
    pub reason: SkipReason,
}

/// The net pairwise debts between all roster members.
///
/// `owed(a, b)` is the net amount `a` owes `b`; it may be negative (meaning
/// `b` owes `a`) or zero. The structure is anti-symmetric:
/// `owed(a, b) == -owed(b, a)`, and a person never owes themselves.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DebtLedger {
    entries: BTreeMap<Person, BTreeMap<Person, Amount>>,
}

impl DebtLedger {
    /// Builds the ledger from the full spend list.
    ///
    /// Spends referencing people outside the roster are skipped whole and
    /// returned as diagnostics; everything else is applied.
    pub fn build(spends: &[Spend], roster: &[Person]) -> (Self, Vec<SkippedSpend>) {
        let mut entries: BTreeMap<Person, BTreeMap<Person, Amount>> = roster
            .iter()
            .map(|person| (person.clone(), BTreeMap::new()))
            .collect();
        let mut skipped = Vec::new();

        for (index, spend) in spends.iter().enumerate() {
            if let Some(reason) = integrity_problem(spend, roster) {
                warn!(
                    "Skipping spend '{}' (row {}): {:?}",
                    spend.name, index, reason
                );
                skipped.push(SkippedSpend {
                    index,
                    name: spend.name.clone(),
                    reason,
                });
                continue;
            }

            let per_person = share(spend.effective_cost(), &spend.split, roster.len());
            for splitter in spend.split.participants(roster) {
                // A person never owes themselves.
                if *splitter == spend.paid_by {
                    continue;
                }
                // Both rows exist: they were pre-initialized from the roster
                // and the integrity check passed.
                if let Some(row) = entries.get_mut(splitter) {
                    *row.entry(spend.paid_by.clone()).or_insert(Amount::ZERO) += per_person;
                }
                if let Some(row) = entries.get_mut(&spend.paid_by) {
                    *row.entry(splitter.clone()).or_insert(Amount::ZERO) -= per_person;
                }
            }
        }

        (Self { entries }, skipped)
    }

    /// The net amount `debtor` owes `creditor`. Zero when no spends connect
    /// the pair or when their debts cancel out.
    pub fn owed(&self, debtor: &Person, creditor: &Person) -> Amount {
        self.entries
            .get(debtor)
            .and_then(|row| row.get(creditor))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// All of `debtor`'s counterparties with the net amount owed to each.
    pub fn debts_of(&self, debtor: &Person) -> Option<&BTreeMap<Person, Amount>> {
        self.entries.get(debtor)
    }

    /// The people with a ledger row, i.e. the roster.
    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.entries.keys()
    }
}

fn integrity_problem(spend: &Spend, roster: &[Person]) -> Option<SkipReason> {
    if !roster.contains(&spend.paid_by) {
        return Some(SkipReason::UnknownPayer(spend.paid_by.clone()));
    }
    if let Split::Among(people) = &spend.split {
        for person in people {
            if !roster.contains(person) {
                return Some(SkipReason::UnknownSplitter(person.clone()));
            }
        }
    }
    None
}
