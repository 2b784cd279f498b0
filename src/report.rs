//! Plain-text rendering of core outputs for the CLI.
//!
//! The web app renders these as cards and charts; the CLI prints them. Each
//! renderer takes the derived data and returns a `String`, leaving printing to
//! the caller.

use crate::aggregate::Summary;
use crate::ledger::{DebtLedger, SkippedSpend};
use crate::model::{Amount, Person, Spend};
use std::fmt::Write;

/// Renders the "who owes whom" view: one line per indebted pair, largest
/// debts first, plus a note for any skipped spends.
pub fn render_ledger(ledger: &DebtLedger, skipped: &[SkippedSpend]) -> String {
    let mut debts: Vec<(&Person, &Person, Amount)> = Vec::new();
    for debtor in ledger.people() {
        for creditor in ledger.people() {
            if debtor == creditor {
                continue;
            }
            let amount = ledger.owed(debtor, creditor);
            // Each pair appears once, in its indebted direction.
            if !amount.is_zero() && !amount.is_negative() {
                debts.push((debtor, creditor, amount));
            }
        }
    }
    debts.sort_by(|a, b| b.2.cmp(&a.2));

    let mut out = String::new();
    if debts.is_empty() {
        out.push_str("Everyone is settled up.\n");
    }
    for (debtor, creditor, amount) in debts {
        let _ = writeln!(out, "{debtor} owes {creditor} {amount}");
    }
    if !skipped.is_empty() {
        let _ = writeln!(
            out,
            "Note: {} spend(s) were skipped due to unknown people and are not reflected above.",
            skipped.len()
        );
    }
    out
}

/// Renders the summary totals and per-dimension breakdowns.
pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total spend:    {}", summary.filtered_total_spend);
    let _ = writeln!(
        out,
        "Selected spend: {}",
        summary.filtered_people_total_spend
    );
    if summary.understated {
        out.push_str("Warning: some costs failed currency conversion; totals may be understated.\n");
    }

    out.push_str("\nBy person:\n");
    for (person, amount) in &summary.total_spend_by_person {
        let _ = writeln!(out, "  {person}: {amount}");
    }

    out.push_str("\nBy type:\n");
    for (spend_type, amount) in &summary.total_spend_by_type {
        let _ = writeln!(out, "  {spend_type}: {amount}");
    }

    out.push_str("\nBy location:\n");
    for (location, amount) in &summary.total_spend_by_location {
        let _ = writeln!(out, "  {location}: {amount}");
    }

    out.push_str("\nBy date:\n");
    for (date, amount) in &summary.total_spend_by_date {
        let _ = writeln!(out, "  {date}: {amount}");
    }

    out
}

/// Renders the filtered spend list, one line per spend.
pub fn render_list(spends: &[Spend]) -> String {
    let mut out = String::new();
    for spend in spends {
        let _ = writeln!(
            out,
            "{}  {:<30} {:>12}  paid by {}",
            spend.date,
            spend.name,
            spend.converted_cost.to_string(),
            spend.paid_by
        );
        if spend.conversion_failed {
            let _ = writeln!(
                out,
                "            (conversion from {} failed; counted as $0.00)",
                spend.currency
            );
        }
    }
    if spends.is_empty() {
        out.push_str("No spends match the current filters.\n");
    }
    out
}
