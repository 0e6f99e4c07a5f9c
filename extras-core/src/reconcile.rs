//! Balance reconciliation and multi-document meta merging.

use crate::types::{StatementDates, StatementMeta, Transaction};

/// Tolerance for the reconciliation checksum.
pub const BALANCE_EPSILON: f64 = 0.001;

/// True iff the signed transaction sum explains the balance delta within
/// tolerance. Missing balances or unparseable amounts fail the check.
pub fn checksum_valid(
    initial: Option<f64>,
    final_balance: Option<f64>,
    txns: &[Transaction],
) -> bool {
    let (Some(initial), Some(final_balance)) = (initial, final_balance) else {
        return false;
    };
    let sum: f64 = txns.iter().map(|t| t.signed_amount()).sum();
    // a NaN amount poisons the sum and fails the comparison
    (final_balance - initial - sum).abs() < BALANCE_EPSILON
}

/// Merge per-document metas into one period meta.
///
/// Metas are sorted by start date ascending (missing dates sort first);
/// the merged meta takes the earliest start date, the end date of the last
/// element after sorting (by order, not the maximum), the initial balance
/// of the earliest-dated meta and the final balance of the latest. Source
/// documents are assumed chronologically contiguous and non-overlapping;
/// nothing checks this. The caller recomputes `checksum_valid` against the
/// merged transaction list.
pub fn merge_meta_array(metas: &[StatementMeta]) -> Option<StatementMeta> {
    if metas.is_empty() {
        return None;
    }

    let mut sorted: Vec<&StatementMeta> = metas.iter().collect();
    sorted.sort_by(|a, b| a.dates.start_date.cmp(&b.dates.start_date));

    let first = sorted[0];
    let last = sorted[sorted.len() - 1];

    Some(StatementMeta {
        bank: first.bank,
        currency: first.currency.clone(),
        dates: StatementDates {
            start_date: first.dates.start_date.clone(),
            end_date: last.dates.end_date.clone(),
        },
        initial_balance: first.initial_balance,
        final_balance: last.final_balance,
        checksum_valid: false,
    })
}
