use serde::{Deserialize, Serialize};

use super::{Amount, Direction, Transaction, TransactionId};

/// Inflow and outflow sums over a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub inflow: Amount,
    pub outflow: Amount,
}

impl LedgerTotals {
    /// Balance = inflow - outflow. May be negative.
    pub fn balance(&self) -> Amount {
        self.inflow - self.outflow
    }
}

/// Compute totals from a list of transactions in memory.
/// The repository computes the same figures with SQL aggregation.
/// Sums saturate at `Amount::MAX`.
pub fn compute_totals(transactions: &[Transaction]) -> LedgerTotals {
    transactions
        .iter()
        .fold(LedgerTotals::default(), |mut totals, tx| {
            match tx.direction {
                Direction::Inflow => totals.inflow = totals.inflow.saturating_add(tx.amount),
                Direction::Outflow => totals.outflow = totals.outflow.saturating_add(tx.amount),
            }
            totals
        })
}

/// Compute the balance directly from a list of transactions.
pub fn compute_balance(transactions: &[Transaction]) -> Amount {
    transactions
        .iter()
        .map(Transaction::signed_amount)
        .fold(0, Amount::saturating_add)
}

/// Returns true if ids are strictly increasing in the given order.
pub fn ids_strictly_increasing(transactions: &[Transaction]) -> bool {
    transactions.windows(2).all(|w| w[0].id < w[1].id)
}

/// Ids of transactions carrying a negative amount. Empty for a healthy ledger.
pub fn negative_amounts(transactions: &[Transaction]) -> Vec<TransactionId> {
    transactions
        .iter()
        .filter(|tx| tx.amount < 0)
        .map(|tx| tx.id)
        .collect()
}
