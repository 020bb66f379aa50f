use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{
    Amount, Category, Classification, Direction, LedgerTotals, Transaction, TransactionId,
    classify, compute_balance, compute_totals, ids_strictly_increasing, negative_amounts,
};
use crate::storage::Repository;

use super::AppError;

/// Application service providing high-level operations for the ledger.
/// This is the primary interface for any client (CLI, chat bot, exporters).
pub struct LedgerService {
    repo: Repository,
    /// Held across the total check and the insert of `record`
    write_lock: Mutex<()>,
}

/// Result of recording a free-text message
#[derive(Debug, Clone)]
pub struct RecordResult {
    pub id: TransactionId,
    pub classification: Classification,
    pub date: NaiveDate,
}

/// Outcome of an integrity check
#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub transaction_count: i64,
    /// Totals computed by SQL aggregation
    pub stored_totals: LedgerTotals,
    /// Totals folded in memory over the full snapshot
    pub computed_totals: LedgerTotals,
    pub issues: Vec<String>,
}

impl IntegrityReport {
    pub fn is_consistent(&self) -> bool {
        self.issues.is_empty()
    }
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            write_lock: Mutex::new(()),
        }
    }

    /// Open the database at the given path, creating file and table if needed.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Release the storage handle.
    pub async fn close(&self) {
        self.repo.close().await;
    }

    // ========================
    // Write path
    // ========================

    /// Append a transaction to the ledger.
    /// Storage faults are returned as-is; nothing is retried.
    ///
    /// An amount that would push its direction's total past `Amount::MAX`
    /// is rejected with `InvalidAmount`, so the aggregates stay readable.
    pub async fn record(
        &self,
        direction: Direction,
        category: Category,
        amount: Amount,
        date: NaiveDate,
    ) -> Result<TransactionId, AppError> {
        if amount < 0 {
            return Err(AppError::InvalidAmount(amount));
        }

        let _guard = self.write_lock.lock().await;

        let total = self.repo.sum_by_direction(direction).await?;
        if total.checked_add(amount).is_none() {
            warn!(%direction, total, amount, "amount would overflow the running total");
            return Err(AppError::InvalidAmount(amount));
        }

        let id = self
            .repo
            .save_transaction(direction, category, amount, date)
            .await?;

        info!(id, %direction, %category, amount, %date, "transaction recorded");
        Ok(id)
    }

    /// Classify a free-text message and record it under the given date.
    pub async fn record_message(
        &self,
        text: &str,
        date: NaiveDate,
    ) -> Result<RecordResult, AppError> {
        let classification = classify(text);
        debug!(?classification, "message classified");

        let id = self
            .record(
                classification.direction,
                classification.category,
                classification.amount,
                date,
            )
            .await?;

        Ok(RecordResult {
            id,
            classification,
            date,
        })
    }

    // ========================
    // Read path
    // ========================

    /// Sum of all inflows. Zero on an empty ledger.
    pub async fn total_inflow(&self) -> Result<Amount, AppError> {
        Ok(self.repo.sum_by_direction(Direction::Inflow).await?)
    }

    /// Sum of all outflows. Zero on an empty ledger.
    pub async fn total_outflow(&self) -> Result<Amount, AppError> {
        Ok(self.repo.sum_by_direction(Direction::Outflow).await?)
    }

    /// Inflow minus outflow. May be negative.
    pub async fn balance(&self) -> Result<Amount, AppError> {
        Ok(self.totals().await?.balance())
    }

    /// Both totals, read in one query so they are consistent with each other.
    pub async fn totals(&self) -> Result<LedgerTotals, AppError> {
        Ok(self.repo.compute_totals().await?)
    }

    /// Snapshot of every transaction, ordered by id.
    pub async fn all_records(&self) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_transactions().await?)
    }

    /// The most recent `limit` transactions, ordered by id.
    pub async fn recent_records(&self, limit: usize) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_recent_transactions(limit).await?)
    }

    /// Get a single transaction by id.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, AppError> {
        Ok(self.repo.get_transaction(id).await?)
    }

    /// Number of stored transactions.
    pub async fn count(&self) -> Result<i64, AppError> {
        Ok(self.repo.count_transactions().await?)
    }

    // ========================
    // Integrity
    // ========================

    /// Cross-check SQL aggregates against an in-memory fold over the snapshot.
    pub async fn check_integrity(&self) -> Result<IntegrityReport, AppError> {
        let stats = self.repo.get_integrity_stats().await?;
        let stored_totals = self.repo.compute_totals().await?;
        let records = self.repo.list_transactions().await?;
        let computed_totals = compute_totals(&records);
        let computed_balance = compute_balance(&records);

        let mut issues = Vec::new();

        if stats.transaction_count != records.len() as i64 {
            issues.push(format!(
                "Row count {} does not match snapshot length {}",
                stats.transaction_count,
                records.len()
            ));
        }
        if !ids_strictly_increasing(&records) {
            issues.push("Transaction ids are not strictly increasing".to_string());
        }
        if let Some(max_id) = stats.max_id {
            if max_id < stats.transaction_count {
                issues.push(format!(
                    "Highest id {} is lower than the row count {}",
                    max_id, stats.transaction_count
                ));
            }
        }
        if stats.invalid_amounts > 0 {
            issues.push(format!(
                "{} transaction(s) with negative amount: {:?}",
                stats.invalid_amounts,
                negative_amounts(&records)
            ));
        }
        if stats.invalid_directions > 0 {
            issues.push(format!(
                "{} transaction(s) with unknown direction",
                stats.invalid_directions
            ));
        }
        if stored_totals != computed_totals {
            issues.push(format!(
                "Stored totals {:?} differ from computed totals {:?}",
                stored_totals, computed_totals
            ));
        }
        if stored_totals.balance() != computed_balance {
            issues.push(format!(
                "Stored balance {} differs from signed sum {}",
                stored_totals.balance(),
                computed_balance
            ));
        }

        Ok(IntegrityReport {
            transaction_count: stats.transaction_count,
            stored_totals,
            computed_totals,
            issues,
        })
    }
}
