use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::domain::{Amount, Category, Direction, LedgerTotals, Transaction, TransactionId};

use super::MIGRATION_001_INITIAL;

/// Storage format for transaction dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Statistics for ledger integrity verification.
#[derive(Debug, Clone)]
pub struct IntegrityStats {
    pub transaction_count: i64,
    pub max_id: Option<TransactionId>,
    pub invalid_amounts: i64,
    pub invalid_directions: i64,
}

/// Repository for persisting and querying transactions.
///
/// The pool holds a single connection: every read and append is serialized
/// on one SQLite handle, which is all the single-writer ledger needs.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    /// Use `?mode=rwc` in the URL to create the file if it doesn't exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Safe to run on every startup.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Close the underlying pool, waiting for the connection to be released.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ========================
    // Transaction operations
    // ========================

    /// Append a transaction and return the id SQLite assigned to it.
    pub async fn save_transaction(
        &self,
        direction: Direction,
        category: Category,
        amount: Amount,
        date: NaiveDate,
    ) -> Result<TransactionId> {
        let result = sqlx::query(
            r#"
            INSERT INTO transactions (direction, category, amount, date)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(direction.as_str())
        .bind(category.as_str())
        .bind(amount)
        .bind(date.format(DATE_FORMAT).to_string())
        .execute(&self.pool)
        .await
        .context("Failed to save transaction")?;

        Ok(result.last_insert_rowid())
    }

    /// Get a transaction by id.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let row = sqlx::query(
            r#"
            SELECT id, direction, category, amount, date
            FROM transactions
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch transaction")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_transaction(&row)?)),
            None => Ok(None),
        }
    }

    /// List all transactions, ordered by id.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, direction, category, amount, date
            FROM transactions
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// List the most recent `limit` transactions, still ordered by id ascending.
    pub async fn list_recent_transactions(&self, limit: usize) -> Result<Vec<Transaction>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            r#"
            SELECT id, direction, category, amount, date FROM (
                SELECT id, direction, category, amount, date
                FROM transactions
                ORDER BY id DESC
                LIMIT ?
            )
            ORDER BY id
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list recent transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Count stored transactions.
    pub async fn count_transactions(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM transactions")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count transactions")?;
        Ok(row.get("count"))
    }

    /// Sum amounts for one direction. An empty match sums to zero.
    pub async fn sum_by_direction(&self, direction: Direction) -> Result<Amount> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount), 0) as total
            FROM transactions
            WHERE direction = ?
            "#,
        )
        .bind(direction.as_str())
        .fetch_one(&self.pool)
        .await
        .context("Failed to sum transactions")?;

        Ok(row.get("total"))
    }

    /// Compute inflow and outflow totals in a single query.
    pub async fn compute_totals(&self) -> Result<LedgerTotals> {
        let row = sqlx::query(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN direction = 'inflow' THEN amount ELSE 0 END), 0) as inflow,
                COALESCE(SUM(CASE WHEN direction = 'outflow' THEN amount ELSE 0 END), 0) as outflow
            FROM transactions
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to compute totals")?;

        Ok(LedgerTotals {
            inflow: row.get("inflow"),
            outflow: row.get("outflow"),
        })
    }

    /// Get statistics for integrity checking.
    pub async fn get_integrity_stats(&self) -> Result<IntegrityStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) as count,
                MAX(id) as max_id,
                COALESCE(SUM(CASE WHEN amount < 0 THEN 1 ELSE 0 END), 0) as invalid_amounts,
                COALESCE(SUM(CASE WHEN direction NOT IN ('inflow', 'outflow') THEN 1 ELSE 0 END), 0) as invalid_directions
            FROM transactions
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to get integrity stats")?;

        Ok(IntegrityStats {
            transaction_count: row.get("count"),
            max_id: row.get("max_id"),
            invalid_amounts: row.get("invalid_amounts"),
            invalid_directions: row.get("invalid_directions"),
        })
    }

    fn row_to_transaction(row: &SqliteRow) -> Result<Transaction> {
        let direction_str: String = row.get("direction");
        let category_str: String = row.get("category");
        let date_str: String = row.get("date");

        Ok(Transaction {
            id: row.get("id"),
            direction: direction_str
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid direction in store: {}", e))?,
            category: category_str
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid category in store: {}", e))?,
            amount: row.get("amount"),
            date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .with_context(|| format!("Invalid transaction date: {}", date_str))?,
        })
    }
}
