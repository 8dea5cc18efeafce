//! SQLite storage backend for TxnFlow.
//!
//! Persists transactions and their audit trail to a single SQLite file.
//! Uses `sqlx` with WAL mode for concurrent read performance. Every status
//! change runs inside one SQL transaction so the status column and its audit
//! event commit together.
//!
//! # Usage
//! ```rust,no_run
//! use txnflow_storage::sqlite::SqliteStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // File-backed (persistent)
//! let store = SqliteStore::open("./txnflow.db").await?;
//!
//! // In-memory (tests / ephemeral)
//! let store = SqliteStore::in_memory().await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use txnflow_core::{
    IngestError, IngestionEvent, NormalizedFields, QueuedTransaction, TransactionRecord, TxStatus,
};

use crate::{transition_reason, TransactionStore, SUBMIT_REASON};

/// SQLite-backed transaction store.
pub struct SqliteStore {
    pool: SqlitePool,
}

fn storage_err(e: impl std::fmt::Display) -> IngestError {
    IngestError::Storage(e.to_string())
}

impl SqliteStore {
    /// Open (or create) a SQLite database at `path`.
    ///
    /// The path may be a plain file path (`"./txnflow.db"`) or a full SQLite
    /// URL (`"sqlite:./txnflow.db?mode=rwc"`).
    pub async fn open(path: &str) -> Result<Self, IngestError> {
        let url = if path.starts_with("sqlite:") {
            path.to_string()
        } else {
            format!("sqlite:{path}?mode=rwc")
        };

        let pool = SqlitePool::connect(&url).await.map_err(storage_err)?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Open an in-memory SQLite database.
    ///
    /// All data is lost when the pool is dropped. Ideal for tests.
    pub async fn in_memory() -> Result<Self, IngestError> {
        // Each connection gets its own private :memory: database, so the
        // pool must stay on a single connection.
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(storage_err)?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Create tables and enable WAL mode.
    async fn init_schema(&self) -> Result<(), IngestError> {
        sqlx::query("PRAGMA journal_mode=WAL;")
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS transactions (
                id               INTEGER PRIMARY KEY AUTOINCREMENT,
                transaction_hash TEXT    NOT NULL,
                chain_id         INTEGER NOT NULL,
                status           TEXT    NOT NULL,
                from_address     TEXT,
                to_address       TEXT,
                value            TEXT,
                block_number     INTEGER,
                gas_used         INTEGER,
                error_reason     TEXT,
                created_at       TEXT    NOT NULL,
                updated_at       TEXT    NOT NULL,
                UNIQUE (transaction_hash, chain_id)
            );",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS ingestion_events (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                transaction_id  INTEGER NOT NULL REFERENCES transactions (id),
                previous_status TEXT,
                new_status      TEXT    NOT NULL,
                reason          TEXT    NOT NULL,
                created_at      TEXT    NOT NULL
            );",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        // Covers the poll loop's "status = RECEIVED oldest first" scan
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_transactions_status_created
             ON transactions (status, created_at);",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_events_transaction
             ON ingestion_events (transaction_id);",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }
}

fn record_from_row(row: &SqliteRow) -> Result<TransactionRecord, IngestError> {
    let status: String = row.get("status");
    Ok(TransactionRecord {
        id: row.get("id"),
        transaction_hash: row.get("transaction_hash"),
        chain_id: row.get::<i64, _>("chain_id") as u64,
        status: status.parse()?,
        from_address: row.get("from_address"),
        to_address: row.get("to_address"),
        value: row.get("value"),
        block_number: row.get("block_number"),
        gas_used: row.get("gas_used"),
        error_reason: row.get("error_reason"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    })
}

fn event_from_row(row: &SqliteRow) -> Result<IngestionEvent, IngestError> {
    let previous: Option<String> = row.get("previous_status");
    let new_status: String = row.get("new_status");
    Ok(IngestionEvent {
        id: row.get("id"),
        transaction_id: row.get("transaction_id"),
        previous_status: previous.map(|s| s.parse()).transpose()?,
        new_status: new_status.parse()?,
        reason: row.get("reason"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    })
}

#[async_trait]
impl TransactionStore for SqliteStore {
    async fn submit(
        &self,
        tx_hash: &str,
        chain_id: u64,
    ) -> Result<TransactionRecord, IngestError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        let now = Utc::now();

        let inserted = sqlx::query(
            "INSERT INTO transactions
                 (transaction_hash, chain_id, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (transaction_hash, chain_id) DO NOTHING",
        )
        .bind(tx_hash)
        .bind(chain_id as i64)
        .bind(TxStatus::Received.as_str())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        if inserted.rows_affected() == 1 {
            let id = inserted.last_insert_rowid();
            sqlx::query(
                "INSERT INTO ingestion_events
                     (transaction_id, previous_status, new_status, reason, created_at)
                 VALUES (?, NULL, ?, ?, ?)",
            )
            .bind(id)
            .bind(TxStatus::Received.as_str())
            .bind(SUBMIT_REASON)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

            debug!(id, tx_hash, chain_id, "transaction registered");
        }

        tx.commit().await.map_err(storage_err)?;

        self.get_by_hash(tx_hash, chain_id)
            .await?
            .ok_or_else(|| IngestError::Storage(format!("submitted row vanished: {tx_hash}")))
    }

    async fn fetch_received(&self, limit: u32) -> Result<Vec<QueuedTransaction>, IngestError> {
        let rows = sqlx::query(
            "SELECT id, transaction_hash, chain_id
             FROM transactions
             WHERE status = ?
             ORDER BY created_at ASC, id ASC
             LIMIT ?",
        )
        .bind(TxStatus::Received.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(rows
            .iter()
            .map(|row| QueuedTransaction {
                id: row.get("id"),
                transaction_hash: row.get("transaction_hash"),
                chain_id: row.get::<i64, _>("chain_id") as u64,
            })
            .collect())
    }

    async fn get(&self, id: i64) -> Result<Option<TransactionRecord>, IngestError> {
        let row = sqlx::query("SELECT * FROM transactions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn get_by_hash(
        &self,
        tx_hash: &str,
        chain_id: u64,
    ) -> Result<Option<TransactionRecord>, IngestError> {
        let row = sqlx::query(
            "SELECT * FROM transactions WHERE transaction_hash = ? AND chain_id = ?",
        )
        .bind(tx_hash)
        .bind(chain_id as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn transition(
        &self,
        id: i64,
        new_status: TxStatus,
        error_reason: Option<&str>,
    ) -> Result<(), IngestError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let current: String = sqlx::query("SELECT status FROM transactions WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_err)?
            .map(|row| row.get("status"))
            .ok_or_else(|| IngestError::Storage(format!("transaction {id} not found")))?;

        let previous: TxStatus = current.parse()?;
        previous.check_transition(new_status)?;

        let now = Utc::now();
        sqlx::query(
            "UPDATE transactions
             SET status = ?, error_reason = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(new_status.as_str())
        .bind(error_reason)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        let reason = error_reason
            .map(str::to_string)
            .unwrap_or_else(|| transition_reason(previous, new_status));
        sqlx::query(
            "INSERT INTO ingestion_events
                 (transaction_id, previous_status, new_status, reason, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(previous.as_str())
        .bind(new_status.as_str())
        .bind(&reason)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;

        debug!(id, from = %previous, to = %new_status, "status transition");
        Ok(())
    }

    async fn apply_normalized(
        &self,
        id: i64,
        fields: &NormalizedFields,
    ) -> Result<(), IngestError> {
        sqlx::query(
            "UPDATE transactions
             SET from_address = ?, to_address = ?, value = ?,
                 block_number = ?, gas_used = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&fields.from_address)
        .bind(&fields.to_address)
        .bind(&fields.value)
        .bind(fields.block_number)
        .bind(fields.gas_used)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    async fn list(
        &self,
        status: Option<TxStatus>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TransactionRecord>, IngestError> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    "SELECT * FROM transactions
                     WHERE status = ?
                     ORDER BY created_at DESC, id DESC
                     LIMIT ? OFFSET ?",
                )
                .bind(status.as_str())
                .bind(limit as i64)
                .bind(offset as i64)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT * FROM transactions
                     ORDER BY created_at DESC, id DESC
                     LIMIT ? OFFSET ?",
                )
                .bind(limit as i64)
                .bind(offset as i64)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(storage_err)?;

        rows.iter().map(record_from_row).collect()
    }

    async fn events_for(&self, transaction_id: i64) -> Result<Vec<IngestionEvent>, IngestError> {
        let rows = sqlx::query(
            "SELECT * FROM ingestion_events WHERE transaction_id = ? ORDER BY id ASC",
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.iter().map(event_from_row).collect()
    }

    async fn status_counts(&self) -> Result<HashMap<TxStatus, u64>, IngestError> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS cnt FROM transactions GROUP BY status")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;

        let mut counts = HashMap::new();
        for row in rows {
            let status: String = row.get("status");
            counts.insert(status.parse()?, row.get::<i64, _>("cnt") as u64);
        }
        Ok(counts)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
