//! txnflow-storage — the Store collaborator for the ingestion pipeline.
//!
//! Backends:
//! - [`memory`] — in-memory (dev/testing, no persistence)
//! - [`sqlite`] — SQLite via `sqlx` (feature: `sqlite`)
//!
//! Every status change runs as one atomic unit: read current status, write
//! the new status + reason, append one audit event. A transaction's status
//! and its most recent audit event are never observably inconsistent.

use async_trait::async_trait;
use std::collections::HashMap;

use txnflow_core::{
    IngestError, IngestionEvent, NormalizedFields, QueuedTransaction, TransactionRecord, TxStatus,
};

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

/// Relational interface the worker (and the submission API) persists through.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Idempotent submission: insert a `RECEIVED` row for (hash, chain_id),
    /// or return the existing row unchanged. Records a "transaction
    /// registered" audit event on first insert only.
    async fn submit(&self, tx_hash: &str, chain_id: u64)
        -> Result<TransactionRecord, IngestError>;

    /// Up to `limit` transactions in state `RECEIVED`, oldest-created first.
    async fn fetch_received(&self, limit: u32) -> Result<Vec<QueuedTransaction>, IngestError>;

    async fn get(&self, id: i64) -> Result<Option<TransactionRecord>, IngestError>;

    async fn get_by_hash(
        &self,
        tx_hash: &str,
        chain_id: u64,
    ) -> Result<Option<TransactionRecord>, IngestError>;

    /// Atomically move a transaction to `new_status` and append one audit
    /// event. `error_reason` populates both the row's `error_reason` column
    /// and the event reason; when absent, the event carries a generated
    /// "status changed" reason and the column is cleared.
    ///
    /// Fails with [`IngestError::InvalidTransition`] when the state machine
    /// forbids the move; nothing is written in that case.
    async fn transition(
        &self,
        id: i64,
        new_status: TxStatus,
        error_reason: Option<&str>,
    ) -> Result<(), IngestError>;

    /// Write the normalized chain fields for a transaction.
    async fn apply_normalized(
        &self,
        id: i64,
        fields: &NormalizedFields,
    ) -> Result<(), IngestError>;

    /// Page through transactions, newest-created first, optionally filtered
    /// by status.
    async fn list(
        &self,
        status: Option<TxStatus>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TransactionRecord>, IngestError>;

    /// The append-only audit history for a transaction, oldest first.
    async fn events_for(&self, transaction_id: i64) -> Result<Vec<IngestionEvent>, IngestError>;

    /// Transaction counts grouped by status, for monitoring.
    async fn status_counts(&self) -> Result<HashMap<TxStatus, u64>, IngestError>;
}

/// Event reason generated for transitions without an explicit one.
pub(crate) fn transition_reason(previous: TxStatus, next: TxStatus) -> String {
    format!("status changed by worker: {previous} -> {next}")
}

/// Event reason recorded when a submission first lands.
pub(crate) const SUBMIT_REASON: &str = "transaction registered";
