//! Shared record types for the ingestion pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::TxStatus;

// ─── TransactionRecord ────────────────────────────────────────────────────────

/// A status-tracked transaction, uniquely identified by (hash, chain_id).
///
/// The worker mutates `status` and the normalized fields; the identity and
/// hash are written once at submission and never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Opaque store-assigned identity.
    pub id: i64,
    /// On-chain transaction hash (`0x…`).
    pub transaction_hash: String,
    /// Numeric chain id (1 = Ethereum mainnet).
    pub chain_id: u64,
    pub status: TxStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    /// Wei amount as a decimal string — values routinely exceed 64 bits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ─── QueuedTransaction ────────────────────────────────────────────────────────

/// The slice of a transaction the poll loop needs to process it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedTransaction {
    pub id: i64,
    pub transaction_hash: String,
    pub chain_id: u64,
}

// ─── NormalizedFields ─────────────────────────────────────────────────────────

/// Chain data after hex → decimal/integer normalization.
///
/// Fields that failed to decode stay `None`; partial data is preferred to
/// losing the item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFields {
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub value: Option<String>,
    pub block_number: Option<i64>,
    pub gas_used: Option<i64>,
}

// ─── IngestionEvent ───────────────────────────────────────────────────────────

/// Append-only audit record of one status transition.
///
/// Created exactly once per transition, never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionEvent {
    pub id: i64,
    pub transaction_id: i64,
    /// `None` for the submission event (no prior status).
    pub previous_status: Option<TxStatus>,
    pub new_status: TxStatus,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}
