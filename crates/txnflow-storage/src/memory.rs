//! In-memory storage backend.
//!
//! Keeps transactions and audit events in RAM behind a single mutex, which
//! also gives each status change the same all-or-nothing behavior the SQL
//! backend gets from a storage transaction. Useful for tests and local runs.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

use txnflow_core::{
    IngestError, IngestionEvent, NormalizedFields, QueuedTransaction, TransactionRecord, TxStatus,
};

use crate::{transition_reason, TransactionStore, SUBMIT_REASON};

#[derive(Default)]
struct Inner {
    transactions: HashMap<i64, TransactionRecord>,
    /// (hash, chain_id) → transaction id, for idempotent submission.
    by_key: HashMap<(String, u64), i64>,
    events: Vec<IngestionEvent>,
    next_tx_id: i64,
    next_event_id: i64,
}

impl Inner {
    fn push_event(
        &mut self,
        transaction_id: i64,
        previous_status: Option<TxStatus>,
        new_status: TxStatus,
        reason: String,
    ) {
        self.next_event_id += 1;
        self.events.push(IngestionEvent {
            id: self.next_event_id,
            transaction_id,
            previous_status,
            new_status,
            reason,
            created_at: Utc::now(),
        });
    }
}

/// In-memory transaction store.
///
/// All data is lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn submit(
        &self,
        tx_hash: &str,
        chain_id: u64,
    ) -> Result<TransactionRecord, IngestError> {
        let mut inner = self.inner.lock().unwrap();

        let key = (tx_hash.to_string(), chain_id);
        if let Some(id) = inner.by_key.get(&key) {
            return Ok(inner.transactions[id].clone());
        }

        inner.next_tx_id += 1;
        let id = inner.next_tx_id;
        let now = Utc::now();
        let record = TransactionRecord {
            id,
            transaction_hash: tx_hash.to_string(),
            chain_id,
            status: TxStatus::Received,
            from_address: None,
            to_address: None,
            value: None,
            block_number: None,
            gas_used: None,
            error_reason: None,
            created_at: now,
            updated_at: now,
        };
        inner.by_key.insert(key, id);
        inner.transactions.insert(id, record.clone());
        inner.push_event(id, None, TxStatus::Received, SUBMIT_REASON.into());

        Ok(record)
    }

    async fn fetch_received(&self, limit: u32) -> Result<Vec<QueuedTransaction>, IngestError> {
        let inner = self.inner.lock().unwrap();

        let mut received: Vec<&TransactionRecord> = inner
            .transactions
            .values()
            .filter(|t| t.status == TxStatus::Received)
            .collect();
        // Oldest-created first; id breaks same-instant ties deterministically.
        received.sort_by_key(|t| (t.created_at, t.id));

        Ok(received
            .into_iter()
            .take(limit as usize)
            .map(|t| QueuedTransaction {
                id: t.id,
                transaction_hash: t.transaction_hash.clone(),
                chain_id: t.chain_id,
            })
            .collect())
    }

    async fn get(&self, id: i64) -> Result<Option<TransactionRecord>, IngestError> {
        Ok(self.inner.lock().unwrap().transactions.get(&id).cloned())
    }

    async fn get_by_hash(
        &self,
        tx_hash: &str,
        chain_id: u64,
    ) -> Result<Option<TransactionRecord>, IngestError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .by_key
            .get(&(tx_hash.to_string(), chain_id))
            .and_then(|id| inner.transactions.get(id))
            .cloned())
    }

    async fn transition(
        &self,
        id: i64,
        new_status: TxStatus,
        error_reason: Option<&str>,
    ) -> Result<(), IngestError> {
        let mut inner = self.inner.lock().unwrap();

        let previous = inner
            .transactions
            .get(&id)
            .map(|t| t.status)
            .ok_or_else(|| IngestError::Storage(format!("transaction {id} not found")))?;
        previous.check_transition(new_status)?;

        let record = inner.transactions.get_mut(&id).unwrap();
        record.status = new_status;
        record.error_reason = error_reason.map(str::to_string);
        record.updated_at = Utc::now();

        let reason = error_reason
            .map(str::to_string)
            .unwrap_or_else(|| transition_reason(previous, new_status));
        inner.push_event(id, Some(previous), new_status, reason);

        Ok(())
    }

    async fn apply_normalized(
        &self,
        id: i64,
        fields: &NormalizedFields,
    ) -> Result<(), IngestError> {
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .transactions
            .get_mut(&id)
            .ok_or_else(|| IngestError::Storage(format!("transaction {id} not found")))?;

        record.from_address = fields.from_address.clone();
        record.to_address = fields.to_address.clone();
        record.value = fields.value.clone();
        record.block_number = fields.block_number;
        record.gas_used = fields.gas_used;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn list(
        &self,
        status: Option<TxStatus>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TransactionRecord>, IngestError> {
        let inner = self.inner.lock().unwrap();

        let mut records: Vec<&TransactionRecord> = inner
            .transactions
            .values()
            .filter(|t| status.map_or(true, |s| t.status == s))
            .collect();
        // Newest submissions first; id breaks same-instant ties.
        records.sort_by_key(|t| std::cmp::Reverse((t.created_at, t.id)));

        Ok(records
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn events_for(&self, transaction_id: i64) -> Result<Vec<IngestionEvent>, IngestError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .events
            .iter()
            .filter(|e| e.transaction_id == transaction_id)
            .cloned()
            .collect())
    }

    async fn status_counts(&self) -> Result<HashMap<TxStatus, u64>, IngestError> {
        let inner = self.inner.lock().unwrap();
        let mut counts = HashMap::new();
        for t in inner.transactions.values() {
            *counts.entry(t.status).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn submit_is_idempotent() {
        let store = MemoryStore::new();

        let first = store.submit("0xabc", 1).await.unwrap();
        let second = store.submit("0xabc", 1).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.status, TxStatus::Received);
        // Only the first insert records an audit event
        assert_eq!(store.events_for(first.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn same_hash_on_other_chain_is_a_new_row() {
        let store = MemoryStore::new();
        let eth = store.submit("0xabc", 1).await.unwrap();
        let poly = store.submit("0xabc", 137).await.unwrap();
        assert_ne!(eth.id, poly.id);
    }

    #[tokio::test]
    async fn fetch_received_honors_limit_and_order() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.submit(&format!("0x{i}"), 1).await.unwrap();
        }

        let batch = store.fetch_received(3).await.unwrap();
        assert_eq!(batch.len(), 3);
        // Oldest submissions first
        assert_eq!(batch[0].transaction_hash, "0x0");
        assert_eq!(batch[2].transaction_hash, "0x2");
    }

    #[tokio::test]
    async fn fetch_received_skips_claimed_items() {
        let store = MemoryStore::new();
        let a = store.submit("0xa", 1).await.unwrap();
        store.submit("0xb", 1).await.unwrap();

        store.transition(a.id, TxStatus::Fetching, None).await.unwrap();

        let batch = store.fetch_received(10).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].transaction_hash, "0xb");
    }

    #[tokio::test]
    async fn transition_appends_one_event() {
        let store = MemoryStore::new();
        let tx = store.submit("0xabc", 1).await.unwrap();

        store.transition(tx.id, TxStatus::Fetching, None).await.unwrap();
        store
            .transition(tx.id, TxStatus::Error, Some("unsupported chain id: 999"))
            .await
            .unwrap();

        let record = store.get(tx.id).await.unwrap().unwrap();
        assert_eq!(record.status, TxStatus::Error);
        assert_eq!(record.error_reason.as_deref(), Some("unsupported chain id: 999"));

        let events = store.events_for(tx.id).await.unwrap();
        assert_eq!(events.len(), 3); // submission + two transitions
        assert_eq!(events[1].previous_status, Some(TxStatus::Received));
        assert_eq!(events[1].new_status, TxStatus::Fetching);
        assert_eq!(events[2].reason, "unsupported chain id: 999");
    }

    #[tokio::test]
    async fn illegal_transition_writes_nothing() {
        let store = MemoryStore::new();
        let tx = store.submit("0xabc", 1).await.unwrap();

        let err = store
            .transition(tx.id, TxStatus::Confirmed, None)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::InvalidTransition { .. }));

        let record = store.get(tx.id).await.unwrap().unwrap();
        assert_eq!(record.status, TxStatus::Received);
        assert_eq!(store.events_for(tx.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn normalized_fields_roundtrip() {
        let store = MemoryStore::new();
        let tx = store.submit("0xabc", 1).await.unwrap();

        let fields = NormalizedFields {
            from_address: Some("0x1111".into()),
            to_address: Some("0x2222".into()),
            value: Some("1500000000000000000".into()),
            block_number: Some(19_500_000),
            gas_used: Some(21_000),
        };
        store.apply_normalized(tx.id, &fields).await.unwrap();

        let record = store.get(tx.id).await.unwrap().unwrap();
        assert_eq!(record.value.as_deref(), Some("1500000000000000000"));
        assert_eq!(record.gas_used, Some(21_000));
    }

    #[tokio::test]
    async fn list_filters_by_status_and_paginates() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.submit(&format!("0x{i}"), 1).await.unwrap();
        }
        let newest = store.submit("0x5", 1).await.unwrap();
        store.transition(newest.id, TxStatus::Fetching, None).await.unwrap();

        // Newest first, fetching row excluded
        let received = store.list(Some(TxStatus::Received), 100, 0).await.unwrap();
        assert_eq!(received.len(), 5);
        assert_eq!(received[0].transaction_hash, "0x4");

        let page = store.list(None, 2, 1).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].transaction_hash, "0x4");
        assert_eq!(page[1].transaction_hash, "0x3");

        assert!(store.list(Some(TxStatus::Error), 100, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_counts_groups_rows() {
        let store = MemoryStore::new();
        let a = store.submit("0xa", 1).await.unwrap();
        store.submit("0xb", 1).await.unwrap();
        store.transition(a.id, TxStatus::Fetching, None).await.unwrap();

        let counts = store.status_counts().await.unwrap();
        assert_eq!(counts[&TxStatus::Received], 1);
        assert_eq!(counts[&TxStatus::Fetching], 1);
    }
}
