//! The ingestion poll loop.
//!
//! On each tick: select up to `batch_size` `RECEIVED` transactions, oldest
//! first, and process each sequentially:
//!
//! 1. transition to `FETCHING`
//! 2. resolve chain config via the registry
//! 3. fetch transaction + receipt (a missing receipt is tolerated)
//! 4. normalize hex fields
//! 5. persist normalized fields, transition to `CONFIRMED`
//!
//! Item failures become that item's `ERROR` reason and never abort the batch;
//! only a failure of the batch query itself aborts a tick (retried on the
//! next timer fire). The loop exits on external cancellation or an explicit
//! stop request, never mid-item.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use txnflow_core::{ChainRegistry, IngestError, QueuedTransaction, TxStatus, WorkerConfig};
use txnflow_rpc::ChainClient;
use txnflow_storage::TransactionStore;

use crate::normalize::normalize;

/// Handle for requesting a graceful stop from outside the loop.
#[derive(Clone)]
pub struct StopHandle(mpsc::Sender<()>);

impl StopHandle {
    pub async fn stop(&self) {
        let _ = self.0.send(()).await;
    }
}

/// Polls the store for `RECEIVED` transactions and drives each through the
/// status state machine.
pub struct IngestWorker<C: ChainClient> {
    store: Arc<dyn TransactionStore>,
    registry: Arc<ChainRegistry>,
    client: C,
    config: WorkerConfig,
    stop_tx: mpsc::Sender<()>,
    stop_rx: mpsc::Receiver<()>,
}

impl<C: ChainClient> IngestWorker<C> {
    pub fn new(
        store: Arc<dyn TransactionStore>,
        registry: Arc<ChainRegistry>,
        client: C,
        config: WorkerConfig,
    ) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel(1);
        Self {
            store,
            registry,
            client,
            config,
            stop_tx,
            stop_rx,
        }
    }

    /// Handle for stopping the loop. Take it before calling [`run`].
    ///
    /// [`run`]: IngestWorker::run
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.stop_tx.clone())
    }

    /// Run the poll loop until cancelled or stopped.
    ///
    /// `shutdown` is the external cancellation signal; both it and the stop
    /// handle are only observed between ticks — an in-flight item always
    /// finishes its current step.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            poll_interval_ms = self.config.poll_interval_ms,
            batch_size = self.config.batch_size,
            "worker started, polling for RECEIVED transactions"
        );

        let mut ticker = tokio::time::interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("worker stopped: cancellation signal");
                    return;
                }
                _ = self.stop_rx.recv() => {
                    info!("worker stopped: stop requested");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.process_batch().await {
                        error!(error = %e, "batch query failed, retrying next tick");
                    }
                }
            }
        }
    }

    /// One poll tick: select and process a batch. Returns the number of items
    /// that reached a terminal state this tick.
    pub async fn process_batch(&self) -> Result<usize, IngestError> {
        let batch = self.store.fetch_received(self.config.batch_size).await?;
        if batch.is_empty() {
            return Ok(0);
        }

        let mut processed = 0;
        for item in &batch {
            match self.process_item(item).await {
                Ok(()) => processed += 1,
                Err(e) => {
                    // Storage failed mid-item; leave it for the operator and move on
                    error!(
                        id = item.id,
                        hash = %item.transaction_hash,
                        error = %e,
                        "failed to process transaction"
                    );
                }
            }
        }

        info!(processed, total = batch.len(), "batch complete");
        Ok(processed)
    }

    async fn process_item(&self, item: &QueuedTransaction) -> Result<(), IngestError> {
        debug!(id = item.id, hash = %item.transaction_hash, chain = item.chain_id, "processing");

        self.store.transition(item.id, TxStatus::Fetching, None).await?;

        let chain = match self.registry.get(item.chain_id) {
            Ok(chain) => chain,
            Err(e) => return self.fail_item(item, &e).await,
        };

        let tx = match self
            .client
            .fetch_transaction(chain, &item.transaction_hash)
            .await
        {
            Ok(tx) => tx,
            Err(e) => return self.fail_item(item, &e).await,
        };

        let receipt = match self
            .client
            .fetch_receipt(chain, &item.transaction_hash)
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                // Treated like a pending transaction: proceed without gas data
                warn!(hash = %item.transaction_hash, error = %e, "receipt fetch failed");
                None
            }
        };
        if receipt.is_none() {
            debug!(hash = %item.transaction_hash, "no receipt yet, confirming without gas data");
        }

        let fields = normalize(&tx, receipt.as_ref());

        if let Err(e) = self.store.apply_normalized(item.id, &fields).await {
            return self.fail_item(item, &e).await;
        }

        self.store.transition(item.id, TxStatus::Confirmed, None).await?;
        info!(id = item.id, hash = %item.transaction_hash, "confirmed");
        Ok(())
    }

    /// Record an item-level failure as the transaction's `ERROR` state.
    ///
    /// Returns `Ok` — the error is captured in `error_reason`, the item is
    /// done from the pipeline's point of view. Only the transition write
    /// itself can still fail.
    async fn fail_item(
        &self,
        item: &QueuedTransaction,
        cause: &IngestError,
    ) -> Result<(), IngestError> {
        warn!(id = item.id, hash = %item.transaction_hash, error = %cause, "item failed");
        self.store
            .transition(item.id, TxStatus::Error, Some(&cause.to_string()))
            .await
    }
}
