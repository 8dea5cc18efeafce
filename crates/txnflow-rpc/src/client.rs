//! HTTP JSON-RPC client backed by `reqwest`.
//!
//! Each call is a single best-effort attempt with a fixed per-call timeout.
//! There is no retry or backoff at this layer.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use txnflow_core::{ChainConfig, IngestError};

use crate::types::{EthReceipt, EthTransaction};
use crate::wire::{JsonRpcRequest, JsonRpcResponse};

/// Default per-call timeout.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Stateless JSON-RPC client bound to a single chain endpoint.
pub struct EvmRpcClient {
    url: String,
    http: reqwest::Client,
}

impl EvmRpcClient {
    /// Create a client for the given endpoint with the default 10 s timeout.
    pub fn connect(url: impl Into<String>) -> Result<Self, IngestError> {
        Self::connect_with_timeout(url, DEFAULT_RPC_TIMEOUT)
    }

    pub fn connect_with_timeout(
        url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, IngestError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IngestError::Transport(e.to_string()))?;

        Ok(Self { url: url.into(), http })
    }

    /// Fetch a transaction by hash.
    ///
    /// A `null` result means the node does not know the hash — `NotFound`.
    pub async fn get_transaction_by_hash(
        &self,
        tx_hash: &str,
    ) -> Result<EthTransaction, IngestError> {
        let result = self
            .call("eth_getTransactionByHash", vec![Value::String(tx_hash.into())])
            .await?;

        if result.is_null() {
            return Err(IngestError::NotFound("transaction not found".into()));
        }

        serde_json::from_value(result)
            .map_err(|e| IngestError::Transport(format!("failed to parse transaction: {e}")))
    }

    /// Fetch a transaction receipt.
    ///
    /// A `null` result is expected for pending transactions and surfaces as
    /// `NotFound`; callers decide whether that is fatal.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<EthReceipt, IngestError> {
        let result = self
            .call("eth_getTransactionReceipt", vec![Value::String(tx_hash.into())])
            .await?;

        if result.is_null() {
            return Err(IngestError::NotFound(
                "receipt not found (transaction may be pending)".into(),
            ));
        }

        serde_json::from_value(result)
            .map_err(|e| IngestError::Transport(format!("failed to parse receipt: {e}")))
    }

    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, IngestError> {
        let request = JsonRpcRequest::new(1, method, params);

        let resp = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| IngestError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(IngestError::Transport(format!("HTTP {status}: {body}")));
        }

        let response: JsonRpcResponse = resp
            .json()
            .await
            .map_err(|e| IngestError::Transport(e.to_string()))?;

        tracing::trace!(method, url = %self.url, "rpc call complete");
        response.into_result()
    }
}

// ─── ChainClient seam ─────────────────────────────────────────────────────────

/// The worker's fetch seam — resolves hashes against a chain's node.
///
/// The production impl builds an [`EvmRpcClient`] per chain config; tests
/// substitute canned responses.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn fetch_transaction(
        &self,
        chain: &ChainConfig,
        tx_hash: &str,
    ) -> Result<EthTransaction, IngestError>;

    /// `Ok(None)` when the receipt is absent — the transaction may be pending.
    async fn fetch_receipt(
        &self,
        chain: &ChainConfig,
        tx_hash: &str,
    ) -> Result<Option<EthReceipt>, IngestError>;
}

#[async_trait]
impl<T: ChainClient + ?Sized> ChainClient for std::sync::Arc<T> {
    async fn fetch_transaction(
        &self,
        chain: &ChainConfig,
        tx_hash: &str,
    ) -> Result<EthTransaction, IngestError> {
        (**self).fetch_transaction(chain, tx_hash).await
    }

    async fn fetch_receipt(
        &self,
        chain: &ChainConfig,
        tx_hash: &str,
    ) -> Result<Option<EthReceipt>, IngestError> {
        (**self).fetch_receipt(chain, tx_hash).await
    }
}

/// Production [`ChainClient`] over HTTP JSON-RPC.
pub struct HttpChainClient {
    timeout: Duration,
}

impl HttpChainClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpChainClient {
    fn default() -> Self {
        Self::new(DEFAULT_RPC_TIMEOUT)
    }
}

#[async_trait]
impl ChainClient for HttpChainClient {
    async fn fetch_transaction(
        &self,
        chain: &ChainConfig,
        tx_hash: &str,
    ) -> Result<EthTransaction, IngestError> {
        let client = EvmRpcClient::connect_with_timeout(&chain.rpc_url, self.timeout)?;
        client.get_transaction_by_hash(tx_hash).await
    }

    async fn fetch_receipt(
        &self,
        chain: &ChainConfig,
        tx_hash: &str,
    ) -> Result<Option<EthReceipt>, IngestError> {
        let client = EvmRpcClient::connect_with_timeout(&chain.rpc_url, self.timeout)?;
        match client.get_transaction_receipt(tx_hash).await {
            Ok(receipt) => Ok(Some(receipt)),
            Err(IngestError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_for_plain_url() {
        assert!(EvmRpcClient::connect("http://localhost:8545").is_ok());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        // Reserved TEST-NET-1 address; nothing listens there.
        let client =
            EvmRpcClient::connect_with_timeout("http://192.0.2.1:8545", Duration::from_millis(200))
                .unwrap();
        let err = client.get_transaction_by_hash("0xabc").await.unwrap_err();
        assert!(matches!(err, IngestError::Transport(_)));
    }
}
