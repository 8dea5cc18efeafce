//! Error types for the ingestion pipeline.

use thiserror::Error;

use crate::status::TxStatus;

/// Errors that can occur while ingesting a transaction.
#[derive(Debug, Error)]
pub enum IngestError {
    /// No registry entry for the requested chain id.
    #[error("unsupported chain id: {chain_id}")]
    UnsupportedChain { chain_id: u64 },

    /// HTTP/network failure reaching the node.
    #[error("RPC transport error: {0}")]
    Transport(String),

    /// JSON-RPC error object returned by the node.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node returned a `null` result.
    #[error("{0}")]
    NotFound(String),

    /// A hex field could not be decoded.
    #[error("malformed hex value: {0:?}")]
    MalformedHex(String),

    /// A status transition the state machine does not allow.
    #[error("illegal status transition: {from} -> {to}")]
    InvalidTransition { from: TxStatus, to: TxStatus },

    /// Store operation failure.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Other(String),
}

impl IngestError {
    /// Returns `true` if the error is terminal for the affected item only
    /// (captured as its `error_reason`) rather than a store-level failure.
    pub fn is_item_error(&self) -> bool {
        !matches!(self, Self::Storage(_) | Self::InvalidTransition { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_chain_names_the_chain() {
        let err = IngestError::UnsupportedChain { chain_id: 999 };
        assert!(err.to_string().contains("999"));
    }

    #[test]
    fn storage_is_not_an_item_error() {
        assert!(!IngestError::Storage("connection reset".into()).is_item_error());
        assert!(IngestError::NotFound("transaction not found".into()).is_item_error());
    }
}
