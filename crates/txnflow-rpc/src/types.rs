//! Typed envelopes for `eth_getTransactionByHash` / `eth_getTransactionReceipt`.

use serde::{Deserialize, Serialize};

/// A transaction as returned by `eth_getTransactionByHash`.
///
/// Integer fields are chain-native hex strings; normalization happens in the
/// worker, not here. Block fields are `null` while the transaction is pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EthTransaction {
    pub hash: String,
    pub from: String,
    /// `null` for contract-creation transactions.
    pub to: Option<String>,
    pub value: String,
    pub gas: String,
    #[serde(rename = "gasPrice")]
    pub gas_price: Option<String>,
    pub input: String,
    pub nonce: String,
    #[serde(rename = "blockHash")]
    pub block_hash: Option<String>,
    #[serde(rename = "blockNumber")]
    pub block_number: Option<String>,
    #[serde(rename = "transactionIndex")]
    pub transaction_index: Option<String>,
}

/// A receipt as returned by `eth_getTransactionReceipt`.
///
/// Absent entirely (`null` result) while the transaction is unmined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EthReceipt {
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
    #[serde(rename = "blockHash")]
    pub block_hash: String,
    #[serde(rename = "blockNumber")]
    pub block_number: String,
    #[serde(rename = "gasUsed")]
    pub gas_used: String,
    #[serde(rename = "cumulativeGasUsed")]
    pub cumulative_gas_used: String,
    /// `"0x1"` on success, `"0x0"` on revert.
    pub status: String,
}

impl EthReceipt {
    /// Returns `true` if the transaction executed successfully.
    pub fn succeeded(&self) -> bool {
        self.status == "0x1"
    }
}
