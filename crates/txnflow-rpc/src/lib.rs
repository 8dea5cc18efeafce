//! txnflow-rpc — stateless JSON-RPC 2.0 client for EVM chain nodes.
//!
//! One client per endpoint, fixed per-call timeout, single best-effort
//! attempt per call. Retry policy, if any, belongs to the caller.

pub mod client;
pub mod types;
pub mod wire;

pub use client::{ChainClient, EvmRpcClient, HttpChainClient};
pub use types::{EthReceipt, EthTransaction};
pub use wire::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
