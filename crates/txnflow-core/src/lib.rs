//! txnflow-core — foundation for the transaction ingestion pipeline.
//!
//! # Architecture
//!
//! ```text
//! IngestWorker (txnflow-worker)
//!     ├── ChainRegistry     (chain id → RPC endpoint, seeded at startup)
//!     ├── ChainClient       (JSON-RPC fetch seam, txnflow-rpc)
//!     ├── hex codec         (chain-native hex → i64 / decimal string)
//!     └── TransactionStore  (status transitions + audit trail, txnflow-storage)
//! ```

pub mod config;
pub mod error;
pub mod hex;
pub mod registry;
pub mod status;
pub mod types;

pub use config::WorkerConfig;
pub use error::IngestError;
pub use registry::{ChainConfig, ChainFamily, ChainRegistry};
pub use status::TxStatus;
pub use types::{IngestionEvent, NormalizedFields, QueuedTransaction, TransactionRecord};
