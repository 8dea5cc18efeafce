//! txnflow-worker — drives the transaction status state machine.
//!
//! One logical poller per worker: a recurring timer selects up to
//! `batch_size` transactions in state `RECEIVED` (oldest first) and walks
//! each through `FETCHING → CONFIRMED | ERROR` sequentially. At most one
//! batch is in flight at a time.

pub mod builder;
pub mod normalize;
pub mod worker;

pub use builder::WorkerBuilder;
pub use normalize::normalize;
pub use worker::{IngestWorker, StopHandle};
