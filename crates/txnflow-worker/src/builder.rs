//! Fluent builder for [`WorkerConfig`].
//!
//! # Example
//!
//! ```rust
//! use txnflow_worker::WorkerBuilder;
//!
//! let config = WorkerBuilder::new()
//!     .poll_interval_ms(2_000)
//!     .batch_size(25)
//!     .build_config();
//! assert_eq!(config.batch_size, 25);
//! ```

use txnflow_core::WorkerConfig;

/// Fluent builder for `WorkerConfig`.
#[derive(Default)]
pub struct WorkerBuilder {
    config: WorkerConfig,
}

impl WorkerBuilder {
    pub fn new() -> Self {
        Self {
            config: WorkerConfig::default(),
        }
    }

    /// Set the poll interval in milliseconds.
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    /// Set the maximum number of transactions per poll tick.
    pub fn batch_size(mut self, size: u32) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Set the per-call RPC timeout in seconds.
    pub fn rpc_timeout_secs(mut self, secs: u64) -> Self {
        self.config.rpc_timeout_secs = secs;
        self
    }

    pub fn build_config(self) -> WorkerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let cfg = WorkerBuilder::new().build_config();
        assert_eq!(cfg.poll_interval_ms, 5_000);
        assert_eq!(cfg.batch_size, 10);
        assert_eq!(cfg.rpc_timeout_secs, 10);
    }

    #[test]
    fn builder_custom() {
        let cfg = WorkerBuilder::new()
            .poll_interval_ms(500)
            .batch_size(50)
            .rpc_timeout_secs(3)
            .build_config();

        assert_eq!(cfg.poll_interval_ms, 500);
        assert_eq!(cfg.batch_size, 50);
        assert_eq!(cfg.rpc_timeout_secs, 3);
    }
}
