//! Worker configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration consumed by the ingestion worker at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// How often the worker polls for `RECEIVED` transactions (milliseconds).
    pub poll_interval_ms: u64,
    /// Maximum number of transactions selected per poll tick.
    pub batch_size: u32,
    /// Per-call RPC timeout (seconds).
    pub rpc_timeout_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5_000,
            batch_size: 10,
            rpc_timeout_secs: 10,
        }
    }
}

impl WorkerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pipeline_contract() {
        let cfg = WorkerConfig::default();
        assert_eq!(cfg.poll_interval(), Duration::from_secs(5));
        assert_eq!(cfg.batch_size, 10);
        assert_eq!(cfg.rpc_timeout(), Duration::from_secs(10));
    }
}
