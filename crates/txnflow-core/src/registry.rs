//! Chain registry — static mapping from chain id to chain configuration.
//!
//! Seeded once at process start from the list of known networks and read-only
//! thereafter. Adding a chain requires a code/config change; chain configs
//! are trusted, not user-supplied.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::IngestError;

/// The execution family a chain belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainFamily {
    /// Ethereum Virtual Machine compatible.
    Evm,
}

/// Configuration for a single blockchain network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Numeric chain id (1 = Ethereum mainnet).
    pub chain_id: u64,
    /// Display name, e.g. `"Ethereum Mainnet"`.
    pub name: String,
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,
    pub family: ChainFamily,
}

/// Lookup table of supported chains, keyed by chain id.
#[derive(Debug, Default)]
pub struct ChainRegistry {
    chains: HashMap<u64, ChainConfig>,
}

impl ChainRegistry {
    /// An empty registry. Use [`ChainRegistry::with_known_networks`] for the
    /// seeded production set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the known networks, routed through Infura.
    pub fn with_known_networks(infura_api_key: &str) -> Self {
        let mut registry = Self::new();

        registry.register(ChainConfig {
            chain_id: 1,
            name: "Ethereum Mainnet".into(),
            rpc_url: format!("https://mainnet.infura.io/v3/{infura_api_key}"),
            family: ChainFamily::Evm,
        });

        // Future networks (Polygon 137, Arbitrum One 42161, ...) register here.

        registry
    }

    /// Insert or overwrite a chain's configuration, keyed by its chain id.
    pub fn register(&mut self, config: ChainConfig) {
        self.chains.insert(config.chain_id, config);
    }

    /// Look up the configuration for `chain_id`.
    pub fn get(&self, chain_id: u64) -> Result<&ChainConfig, IngestError> {
        self.chains
            .get(&chain_id)
            .ok_or(IngestError::UnsupportedChain { chain_id })
    }

    /// Non-failing existence check.
    pub fn is_supported(&self, chain_id: u64) -> bool {
        self.chains.contains_key(&chain_id)
    }

    /// All registered chain ids. Order is not significant.
    pub fn supported_chains(&self) -> Vec<u64> {
        self.chains.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(chain_id: u64) -> ChainConfig {
        ChainConfig {
            chain_id,
            name: format!("chain-{chain_id}"),
            rpc_url: format!("http://localhost:854{chain_id}"),
            family: ChainFamily::Evm,
        }
    }

    #[test]
    fn register_and_get() {
        let mut registry = ChainRegistry::new();
        registry.register(test_config(1));

        let cfg = registry.get(1).unwrap();
        assert_eq!(cfg.name, "chain-1");
        assert!(registry.is_supported(1));
    }

    #[test]
    fn unknown_chain_fails_lookup() {
        let registry = ChainRegistry::new();
        let err = registry.get(999).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedChain { chain_id: 999 }));
        assert!(!registry.is_supported(999));
    }

    #[test]
    fn register_overwrites_existing() {
        let mut registry = ChainRegistry::new();
        registry.register(test_config(1));
        registry.register(ChainConfig {
            rpc_url: "http://other:8545".into(),
            ..test_config(1)
        });

        assert_eq!(registry.get(1).unwrap().rpc_url, "http://other:8545");
        assert_eq!(registry.supported_chains(), vec![1]);
    }

    #[test]
    fn known_networks_include_mainnet() {
        let registry = ChainRegistry::with_known_networks("test-key");
        let mainnet = registry.get(1).unwrap();
        assert_eq!(mainnet.name, "Ethereum Mainnet");
        assert!(mainnet.rpc_url.ends_with("test-key"));
        assert_eq!(mainnet.family, ChainFamily::Evm);
    }
}
