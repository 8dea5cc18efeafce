//! Transaction status state machine.
//!
//! ```text
//! RECEIVED → FETCHING → { CONFIRMED | ERROR }
//! ```
//!
//! `PENDING`, `FAILED` and `DROPPED` exist in the persisted enum for future
//! reorg/drop handling but are never written by the ingestion worker.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::IngestError;

/// Lifecycle status of a submitted transaction.
///
/// Persisted as an uppercase string (`"RECEIVED"`, `"FETCHING"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
    /// Initial state, created at submission time.
    Received,
    /// The worker has claimed the item and is resolving it on-chain.
    Fetching,
    /// Reserved: seen on-chain but not yet mined.
    Pending,
    /// Resolved and normalized. Terminal.
    Confirmed,
    /// Reserved: executed but reverted on-chain. Terminal.
    Failed,
    /// Reserved: evicted from the mempool. Terminal.
    Dropped,
    /// Ingestion failed; `error_reason` holds why. Terminal.
    Error,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "RECEIVED",
            Self::Fetching => "FETCHING",
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Failed => "FAILED",
            Self::Dropped => "DROPPED",
            Self::Error => "ERROR",
        }
    }

    /// Returns `true` if nothing in the pipeline transitions out of this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed | Self::Dropped | Self::Error)
    }

    /// Returns `true` if the state machine allows `self → next`.
    pub fn can_transition_to(&self, next: TxStatus) -> bool {
        match self {
            Self::Received => matches!(next, Self::Fetching | Self::Dropped),
            Self::Fetching => matches!(
                next,
                Self::Pending | Self::Confirmed | Self::Failed | Self::Error | Self::Dropped
            ),
            Self::Pending => matches!(next, Self::Confirmed | Self::Failed | Self::Dropped),
            Self::Confirmed | Self::Failed | Self::Dropped | Self::Error => false,
        }
    }

    /// Validate a transition, producing the error the store surfaces.
    pub fn check_transition(&self, next: TxStatus) -> Result<(), IngestError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(IngestError::InvalidTransition { from: *self, to: next })
        }
    }
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxStatus {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RECEIVED" => Ok(Self::Received),
            "FETCHING" => Ok(Self::Fetching),
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "FAILED" => Ok(Self::Failed),
            "DROPPED" => Ok(Self::Dropped),
            "ERROR" => Ok(Self::Error),
            other => Err(IngestError::Other(format!("unknown status: {other}"))),
        }
    }
}
