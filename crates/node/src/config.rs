//! Node configuration.

use dpos_types::{ConsensusParams, ParamsError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors loading a node configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Params(#[from] ParamsError),
}

/// Host node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Directory for the vote archive.
    pub data_dir: PathBuf,

    /// How long a round may run without progress before the host calls the
    /// forced-PASS entry point.
    pub round_timeout_ms: u64,

    /// Committee size.
    pub num_of_voters: usize,

    /// Quorum threshold. Must be at least the ⌈2n/3⌉ supermajority.
    pub min_quorum: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        let num_of_voters = 32;
        Self {
            data_dir: PathBuf::from("dpos-data"),
            round_timeout_ms: 15_000,
            num_of_voters,
            min_quorum: ConsensusParams::supermajority(num_of_voters),
        }
    }
}

impl NodeConfig {
    /// Parse from TOML.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: NodeConfig = toml::from_str(s)?;
        // Fail early on quorum bounds rather than at voter construction.
        config.consensus_params()?;
        Ok(config)
    }

    /// Validated consensus parameters.
    pub fn consensus_params(&self) -> Result<ConsensusParams, ParamsError> {
        ConsensusParams::new(self.num_of_voters, self.min_quorum)
    }

    /// Round timeout as a duration.
    pub fn round_timeout(&self) -> Duration {
        Duration::from_millis(self.round_timeout_ms)
    }
}
