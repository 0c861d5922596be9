//! Consensus parameters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid consensus parameter combination.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("minQuorum {min_quorum} exceeds committee size {num_of_voters}")]
    QuorumTooLarge {
        num_of_voters: usize,
        min_quorum: usize,
    },

    #[error("minQuorum {min_quorum} below supermajority {supermajority} of {num_of_voters}")]
    QuorumTooSmall {
        num_of_voters: usize,
        min_quorum: usize,
        supermajority: usize,
    },

    #[error("committee must not be empty")]
    EmptyCommittee,
}

/// Committee size and quorum threshold.
///
/// `min_quorum` must satisfy `⌈2·num_of_voters/3⌉ ≤ min_quorum ≤
/// num_of_voters`; the constructor enforces this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusParams {
    num_of_voters: usize,
    min_quorum: usize,
}

impl ConsensusParams {
    /// Create parameters, validating the quorum bounds.
    pub fn new(num_of_voters: usize, min_quorum: usize) -> Result<Self, ParamsError> {
        if num_of_voters == 0 {
            return Err(ParamsError::EmptyCommittee);
        }
        if min_quorum > num_of_voters {
            return Err(ParamsError::QuorumTooLarge {
                num_of_voters,
                min_quorum,
            });
        }
        let supermajority = Self::supermajority(num_of_voters);
        if min_quorum < supermajority {
            return Err(ParamsError::QuorumTooSmall {
                num_of_voters,
                min_quorum,
                supermajority,
            });
        }
        Ok(Self {
            num_of_voters,
            min_quorum,
        })
    }

    /// Parameters with the minimum legal quorum `⌈2n/3⌉`.
    pub fn with_supermajority(num_of_voters: usize) -> Result<Self, ParamsError> {
        Self::new(num_of_voters, Self::supermajority(num_of_voters))
    }

    /// `⌈2n/3⌉`.
    pub fn supermajority(num_of_voters: usize) -> usize {
        (2 * num_of_voters).div_ceil(3)
    }

    /// Committee size.
    pub fn num_of_voters(&self) -> usize {
        self.num_of_voters
    }

    /// Minimum count of concurring votes required to commit.
    pub fn min_quorum(&self) -> usize {
        self.min_quorum
    }
}
