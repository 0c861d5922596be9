//! Foundational types for the dpos voting core.
//!
//! This crate provides the types used throughout the voting implementation:
//!
//! - **Primitives**: [`Hash`], hex parsing, signature bytes
//! - **Identifiers**: [`BlockHash`], [`TxId`], [`VoterId`], [`Round`]
//! - **Vote model**: [`Decision`], [`VoteChoice`], [`TxVote`], [`RoundVote`]
//! - **Consensus objects**: [`ViceBlock`], [`Transaction`], [`ConsensusParams`]
//! - **Signing**: signature-hash construction with the protocol salt
//!
//! # Design Philosophy
//!
//! This crate is self-contained with minimal dependencies. It does not depend
//! on any other workspace crates, making it the foundation layer.

mod block;
mod hash;
mod identifiers;
mod params;
mod signing;
mod transaction;
mod vote;

pub use block::ViceBlock;
pub use hash::{Hash, HexError};
pub use identifiers::{BlockHash, Round, TxId, VoterId};
pub use params::{ConsensusParams, ParamsError};
pub use signing::{round_vote_signature_hash, tx_vote_signature_hash, SIGNING_SALT};
pub use transaction::Transaction;
pub use vote::{
    Decision, RoundVote, TxVote, VoteChoice, VoteSignature, COMPACT_SIGNATURE_SIZE,
};

/// Test utilities.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils {
    use super::*;

    /// Create a test hash from a seed byte.
    pub fn test_hash(seed: u8) -> Hash {
        Hash::from_bytes([seed; 32])
    }

    /// Create a test masternode identity from a seed byte.
    pub fn test_voter(seed: u8) -> VoterId {
        VoterId(test_hash(seed))
    }

    /// Create a minimal instant transaction from seed bytes.
    pub fn test_transaction(seed: u8) -> Transaction {
        Transaction::new(vec![seed, seed.wrapping_add(1), seed.wrapping_add(2)], true)
    }

    /// Create a vice-block on the given tip with no transactions.
    pub fn test_vice_block(tip: BlockHash, round: Round) -> ViceBlock {
        ViceBlock::new(tip, round, vec![])
    }
}
