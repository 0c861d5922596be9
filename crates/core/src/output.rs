//! Handler output: what the outer system must do.

use crate::Misbehavior;
use dpos_types::{RoundVote, TxId, TxVote, ViceBlock, VoterId};
use std::ops::{Add, AddAssign};

/// A fully-approved block ready for submission to the host chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockToSubmit {
    /// The winning vice-block, passed through unchanged.
    pub block: ViceBlock,

    /// Voters with a round-vote in the submitting round. The host uses this
    /// list to construct the block's quorum certificate.
    pub approved_by: Vec<VoterId>,
}

/// Everything a handler call asks the outer system to do.
///
/// Outputs form a monoid: the identity is the empty output, and `+=`
/// concatenates the list fields and takes the last non-null
/// `block_to_submit`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    /// New transaction votes to broadcast.
    pub tx_votes: Vec<TxVote>,

    /// New round votes to broadcast.
    pub round_votes: Vec<RoundVote>,

    /// Transactions referenced by votes but missing locally; the host must
    /// fetch and re-deliver them.
    pub tx_requests: Vec<TxId>,

    /// Byzantine misbehavior evidence for peer scoring.
    pub errors: Vec<Misbehavior>,

    /// A block that reached round quorum and still validates.
    pub block_to_submit: Option<BlockToSubmit>,
}

impl Output {
    /// The monoid identity.
    pub fn empty() -> Self {
        Self::default()
    }

    /// An output carrying a single piece of misbehavior evidence.
    pub fn misbehaving(err: Misbehavior) -> Self {
        Self {
            errors: vec![err],
            ..Self::default()
        }
    }

    /// True when nothing is asked of the outer system.
    pub fn is_empty(&self) -> bool {
        self.tx_votes.is_empty()
            && self.round_votes.is_empty()
            && self.tx_requests.is_empty()
            && self.errors.is_empty()
            && self.block_to_submit.is_none()
    }
}

impl AddAssign for Output {
    fn add_assign(&mut self, rhs: Self) {
        self.tx_votes.extend(rhs.tx_votes);
        self.round_votes.extend(rhs.round_votes);
        self.tx_requests.extend(rhs.tx_requests);
        self.errors.extend(rhs.errors);
        if rhs.block_to_submit.is_some() {
            self.block_to_submit = rhs.block_to_submit;
        }
    }
}

impl Add for Output {
    type Output = Output;

    fn add(mut self, rhs: Self) -> Output {
        self += rhs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpos_types::test_utils::*;
    use dpos_types::{BlockHash, VoteChoice};

    fn round_vote(seed: u8) -> RoundVote {
        RoundVote {
            voter: test_voter(seed),
            tip: BlockHash(test_hash(0xf0)),
            round: 1,
            choice: VoteChoice::pass(),
            signature: Default::default(),
        }
    }

    #[test]
    fn empty_is_identity() {
        let mut out = Output::empty();
        assert!(out.is_empty());
        out += Output::empty();
        assert!(out.is_empty());

        let mut with_vote = Output {
            round_votes: vec![round_vote(1)],
            ..Default::default()
        };
        with_vote += Output::empty();
        assert_eq!(with_vote.round_votes.len(), 1);
        assert!(!with_vote.is_empty());
    }

    #[test]
    fn add_concatenates_and_keeps_last_block() {
        let block_a = test_vice_block(BlockHash(test_hash(1)), 1);
        let block_b = test_vice_block(BlockHash(test_hash(2)), 1);

        let a = Output {
            round_votes: vec![round_vote(1)],
            block_to_submit: Some(BlockToSubmit {
                block: block_a,
                approved_by: vec![],
            }),
            ..Default::default()
        };
        let b = Output {
            round_votes: vec![round_vote(2)],
            block_to_submit: Some(BlockToSubmit {
                block: block_b.clone(),
                approved_by: vec![],
            }),
            ..Default::default()
        };

        let sum = a + b;
        assert_eq!(sum.round_votes.len(), 2);
        assert_eq!(sum.block_to_submit.unwrap().block, block_b);
    }

    #[test]
    fn add_does_not_clear_block_on_empty_rhs() {
        let block = test_vice_block(BlockHash(test_hash(1)), 1);
        let mut out = Output {
            block_to_submit: Some(BlockToSubmit {
                block,
                approved_by: vec![],
            }),
            ..Default::default()
        };
        out += Output::empty();
        assert!(out.block_to_submit.is_some());
    }
}
