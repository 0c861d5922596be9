//! Shared fixtures: a four-masternode committee and a scriptable world.
#![allow(dead_code)]

use dpos_core::World;
use dpos_types::test_utils::*;
use dpos_types::{
    BlockHash, ConsensusParams, Decision, Hash, Round, RoundVote, Transaction, TxId, TxVote,
    ViceBlock, VoteChoice, VoteSignature, VoterId,
};
use dpos_voter::Voter;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// World whose answers are scripted through shared cells, so a test can
/// flip behavior mid-run.
#[derive(Clone, Default)]
pub struct TestWorld {
    /// When set, `validate_txs` rejects this transaction alongside any
    /// other (it validates alone but conflicts with everything else).
    pub conflict_tx: Rc<Cell<Option<TxId>>>,
    /// When set, `validate_txs` rejects any set containing this transaction.
    pub invalid_tx: Rc<Cell<Option<TxId>>>,
    /// Structural block validation result.
    pub block_invalid: Rc<Cell<bool>>,
    /// Transaction-set block validation result (the `check_txs = true` pass).
    pub block_txs_invalid: Rc<Cell<bool>>,
    /// Whether historical tips are accepted.
    pub archiving: Rc<Cell<bool>>,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::default()
    }
}

impl World for TestWorld {
    fn validate_txs(&self, txs: &BTreeMap<TxId, Transaction>) -> bool {
        if let Some(bad) = self.invalid_tx.get() {
            if txs.contains_key(&bad) {
                return false;
            }
        }
        if let Some(bad) = self.conflict_tx.get() {
            if txs.len() > 1 && txs.contains_key(&bad) {
                return false;
            }
        }
        true
    }

    fn validate_block(
        &self,
        _block: &ViceBlock,
        _committed_txs: &BTreeMap<TxId, Transaction>,
        check_txs: bool,
    ) -> bool {
        if self.block_invalid.get() {
            return false;
        }
        !(check_txs && self.block_txs_invalid.get())
    }

    fn allow_archiving(&self, _old_tip: BlockHash) -> bool {
        self.archiving.get()
    }
}

/// The committee: M1 is the local node.
pub fn m(n: u8) -> VoterId {
    test_voter(n)
}

pub fn tip() -> BlockHash {
    BlockHash(test_hash(0xee))
}

/// A voter for M1 on a four-node committee with quorum three.
pub fn make_voter(world: TestWorld) -> Voter<TestWorld> {
    let params = ConsensusParams::new(4, 3).unwrap();
    let mut voter = Voter::new(world, params);
    voter.set_voting(true, m(1));
    voter.update_tip(tip());
    voter
}

/// An observing (non-voting) instance with the same committee view.
pub fn make_observer(world: TestWorld) -> Voter<TestWorld> {
    let params = ConsensusParams::new(4, 3).unwrap();
    let mut voter = Voter::new(world, params);
    voter.set_voting(false, m(9));
    voter.update_tip(tip());
    voter
}

pub fn yes_round_vote(voter: VoterId, round: Round, subject: BlockHash) -> RoundVote {
    RoundVote {
        voter,
        tip: tip(),
        round,
        choice: VoteChoice::yes(subject.hash()),
        signature: VoteSignature::zero(),
    }
}

pub fn pass_round_vote(voter: VoterId, round: Round) -> RoundVote {
    RoundVote {
        voter,
        tip: tip(),
        round,
        choice: VoteChoice::pass(),
        signature: VoteSignature::zero(),
    }
}

pub fn tx_vote(voter: VoterId, round: Round, txid: TxId, decision: Decision) -> TxVote {
    TxVote {
        voter,
        tip: tip(),
        round,
        choice: VoteChoice::new(txid.hash(), decision),
        signature: VoteSignature::zero(),
    }
}

/// A round vote with an arbitrary subject hash (not a known block).
pub fn yes_round_vote_for(voter: VoterId, round: Round, subject: Hash) -> RoundVote {
    RoundVote {
        voter,
        tip: tip(),
        round,
        choice: VoteChoice::yes(subject),
        signature: VoteSignature::zero(),
    }
}
