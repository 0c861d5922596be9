//! Per-tip voter store.

use dpos_types::{BlockHash, Round, RoundVote, TxId, TxVote, ViceBlock, VoterId};
use std::collections::BTreeMap;

/// Everything received for one parent tip.
///
/// All maps are ordered: any traversal that can influence an emitted output
/// must visit entries in the same order on every node, or replicas diverge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TipState {
    /// Candidate next blocks by hash.
    pub vice_blocks: BTreeMap<BlockHash, ViceBlock>,

    /// Transaction votes: at most one per `(round, txid, voter)`.
    pub tx_votes: BTreeMap<Round, BTreeMap<TxId, BTreeMap<VoterId, TxVote>>>,

    /// Round votes: at most one per `(round, voter)`.
    pub round_votes: BTreeMap<Round, BTreeMap<VoterId, RoundVote>>,
}

impl TipState {
    /// Look up a stored round vote.
    pub fn round_vote(&self, round: Round, voter: &VoterId) -> Option<&RoundVote> {
        self.round_votes.get(&round)?.get(voter)
    }

    /// Look up a stored transaction vote.
    pub fn tx_vote(&self, round: Round, txid: TxId, voter: &VoterId) -> Option<&TxVote> {
        self.tx_votes.get(&round)?.get(&txid)?.get(voter)
    }

    /// Whether any vote (either kind) references the given transaction.
    pub fn tx_has_any_vote(&self, txid: TxId) -> bool {
        self.tx_votes
            .values()
            .flat_map(|by_tx| by_tx.values())
            .flat_map(|by_voter| by_voter.values())
            .any(|vote| vote.choice.subject == txid.hash())
    }

    /// Number of stored round votes across all rounds.
    pub fn round_vote_count(&self) -> usize {
        self.round_votes.values().map(|m| m.len()).sum()
    }

    /// Number of stored transaction votes across all rounds.
    pub fn tx_vote_count(&self) -> usize {
        self.tx_votes
            .values()
            .flat_map(|by_tx| by_tx.values())
            .map(|by_voter| by_voter.len())
            .sum()
    }
}
