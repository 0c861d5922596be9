//! Pure quorum arithmetic over the vote store.

use dpos_types::{BlockHash, ConsensusParams};
use std::collections::BTreeMap;

/// Vote distribution for one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxVotingStats {
    /// Round-vote YES entries (any subject) across the tip.
    pub pro: usize,
    /// Round-vote NO entries. Never stored for round votes, so ordinarily
    /// zero; kept for the arithmetic's shape.
    pub contra: usize,
    /// Round-vote PASS entries whose subject equals the transaction.
    pub abstinendi: usize,
}

impl TxVotingStats {
    /// Total number of counted votes.
    pub fn totus(&self) -> usize {
        self.pro + self.contra + self.abstinendi
    }
}

/// Vote distribution for one round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundVotingStats {
    /// YES tallies per vice-block.
    pub pro: BTreeMap<BlockHash, usize>,
    /// PASS entries.
    pub abstinendi: usize,
}

impl RoundVotingStats {
    /// Total number of counted votes.
    pub fn totus(&self) -> usize {
        self.pro.values().sum::<usize>() + self.abstinendi
    }

    /// The leading vice-block's tally, zero if none.
    pub fn best(&self) -> usize {
        self.pro.values().copied().max().unwrap_or(0)
    }
}

/// No vice-block can reach quorum in this round even if every unseen voter
/// votes for the current leader. When this holds, the round advances.
pub fn check_round_stalemate(stats: &RoundVotingStats, params: &ConsensusParams) -> bool {
    debug_assert!(params.min_quorum() <= params.num_of_voters());
    let totus = stats.totus();
    let not_known = params.num_of_voters().saturating_sub(totus);
    stats.best() + not_known < params.min_quorum()
}

/// The transaction cannot reach quorum even if every unseen voter concurs.
pub fn check_tx_not_committable(stats: &TxVotingStats, params: &ConsensusParams) -> bool {
    debug_assert!(params.min_quorum() <= params.num_of_voters());
    let totus = stats.totus();
    let not_known = params.num_of_voters().saturating_sub(totus);
    stats.pro + not_known < params.min_quorum()
}
