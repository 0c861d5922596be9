//! Byzantine misbehavior evidence.

use dpos_types::{BlockHash, Round, TxId, VoterId};
use thiserror::Error;

/// Evidence of Byzantine behavior by a peer.
///
/// Carried in [`Output::errors`](crate::Output); the host escalates these to
/// peer scoring. The voter itself never disconnects peers. Duplicate votes
/// with identical content are *not* misbehavior and are dropped silently.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Misbehavior {
    /// Two different tx-votes from one voter in the same (tip, round, txid)
    /// slot.
    #[error("masternode tx doublesign misbehaving")]
    TxDoublesign {
        voter: VoterId,
        subject: TxId,
        round: Round,
    },

    /// Two different round-votes from one voter in the same (tip, round)
    /// slot.
    #[error("masternode round doublesign misbehaving")]
    RoundDoublesign { voter: VoterId, round: Round },

    /// A PASS round-vote carrying a non-zero subject.
    #[error("malformed vote subject")]
    MalformedVoteSubject { voter: VoterId, round: Round },

    /// A NO decision in a round vote.
    #[error("malformed vote decision")]
    MalformedVoteDecision { voter: VoterId, round: Round },

    /// A vice-block that failed structural validation.
    #[error("vice-block validation failed")]
    InvalidViceBlock { block: BlockHash },
}
