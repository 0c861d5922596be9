//! Inventory announcements.
//!
//! Voting objects are announced by the hash of their wire encoding; peers
//! request the full object on first sight. Relay entries expire after
//! fifteen minutes.

use dpos_types::Hash;
use std::time::Duration;

/// How long a relayed object stays answerable.
pub const RELAY_EXPIRY: Duration = Duration::from_secs(15 * 60);

/// Kind of an announced voting object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum InvKind {
    /// A candidate next block.
    ViceBlock = 1,
    /// A vote on the winning vice-block of a round.
    RoundVote = 2,
    /// A vote on a transaction.
    TxVote = 3,
}

/// An inventory entry: object kind plus the hash of its wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Inventory {
    pub kind: InvKind,
    pub hash: Hash,
}

impl Inventory {
    pub fn vice_block(hash: Hash) -> Self {
        Inventory {
            kind: InvKind::ViceBlock,
            hash,
        }
    }

    pub fn round_vote(hash: Hash) -> Self {
        Inventory {
            kind: InvKind::RoundVote,
            hash,
        }
    }

    pub fn tx_vote(hash: Hash) -> Self {
        Inventory {
            kind: InvKind::TxVote,
            hash,
        }
    }
}
