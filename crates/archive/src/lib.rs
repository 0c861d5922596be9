//! Persistent vote and vice-block archive.
//!
//! Three record families keyed by record hash: `"b"` for vice-blocks, `"p"`
//! for round votes, `"t"` for transaction votes. On startup the host replays
//! stored records through the voter's `apply_*` entry points (with
//! `allow_archiving` answering for historical tips); on shutdown it writes
//! back the records first observed during the session.
//!
//! Records are stored in wire encoding. Vote records are prefixed with the
//! authenticated voter identity: identity recovery from the signature lives
//! in the transport layer, so it must be captured at write time to survive a
//! restart.

mod memory;
mod record;
mod rocks;

pub use memory::MemoryArchive;
pub use rocks::RocksArchive;

use dpos_types::{Hash, RoundVote, TxVote, ViceBlock};
use thiserror::Error;

/// Family name (and key prefix) for vice-blocks.
pub const FAMILY_VICE_BLOCKS: &str = "b";
/// Family name (and key prefix) for round votes.
pub const FAMILY_ROUND_VOTES: &str = "p";
/// Family name (and key prefix) for transaction votes.
pub const FAMILY_TX_VOTES: &str = "t";

/// Errors from the archive store.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt record in family {family}: {reason}")]
    Corrupt { family: &'static str, reason: String },
}

/// Contract between the voter's host and the persistent vote store.
///
/// All operations are synchronous blocking I/O; callers in async contexts
/// should use a blocking pool.
pub trait Archive {
    fn write_vice_block(&self, key: Hash, block: &ViceBlock) -> Result<(), ArchiveError>;
    fn write_round_vote(&self, key: Hash, vote: &RoundVote) -> Result<(), ArchiveError>;
    fn write_tx_vote(&self, key: Hash, vote: &TxVote) -> Result<(), ArchiveError>;

    fn erase_vice_block(&self, key: Hash) -> Result<(), ArchiveError>;
    fn erase_round_vote(&self, key: Hash) -> Result<(), ArchiveError>;
    fn erase_tx_vote(&self, key: Hash) -> Result<(), ArchiveError>;

    fn load_vice_blocks(
        &self,
        on_block: &mut dyn FnMut(Hash, ViceBlock),
    ) -> Result<(), ArchiveError>;
    fn load_round_votes(
        &self,
        on_vote: &mut dyn FnMut(Hash, RoundVote),
    ) -> Result<(), ArchiveError>;
    fn load_tx_votes(&self, on_vote: &mut dyn FnMut(Hash, TxVote)) -> Result<(), ArchiveError>;
}

impl<T: Archive + ?Sized> Archive for &T {
    fn write_vice_block(&self, key: Hash, block: &ViceBlock) -> Result<(), ArchiveError> {
        (**self).write_vice_block(key, block)
    }

    fn write_round_vote(&self, key: Hash, vote: &RoundVote) -> Result<(), ArchiveError> {
        (**self).write_round_vote(key, vote)
    }

    fn write_tx_vote(&self, key: Hash, vote: &TxVote) -> Result<(), ArchiveError> {
        (**self).write_tx_vote(key, vote)
    }

    fn erase_vice_block(&self, key: Hash) -> Result<(), ArchiveError> {
        (**self).erase_vice_block(key)
    }

    fn erase_round_vote(&self, key: Hash) -> Result<(), ArchiveError> {
        (**self).erase_round_vote(key)
    }

    fn erase_tx_vote(&self, key: Hash) -> Result<(), ArchiveError> {
        (**self).erase_tx_vote(key)
    }

    fn load_vice_blocks(
        &self,
        on_block: &mut dyn FnMut(Hash, ViceBlock),
    ) -> Result<(), ArchiveError> {
        (**self).load_vice_blocks(on_block)
    }

    fn load_round_votes(
        &self,
        on_vote: &mut dyn FnMut(Hash, RoundVote),
    ) -> Result<(), ArchiveError> {
        (**self).load_round_votes(on_vote)
    }

    fn load_tx_votes(&self, on_vote: &mut dyn FnMut(Hash, TxVote)) -> Result<(), ArchiveError> {
        (**self).load_tx_votes(on_vote)
    }
}

impl<T: Archive + ?Sized> Archive for std::sync::Arc<T> {
    fn write_vice_block(&self, key: Hash, block: &ViceBlock) -> Result<(), ArchiveError> {
        (**self).write_vice_block(key, block)
    }

    fn write_round_vote(&self, key: Hash, vote: &RoundVote) -> Result<(), ArchiveError> {
        (**self).write_round_vote(key, vote)
    }

    fn write_tx_vote(&self, key: Hash, vote: &TxVote) -> Result<(), ArchiveError> {
        (**self).write_tx_vote(key, vote)
    }

    fn erase_vice_block(&self, key: Hash) -> Result<(), ArchiveError> {
        (**self).erase_vice_block(key)
    }

    fn erase_round_vote(&self, key: Hash) -> Result<(), ArchiveError> {
        (**self).erase_round_vote(key)
    }

    fn erase_tx_vote(&self, key: Hash) -> Result<(), ArchiveError> {
        (**self).erase_tx_vote(key)
    }

    fn load_vice_blocks(
        &self,
        on_block: &mut dyn FnMut(Hash, ViceBlock),
    ) -> Result<(), ArchiveError> {
        (**self).load_vice_blocks(on_block)
    }

    fn load_round_votes(
        &self,
        on_vote: &mut dyn FnMut(Hash, RoundVote),
    ) -> Result<(), ArchiveError> {
        (**self).load_round_votes(on_vote)
    }

    fn load_tx_votes(&self, on_vote: &mut dyn FnMut(Hash, TxVote)) -> Result<(), ArchiveError> {
        (**self).load_tx_votes(on_vote)
    }
}
