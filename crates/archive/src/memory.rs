//! In-memory archive for tests and tooling.

use crate::record::{
    decode_round_vote_record, decode_tx_vote_record, decode_vice_block_record,
    encode_round_vote_record, encode_tx_vote_record, encode_vice_block_record,
};
use crate::{Archive, ArchiveError};
use dpos_types::{Hash, RoundVote, TxVote, ViceBlock};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Archive over ordered in-memory maps.
///
/// Stores the same encoded records as [`RocksArchive`](crate::RocksArchive)
/// so codec behavior is exercised identically in tests.
#[derive(Default)]
pub struct MemoryArchive {
    vice_blocks: Mutex<BTreeMap<Hash, Vec<u8>>>,
    round_votes: Mutex<BTreeMap<Hash, Vec<u8>>>,
    tx_votes: Mutex<BTreeMap<Hash, Vec<u8>>>,
}

impl MemoryArchive {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Archive for MemoryArchive {
    fn write_vice_block(&self, key: Hash, block: &ViceBlock) -> Result<(), ArchiveError> {
        self.vice_blocks
            .lock()
            .unwrap()
            .insert(key, encode_vice_block_record(block));
        Ok(())
    }

    fn write_round_vote(&self, key: Hash, vote: &RoundVote) -> Result<(), ArchiveError> {
        self.round_votes
            .lock()
            .unwrap()
            .insert(key, encode_round_vote_record(vote));
        Ok(())
    }

    fn write_tx_vote(&self, key: Hash, vote: &TxVote) -> Result<(), ArchiveError> {
        self.tx_votes
            .lock()
            .unwrap()
            .insert(key, encode_tx_vote_record(vote));
        Ok(())
    }

    fn erase_vice_block(&self, key: Hash) -> Result<(), ArchiveError> {
        self.vice_blocks.lock().unwrap().remove(&key);
        Ok(())
    }

    fn erase_round_vote(&self, key: Hash) -> Result<(), ArchiveError> {
        self.round_votes.lock().unwrap().remove(&key);
        Ok(())
    }

    fn erase_tx_vote(&self, key: Hash) -> Result<(), ArchiveError> {
        self.tx_votes.lock().unwrap().remove(&key);
        Ok(())
    }

    fn load_vice_blocks(
        &self,
        on_block: &mut dyn FnMut(Hash, ViceBlock),
    ) -> Result<(), ArchiveError> {
        for (key, value) in self.vice_blocks.lock().unwrap().iter() {
            on_block(*key, decode_vice_block_record(value)?);
        }
        Ok(())
    }

    fn load_round_votes(
        &self,
        on_vote: &mut dyn FnMut(Hash, RoundVote),
    ) -> Result<(), ArchiveError> {
        for (key, value) in self.round_votes.lock().unwrap().iter() {
            on_vote(*key, decode_round_vote_record(value)?);
        }
        Ok(())
    }

    fn load_tx_votes(&self, on_vote: &mut dyn FnMut(Hash, TxVote)) -> Result<(), ArchiveError> {
        for (key, value) in self.tx_votes.lock().unwrap().iter() {
            on_vote(*key, decode_tx_vote_record(value)?);
        }
        Ok(())
    }
}
