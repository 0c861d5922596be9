//! RocksDB-backed archive.

use crate::record::{
    decode_key, decode_round_vote_record, decode_tx_vote_record, decode_vice_block_record,
    encode_round_vote_record, encode_tx_vote_record, encode_vice_block_record,
};
use crate::{
    Archive, ArchiveError, FAMILY_ROUND_VOTES, FAMILY_TX_VOTES, FAMILY_VICE_BLOCKS,
};
use dpos_types::{Hash, RoundVote, TxVote, ViceBlock};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, DB};
use std::path::Path;
use tracing::warn;

/// RocksDB-based archive for production use.
///
/// One column family per record family, keyed by record hash.
pub struct RocksArchive {
    db: DB,
}

impl RocksArchive {
    /// Open or create the archive at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = [FAMILY_VICE_BLOCKS, FAMILY_ROUND_VOTES, FAMILY_TX_VOTES]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| ArchiveError::Database(e.to_string()))?;
        Ok(Self { db })
    }

    fn cf(&self, name: &'static str) -> Result<&ColumnFamily, ArchiveError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| ArchiveError::Database(format!("Column family {name} not found")))
    }

    fn put(&self, family: &'static str, key: Hash, value: Vec<u8>) -> Result<(), ArchiveError> {
        let cf = self.cf(family)?;
        self.db
            .put_cf(cf, key.as_bytes(), value)
            .map_err(|e| ArchiveError::Database(e.to_string()))
    }

    fn delete(&self, family: &'static str, key: Hash) -> Result<(), ArchiveError> {
        let cf = self.cf(family)?;
        self.db
            .delete_cf(cf, key.as_bytes())
            .map_err(|e| ArchiveError::Database(e.to_string()))
    }

    fn scan(
        &self,
        family: &'static str,
        on_record: &mut dyn FnMut(Hash, &[u8]) -> Result<(), ArchiveError>,
    ) -> Result<(), ArchiveError> {
        let cf = self.cf(family)?;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item.map_err(|e| ArchiveError::Database(e.to_string()))?;
            let key = decode_key(family, &key)?;
            on_record(key, &value)?;
        }
        Ok(())
    }
}

impl Archive for RocksArchive {
    fn write_vice_block(&self, key: Hash, block: &ViceBlock) -> Result<(), ArchiveError> {
        self.put(FAMILY_VICE_BLOCKS, key, encode_vice_block_record(block))
    }

    fn write_round_vote(&self, key: Hash, vote: &RoundVote) -> Result<(), ArchiveError> {
        self.put(FAMILY_ROUND_VOTES, key, encode_round_vote_record(vote))
    }

    fn write_tx_vote(&self, key: Hash, vote: &TxVote) -> Result<(), ArchiveError> {
        self.put(FAMILY_TX_VOTES, key, encode_tx_vote_record(vote))
    }

    fn erase_vice_block(&self, key: Hash) -> Result<(), ArchiveError> {
        self.delete(FAMILY_VICE_BLOCKS, key)
    }

    fn erase_round_vote(&self, key: Hash) -> Result<(), ArchiveError> {
        self.delete(FAMILY_ROUND_VOTES, key)
    }

    fn erase_tx_vote(&self, key: Hash) -> Result<(), ArchiveError> {
        self.delete(FAMILY_TX_VOTES, key)
    }

    fn load_vice_blocks(
        &self,
        on_block: &mut dyn FnMut(Hash, ViceBlock),
    ) -> Result<(), ArchiveError> {
        self.scan(FAMILY_VICE_BLOCKS, &mut |key, value| {
            match decode_vice_block_record(value) {
                Ok(block) => on_block(key, block),
                // A corrupt record is logged and skipped; replay continues.
                Err(e) => warn!(%key, error = %e, "Skipping corrupt vice-block record"),
            }
            Ok(())
        })
    }

    fn load_round_votes(
        &self,
        on_vote: &mut dyn FnMut(Hash, RoundVote),
    ) -> Result<(), ArchiveError> {
        self.scan(FAMILY_ROUND_VOTES, &mut |key, value| {
            match decode_round_vote_record(value) {
                Ok(vote) => on_vote(key, vote),
                Err(e) => warn!(%key, error = %e, "Skipping corrupt round-vote record"),
            }
            Ok(())
        })
    }

    fn load_tx_votes(&self, on_vote: &mut dyn FnMut(Hash, TxVote)) -> Result<(), ArchiveError> {
        self.scan(FAMILY_TX_VOTES, &mut |key, value| {
            match decode_tx_vote_record(value) {
                Ok(vote) => on_vote(key, vote),
                Err(e) => warn!(%key, error = %e, "Skipping corrupt tx-vote record"),
            }
            Ok(())
        })
    }
}
