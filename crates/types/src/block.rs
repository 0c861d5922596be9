//! Vice-block: a candidate next block proposed for voting.

use crate::{BlockHash, Hash, Round, Transaction};

/// A candidate next block on top of a parent tip.
///
/// Becomes a real block once its round reaches quorum. The voter does not
/// interpret the transaction list beyond forwarding it to the external
/// validator. The hash commits to the parent, the round and the transaction
/// ids, and is cached at construction.
#[derive(Clone)]
pub struct ViceBlock {
    /// Hash of the parent chain tip this candidate extends.
    pub prev_block: BlockHash,

    /// Round in which this candidate was proposed.
    pub round: Round,

    /// Transactions carried by the candidate.
    pub txs: Vec<Transaction>,

    /// Cached block hash.
    hash: BlockHash,
}

impl ViceBlock {
    /// Create a vice-block, computing and caching its hash.
    pub fn new(prev_block: BlockHash, round: Round, txs: Vec<Transaction>) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(prev_block.hash().as_bytes());
        hasher.update(&round.to_le_bytes());
        hasher.update(&(txs.len() as u64).to_le_bytes());
        for tx in &txs {
            hasher.update(tx.id().hash().as_bytes());
        }
        let hash = BlockHash(Hash::from_bytes(*hasher.finalize().as_bytes()));
        Self {
            prev_block,
            round,
            txs,
            hash,
        }
    }

    /// Get the block hash.
    pub fn hash(&self) -> BlockHash {
        self.hash
    }
}

// Compare by hash - the hash commits to all fields.
impl PartialEq for ViceBlock {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for ViceBlock {}

impl std::fmt::Debug for ViceBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViceBlock")
            .field("hash", &self.hash)
            .field("prev_block", &self.prev_block)
            .field("round", &self.round)
            .field("txs", &self.txs.len())
            .finish()
    }
}
