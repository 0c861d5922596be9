//! Identifier newtypes.
//!
//! `BlockHash`, `TxId` and `VoterId` share the 256-bit [`Hash`]
//! representation but are distinct semantic types: a block hash never means a
//! transaction id, and the type system enforces that at the seams.

use crate::Hash;
use std::fmt;

/// Round number within a voting epoch. Starts at 1, advances on stalemate.
pub type Round = u16;

/// Hash of a block on the parent chain. The voting epoch runs on top of one
/// tip at a time.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BlockHash(pub Hash);

/// Hash of an instant transaction.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TxId(pub Hash);

/// Masternode identity. Stamped on every vote by the transport layer after
/// signature recovery.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VoterId(pub Hash);

impl BlockHash {
    /// The zero block hash.
    pub const ZERO: BlockHash = BlockHash(Hash::ZERO);

    /// Get the underlying hash.
    pub fn hash(&self) -> Hash {
        self.0
    }

    /// Check whether this is the zero identifier.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl TxId {
    /// The zero transaction id.
    pub const ZERO: TxId = TxId(Hash::ZERO);

    /// Get the underlying hash.
    pub fn hash(&self) -> Hash {
        self.0
    }

    /// Check whether this is the zero identifier.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl VoterId {
    /// Get the underlying hash.
    pub fn hash(&self) -> Hash {
        self.0
    }
}

impl From<Hash> for BlockHash {
    fn from(h: Hash) -> Self {
        BlockHash(h)
    }
}

impl From<Hash> for TxId {
    fn from(h: Hash) -> Self {
        TxId(h)
    }
}

impl From<Hash> for VoterId {
    fn from(h: Hash) -> Self {
        VoterId(h)
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Debug for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_order_like_hashes() {
        let a = TxId(Hash::from_bytes([1u8; 32]));
        let b = TxId(Hash::from_bytes([9u8; 32]));
        assert!(a < b);
        assert!(TxId::ZERO.is_zero());
    }
}
