//! Callback surface between the voter and the host node.

use dpos_types::{BlockHash, Transaction, TxId, ViceBlock};
use std::collections::BTreeMap;

/// Host-side checks the voter is constructed with.
///
/// All callbacks are required to be synchronous and side-effect-free with
/// respect to voter state: the voter is a pure reducer, and the host must not
/// mutate anything the voter observes from inside a callback.
pub trait World {
    /// Collection consistency check against the host's mempool rules. The
    /// map is ordered by transaction id so every implementation sees the
    /// same sequence.
    fn validate_txs(&self, txs: &BTreeMap<TxId, Transaction>) -> bool;

    /// Block structural validation, optionally including the transaction
    /// set against the committed list.
    fn validate_block(
        &self,
        block: &ViceBlock,
        committed_txs: &BTreeMap<TxId, Transaction>,
        check_txs: bool,
    ) -> bool;

    /// Whether votes and vice-blocks for `old_tip` should still be accepted,
    /// e.g. while replaying archived records on startup.
    fn allow_archiving(&self, old_tip: BlockHash) -> bool;
}

impl<T: World + ?Sized> World for Box<T> {
    fn validate_txs(&self, txs: &BTreeMap<TxId, Transaction>) -> bool {
        (**self).validate_txs(txs)
    }

    fn validate_block(
        &self,
        block: &ViceBlock,
        committed_txs: &BTreeMap<TxId, Transaction>,
        check_txs: bool,
    ) -> bool {
        (**self).validate_block(block, committed_txs, check_txs)
    }

    fn allow_archiving(&self, old_tip: BlockHash) -> bool {
        (**self).allow_archiving(old_tip)
    }
}
