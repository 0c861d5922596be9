//! The dpos voting state machine.
//!
//! A fixed committee of masternodes agrees, on top of a parent chain tip, on
//! which instant transactions are committed and which candidate block becomes
//! the next finalized block. This crate is the per-tip voting core: it
//! ingests transactions, vice-blocks, transaction votes and round votes, and
//! emits new votes, transaction fetch requests and a fully-approved block
//! ready for submission.
//!
//! # Architecture
//!
//! The voter processes events synchronously:
//!
//! - `apply_tx` → validate, pool, vote YES/NO/PASS on the transaction
//! - `apply_vice_block` → validate, store, maybe round-vote
//! - `apply_tx_vote` / `apply_round_vote` → store, detect doublesigns,
//!   re-evaluate decisions, maybe submit a block
//! - `on_round_too_long` → forced PASS to help the round advance
//! - `update_tip` → finalize the epoch, prune finished transactions
//!
//! All I/O is performed by the host via the returned [`Output`]
//! (re-exported from `dpos-core`).
//!
//! # Safety
//!
//! - **One vote per slot**: at most one stored vote per
//!   `(tip, round, txid, voter)` and per `(tip, round, voter)`; a different
//!   vote on an occupied slot is Byzantine evidence.
//! - **Self-consistency**: the node never casts YES and NO for the same
//!   transaction across rounds, and defers voting while any transaction it
//!   already approved is missing locally.
//! - **Determinism**: outputs are a pure function of the event sequence;
//!   all stores are ordered maps.
//!
//! # Liveness
//!
//! - **Stalemate detection**: a round where no vice-block can reach quorum
//!   any more advances the current round.
//! - **Forced PASS**: an external timer calls `on_round_too_long`, seeding
//!   the PASS votes that drive a stuck round into stalemate.

mod state;
mod tally;
mod voter;

pub use state::TipState;
pub use tally::{
    check_round_stalemate, check_tx_not_committable, RoundVotingStats, TxVotingStats,
};
pub use voter::Voter;
