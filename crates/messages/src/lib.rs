//! Wire messages for the dpos voting protocol.
//!
//! The wire layout is normative: field order, hash widths, the little-endian
//! `u16` round, the `i8` decision byte and compact length prefixes must not
//! change, or peers on the same network will disagree on message hashes.

mod block_msg;
mod inventory;
mod vote_msg;
mod wire;

pub use block_msg::{decode_vice_block, encode_vice_block};
pub use inventory::{InvKind, Inventory, RELAY_EXPIRY};
pub use vote_msg::{frame, unframe, RoundVoteMessage, TxVoteMessage};
pub use wire::{CodecError, MAX_COLLECTION_LEN};
