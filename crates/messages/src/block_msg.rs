//! Vice-block wire encoding.
//!
//! Used both for relay and as the archive record format. Transactions are
//! carried as opaque payloads; the instant flag travels with each one.

use crate::wire::{get_compact_len, get_hash, get_round, put_compact_len, put_hash, put_round, CodecError};
use bytes::{Buf, BufMut};
use dpos_types::{BlockHash, Transaction, ViceBlock};

/// Encode a vice-block to the wire layout.
pub fn encode_vice_block(block: &ViceBlock) -> Vec<u8> {
    let mut buf = Vec::new();
    put_hash(&mut buf, &block.prev_block.hash());
    put_round(&mut buf, block.round);
    put_compact_len(&mut buf, block.txs.len() as u64);
    for tx in &block.txs {
        buf.put_u8(tx.instant as u8);
        put_compact_len(&mut buf, tx.payload().len() as u64);
        buf.put_slice(tx.payload());
    }
    buf
}

/// Decode a vice-block, rejecting trailing bytes. The cached hash is
/// recomputed from the decoded contents.
pub fn decode_vice_block(mut data: &[u8]) -> Result<ViceBlock, CodecError> {
    let buf = &mut data;
    let prev_block = BlockHash(get_hash(buf)?);
    let round = get_round(buf)?;
    let count = get_compact_len(buf)? as usize;
    let mut txs = Vec::with_capacity(count);
    for _ in 0..count {
        if buf.remaining() < 1 {
            return Err(CodecError::UnexpectedEof);
        }
        let instant = buf.get_u8() != 0;
        let len = get_compact_len(buf)? as usize;
        if buf.remaining() < len {
            return Err(CodecError::UnexpectedEof);
        }
        let mut payload = vec![0u8; len];
        buf.copy_to_slice(&mut payload);
        txs.push(Transaction::new(payload, instant));
    }
    if buf.has_remaining() {
        return Err(CodecError::TrailingBytes(buf.remaining()));
    }
    Ok(ViceBlock::new(prev_block, round, txs))
}
