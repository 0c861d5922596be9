//! Low-level wire primitives.
//!
//! Field order and widths are normative for the protocol: 32-byte hashes,
//! little-endian `u16` rounds, `i8` decisions, and compact length prefixes
//! for vectors (1/3/5/9-byte varints). Framed messages carry a `u32`
//! little-endian payload length.

use bytes::{Buf, BufMut};
use dpos_types::{Decision, Hash, VoteChoice, VoteSignature, COMPACT_SIGNATURE_SIZE};
use thiserror::Error;

/// Errors that can occur during message encoding/decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Message too short")]
    UnexpectedEof,

    #[error("Unknown decision byte: {0}")]
    UnknownDecision(i8),

    #[error("Bad signature length: expected {COMPACT_SIGNATURE_SIZE}, got {0}")]
    BadSignatureLength(usize),

    #[error("Collection length {0} exceeds limit {1}")]
    OversizedCollection(u64, u64),

    #[error("Trailing bytes after message: {0}")]
    TrailingBytes(usize),
}

/// Upper bound on decoded collection lengths. A choice list longer than the
/// committee could ever produce is garbage, and unchecked lengths would let a
/// peer trigger huge allocations.
pub const MAX_COLLECTION_LEN: u64 = 1 << 16;

pub fn put_hash(buf: &mut impl BufMut, hash: &Hash) {
    buf.put_slice(hash.as_bytes());
}

pub fn get_hash(buf: &mut impl Buf) -> Result<Hash, CodecError> {
    if buf.remaining() < 32 {
        return Err(CodecError::UnexpectedEof);
    }
    let mut bytes = [0u8; 32];
    buf.copy_to_slice(&mut bytes);
    Ok(Hash::from_bytes(bytes))
}

pub fn put_round(buf: &mut impl BufMut, round: u16) {
    buf.put_u16_le(round);
}

pub fn get_round(buf: &mut impl Buf) -> Result<u16, CodecError> {
    if buf.remaining() < 2 {
        return Err(CodecError::UnexpectedEof);
    }
    Ok(buf.get_u16_le())
}

/// Compact length prefix: values below 0xFD inline, then 0xFD+u16,
/// 0xFE+u32, 0xFF+u64, all little-endian.
pub fn put_compact_len(buf: &mut impl BufMut, len: u64) {
    match len {
        0..=0xFC => buf.put_u8(len as u8),
        0xFD..=0xFFFF => {
            buf.put_u8(0xFD);
            buf.put_u16_le(len as u16);
        }
        0x1_0000..=0xFFFF_FFFF => {
            buf.put_u8(0xFE);
            buf.put_u32_le(len as u32);
        }
        _ => {
            buf.put_u8(0xFF);
            buf.put_u64_le(len);
        }
    }
}

pub fn get_compact_len(buf: &mut impl Buf) -> Result<u64, CodecError> {
    if buf.remaining() < 1 {
        return Err(CodecError::UnexpectedEof);
    }
    let len = match buf.get_u8() {
        0xFD => {
            if buf.remaining() < 2 {
                return Err(CodecError::UnexpectedEof);
            }
            buf.get_u16_le() as u64
        }
        0xFE => {
            if buf.remaining() < 4 {
                return Err(CodecError::UnexpectedEof);
            }
            buf.get_u32_le() as u64
        }
        0xFF => {
            if buf.remaining() < 8 {
                return Err(CodecError::UnexpectedEof);
            }
            buf.get_u64_le()
        }
        b => b as u64,
    };
    if len > MAX_COLLECTION_LEN {
        return Err(CodecError::OversizedCollection(len, MAX_COLLECTION_LEN));
    }
    Ok(len)
}

pub fn put_choice(buf: &mut impl BufMut, choice: &VoteChoice) {
    put_hash(buf, &choice.subject);
    buf.put_i8(choice.decision.to_i8());
}

pub fn get_choice(buf: &mut impl Buf) -> Result<VoteChoice, CodecError> {
    let subject = get_hash(buf)?;
    if buf.remaining() < 1 {
        return Err(CodecError::UnexpectedEof);
    }
    let raw = buf.get_i8();
    let decision = Decision::from_i8(raw).ok_or(CodecError::UnknownDecision(raw))?;
    Ok(VoteChoice { subject, decision })
}

pub fn put_signature(buf: &mut impl BufMut, sig: &VoteSignature) {
    put_compact_len(buf, COMPACT_SIGNATURE_SIZE as u64);
    buf.put_slice(sig.as_bytes());
}

pub fn get_signature(buf: &mut impl Buf) -> Result<VoteSignature, CodecError> {
    let len = get_compact_len(buf)? as usize;
    if len != COMPACT_SIGNATURE_SIZE {
        return Err(CodecError::BadSignatureLength(len));
    }
    if buf.remaining() < COMPACT_SIGNATURE_SIZE {
        return Err(CodecError::UnexpectedEof);
    }
    let mut bytes = [0u8; COMPACT_SIGNATURE_SIZE];
    buf.copy_to_slice(&mut bytes);
    Ok(VoteSignature::from_bytes(bytes))
}
