//! Vote wire messages.
//!
//! A transaction vote message aggregates several choices under one
//! signature; the voter stores one [`TxVote`] record per choice. A round
//! vote message carries exactly one choice.

use crate::wire::{
    get_choice, get_compact_len, get_hash, get_round, get_signature, put_choice,
    put_compact_len, put_hash, put_round, put_signature, CodecError,
};
use bytes::Buf;
use dpos_types::{
    tx_vote_signature_hash, BlockHash, Hash, Round, RoundVote, TxId, TxVote, VoteChoice,
    VoteSignature, VoterId,
};

/// Aggregated transaction vote as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxVoteMessage {
    pub tip: BlockHash,
    pub round: Round,
    pub choices: Vec<VoteChoice>,
    pub signature: VoteSignature,
}

impl TxVoteMessage {
    /// Encode to the normative wire layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32 + 2 + 1 + self.choices.len() * 33 + 66);
        put_hash(&mut buf, &self.tip.hash());
        put_round(&mut buf, self.round);
        put_compact_len(&mut buf, self.choices.len() as u64);
        for choice in &self.choices {
            put_choice(&mut buf, choice);
        }
        put_signature(&mut buf, &self.signature);
        buf
    }

    /// Decode from the normative wire layout, rejecting trailing bytes.
    pub fn decode(mut data: &[u8]) -> Result<Self, CodecError> {
        let buf = &mut data;
        let tip = BlockHash(get_hash(buf)?);
        let round = get_round(buf)?;
        let count = get_compact_len(buf)? as usize;
        let mut choices = Vec::with_capacity(count);
        for _ in 0..count {
            choices.push(get_choice(buf)?);
        }
        let signature = get_signature(buf)?;
        if buf.has_remaining() {
            return Err(CodecError::TrailingBytes(buf.remaining()));
        }
        Ok(Self {
            tip,
            round,
            choices,
            signature,
        })
    }

    /// Hash of the encoded message; the inventory, relay and archive key.
    pub fn hash(&self) -> Hash {
        Hash::digest(&self.encode())
    }

    /// The hash this message's signature commits to.
    pub fn signature_hash(&self) -> Hash {
        tx_vote_signature_hash(self.tip, self.round, &self.choices)
    }

    /// Whether any choice targets the given transaction.
    pub fn contains_tx(&self, txid: TxId) -> bool {
        self.choices.iter().any(|c| c.subject == txid.hash())
    }

    /// Split into per-transaction vote records, stamping the authenticated
    /// voter identity on each.
    pub fn into_votes(self, voter: VoterId) -> Vec<TxVote> {
        self.choices
            .iter()
            .map(|choice| TxVote {
                voter,
                tip: self.tip,
                round: self.round,
                choice: *choice,
                signature: self.signature,
            })
            .collect()
    }

    /// Wrap a single vote record for the wire.
    pub fn from_vote(vote: &TxVote) -> Self {
        Self {
            tip: vote.tip,
            round: vote.round,
            choices: vec![vote.choice],
            signature: vote.signature,
        }
    }
}

/// Round vote as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundVoteMessage {
    pub tip: BlockHash,
    pub round: Round,
    pub choice: VoteChoice,
    pub signature: VoteSignature,
}

impl RoundVoteMessage {
    /// Encode to the normative wire layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32 + 2 + 33 + 66);
        put_hash(&mut buf, &self.tip.hash());
        put_round(&mut buf, self.round);
        put_choice(&mut buf, &self.choice);
        put_signature(&mut buf, &self.signature);
        buf
    }

    /// Decode from the normative wire layout, rejecting trailing bytes.
    pub fn decode(mut data: &[u8]) -> Result<Self, CodecError> {
        let buf = &mut data;
        let tip = BlockHash(get_hash(buf)?);
        let round = get_round(buf)?;
        let choice = get_choice(buf)?;
        let signature = get_signature(buf)?;
        if buf.has_remaining() {
            return Err(CodecError::TrailingBytes(buf.remaining()));
        }
        Ok(Self {
            tip,
            round,
            choice,
            signature,
        })
    }

    /// Hash of the encoded message; the inventory, relay and archive key.
    pub fn hash(&self) -> Hash {
        Hash::digest(&self.encode())
    }

    /// The hash this message's signature commits to.
    pub fn signature_hash(&self) -> Hash {
        dpos_types::round_vote_signature_hash(self.tip, self.round, &self.choice)
    }

    /// Turn into a vote record, stamping the authenticated voter identity.
    pub fn into_vote(self, voter: VoterId) -> RoundVote {
        RoundVote {
            voter,
            tip: self.tip,
            round: self.round,
            choice: self.choice,
            signature: self.signature,
        }
    }

    /// Wrap a vote record for the wire.
    pub fn from_vote(vote: &RoundVote) -> Self {
        Self {
            tip: vote.tip,
            round: vote.round,
            choice: vote.choice,
            signature: vote.signature,
        }
    }
}

/// Prepend the `u32` little-endian length frame.
pub fn frame(payload: Vec<u8>) -> Vec<u8> {
    let mut framed = Vec::with_capacity(4 + payload.len());
    framed.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    framed.extend_from_slice(&payload);
    framed
}

/// Strip the `u32` little-endian length frame, returning the payload.
pub fn unframe(data: &[u8]) -> Result<&[u8], CodecError> {
    if data.len() < 4 {
        return Err(CodecError::UnexpectedEof);
    }
    let len = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    let payload = &data[4..];
    if payload.len() < len {
        return Err(CodecError::UnexpectedEof);
    }
    if payload.len() > len {
        return Err(CodecError::TrailingBytes(payload.len() - len));
    }
    Ok(payload)
}
