//! Archive record encoding.
//!
//! A vote record is the 32-byte voter identity followed by the vote's wire
//! message. A vice-block record is the block's wire encoding.

use crate::ArchiveError;
use dpos_messages::{
    decode_vice_block, encode_vice_block, RoundVoteMessage, TxVoteMessage,
};
use dpos_types::{Hash, RoundVote, TxVote, ViceBlock, VoterId};

fn corrupt(family: &'static str, reason: impl ToString) -> ArchiveError {
    ArchiveError::Corrupt {
        family,
        reason: reason.to_string(),
    }
}

fn split_voter(family: &'static str, data: &[u8]) -> Result<(VoterId, Vec<u8>), ArchiveError> {
    if data.len() < 32 {
        return Err(corrupt(family, "record shorter than voter id"));
    }
    let mut id = [0u8; 32];
    id.copy_from_slice(&data[..32]);
    Ok((VoterId(Hash::from_bytes(id)), data[32..].to_vec()))
}

pub fn encode_round_vote_record(vote: &RoundVote) -> Vec<u8> {
    let mut record = Vec::new();
    record.extend_from_slice(vote.voter.hash().as_bytes());
    record.extend_from_slice(&RoundVoteMessage::from_vote(vote).encode());
    record
}

pub fn decode_round_vote_record(data: &[u8]) -> Result<RoundVote, ArchiveError> {
    let (voter, payload) = split_voter(crate::FAMILY_ROUND_VOTES, data)?;
    let msg = RoundVoteMessage::decode(&payload)
        .map_err(|e| corrupt(crate::FAMILY_ROUND_VOTES, e))?;
    Ok(msg.into_vote(voter))
}

pub fn encode_tx_vote_record(vote: &TxVote) -> Vec<u8> {
    let mut record = Vec::new();
    record.extend_from_slice(vote.voter.hash().as_bytes());
    record.extend_from_slice(&TxVoteMessage::from_vote(vote).encode());
    record
}

pub fn decode_tx_vote_record(data: &[u8]) -> Result<TxVote, ArchiveError> {
    let (voter, payload) = split_voter(crate::FAMILY_TX_VOTES, data)?;
    let msg =
        TxVoteMessage::decode(&payload).map_err(|e| corrupt(crate::FAMILY_TX_VOTES, e))?;
    msg.into_votes(voter)
        .into_iter()
        .next()
        .ok_or_else(|| corrupt(crate::FAMILY_TX_VOTES, "record carries no choice"))
}

pub fn encode_vice_block_record(block: &ViceBlock) -> Vec<u8> {
    encode_vice_block(block)
}

pub fn decode_vice_block_record(data: &[u8]) -> Result<ViceBlock, ArchiveError> {
    decode_vice_block(data).map_err(|e| corrupt(crate::FAMILY_VICE_BLOCKS, e))
}

pub fn decode_key(family: &'static str, key: &[u8]) -> Result<Hash, ArchiveError> {
    let arr: [u8; 32] = key
        .try_into()
        .map_err(|_| corrupt(family, format!("bad key length {}", key.len())))?;
    Ok(Hash::from_bytes(arr))
}
