//! Signature-hash construction for votes.
//!
//! The hash-for-signing is a deterministic serialization of
//! `tip || round || choice(s) || salt`, where the salt is a fixed 16-byte
//! protocol constant. Signing and verification happen outside the voting
//! core; this module only defines what gets signed.

use crate::{BlockHash, Hash, Round, VoteChoice};

/// Fixed protocol salt mixed into every vote signature hash.
pub const SIGNING_SALT: [u8; 16] = [
    0x4D, 0x48, 0x7A, 0x52, 0x5D, 0x4D, 0x37, 0x78, 0x42, 0x36, 0x5B, 0x64, 0x44, 0x79, 0x59,
    0x4F,
];

fn update_choice(hasher: &mut blake3::Hasher, choice: &VoteChoice) {
    hasher.update(choice.subject.as_bytes());
    hasher.update(&choice.decision.to_i8().to_le_bytes());
}

/// Signature hash of a round vote.
pub fn round_vote_signature_hash(tip: BlockHash, round: Round, choice: &VoteChoice) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(tip.hash().as_bytes());
    hasher.update(&round.to_le_bytes());
    update_choice(&mut hasher, choice);
    hasher.update(&SIGNING_SALT);
    Hash::from_bytes(*hasher.finalize().as_bytes())
}

/// Signature hash of an aggregated transaction vote.
///
/// The choice count is part of the preimage so that concatenated choice
/// lists cannot collide.
pub fn tx_vote_signature_hash(tip: BlockHash, round: Round, choices: &[VoteChoice]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(tip.hash().as_bytes());
    hasher.update(&round.to_le_bytes());
    hasher.update(&(choices.len() as u64).to_le_bytes());
    for choice in choices {
        update_choice(&mut hasher, choice);
    }
    hasher.update(&SIGNING_SALT);
    Hash::from_bytes(*hasher.finalize().as_bytes())
}
