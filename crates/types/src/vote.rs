//! Vote model: choices, transaction votes, round votes.

use crate::{BlockHash, Hash, Round, VoterId};
use std::fmt;

/// Size of a compact recoverable signature on a vote.
pub const COMPACT_SIGNATURE_SIZE: usize = 65;

/// Decision carried by a vote choice.
///
/// Wire numbering is normative: `YES=1, PASS=2, NO=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i8)]
pub enum Decision {
    Yes = 1,
    Pass = 2,
    No = 3,
}

impl Decision {
    /// Wire representation.
    pub fn to_i8(self) -> i8 {
        self as i8
    }

    /// Parse the wire representation.
    pub fn from_i8(v: i8) -> Option<Self> {
        match v {
            1 => Some(Decision::Yes),
            2 => Some(Decision::Pass),
            3 => Some(Decision::No),
            _ => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Decision::Yes => "YES",
            Decision::Pass => "PASS",
            Decision::No => "NO",
        };
        f.write_str(s)
    }
}

/// A single vote choice: a subject hash plus a decision.
///
/// In a round vote, a PASS must carry the zero subject and NO never occurs.
/// In a transaction vote the subject is always the transaction id, whatever
/// the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VoteChoice {
    /// What is being voted on: a transaction id or a vice-block hash,
    /// depending on the vote kind. Zero for a round-vote PASS.
    pub subject: Hash,
    /// The decision.
    pub decision: Decision,
}

impl VoteChoice {
    /// Create a choice.
    pub fn new(subject: Hash, decision: Decision) -> Self {
        VoteChoice { subject, decision }
    }

    /// A YES choice for the given subject.
    pub fn yes(subject: Hash) -> Self {
        Self::new(subject, Decision::Yes)
    }

    /// A NO choice for the given subject.
    pub fn no(subject: Hash) -> Self {
        Self::new(subject, Decision::No)
    }

    /// The round-vote PASS choice, carrying the zero subject.
    pub fn pass() -> Self {
        Self::new(Hash::ZERO, Decision::Pass)
    }
}

/// Compact recoverable signature over a vote's signature hash.
///
/// The voter treats this as opaque metadata required for relay; signature
/// verification happens in the transport layer before a vote reaches the
/// voter.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoteSignature([u8; COMPACT_SIGNATURE_SIZE]);

impl VoteSignature {
    /// All-zero signature, for locally constructed votes before signing.
    pub fn zero() -> Self {
        VoteSignature([0u8; COMPACT_SIGNATURE_SIZE])
    }

    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; COMPACT_SIGNATURE_SIZE]) -> Self {
        VoteSignature(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; COMPACT_SIGNATURE_SIZE] {
        &self.0
    }
}

impl Default for VoteSignature {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for VoteSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sig:{}..", hex::encode(&self.0[..4]))
    }
}

/// A masternode's vote on one transaction.
///
/// Semantically: "voter V, with parent tip T, in round R, casts `choice` for
/// transaction `choice.subject`."
///
/// Equality covers the semantic fields only (voter, round, tip, choice);
/// the signature is relay metadata. Two votes by the same voter in the same
/// slot that compare unequal constitute a doublesign.
#[derive(Debug, Clone)]
pub struct TxVote {
    pub voter: VoterId,
    pub tip: BlockHash,
    pub round: Round,
    pub choice: VoteChoice,
    pub signature: VoteSignature,
}

impl PartialEq for TxVote {
    fn eq(&self, other: &Self) -> bool {
        self.voter == other.voter
            && self.round == other.round
            && self.tip == other.tip
            && self.choice == other.choice
    }
}

impl Eq for TxVote {}

/// A masternode's vote on the winning vice-block of a round.
///
/// Same shape as [`TxVote`]; `choice.subject` is a vice-block hash, or zero
/// for PASS. A NO decision is never valid in a round vote.
#[derive(Debug, Clone)]
pub struct RoundVote {
    pub voter: VoterId,
    pub tip: BlockHash,
    pub round: Round,
    pub choice: VoteChoice,
    pub signature: VoteSignature,
}

impl PartialEq for RoundVote {
    fn eq(&self, other: &Self) -> bool {
        self.voter == other.voter
            && self.round == other.round
            && self.tip == other.tip
            && self.choice == other.choice
    }
}

impl Eq for RoundVote {}
