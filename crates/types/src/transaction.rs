//! Instant transaction wrapper.

use crate::{Hash, TxId};

/// An instant-finality transaction as seen by the voting core.
///
/// The voter never interprets the payload; it forwards transactions to the
/// host's validator and tracks them by id. The id is content-addressed and
/// cached at construction.
#[derive(Clone)]
pub struct Transaction {
    /// Opaque serialized transaction payload.
    payload: Vec<u8>,

    /// Whether this transaction requested instant finality. Only instant
    /// transactions enter the voting core.
    pub instant: bool,

    /// Cached content hash of the payload.
    id: TxId,
}

impl Transaction {
    /// Create a transaction from its serialized payload.
    pub fn new(payload: Vec<u8>, instant: bool) -> Self {
        let id = TxId(Hash::digest(&payload));
        Self {
            payload,
            instant,
            id,
        }
    }

    /// Get the transaction id (content-addressed).
    pub fn id(&self) -> TxId {
        self.id
    }

    /// Get the serialized payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

// Compare by id - the id commits to the payload.
impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Transaction {}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id)
            .field("instant", &self.instant)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}
