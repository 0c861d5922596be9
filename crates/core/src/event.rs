//! Event types for the voting state machine.

use dpos_types::{BlockHash, RoundVote, Transaction, TxVote, ViceBlock};

/// All possible inputs to the voter.
///
/// Events are **passive data** - they describe something that happened. The
/// voter processes events and returns an [`Output`](crate::Output); it never
/// performs I/O itself.
#[derive(Debug, Clone)]
pub enum Event {
    /// The parent chain advanced to a new tip. Finalizes the previous voting
    /// namespace.
    TipUpdated { tip: BlockHash },

    /// An instant transaction arrived (from the host mempool or a peer).
    TransactionReceived { tx: Transaction },

    /// A candidate next block arrived.
    ViceBlockReceived { block: ViceBlock },

    /// A transaction vote arrived. Voter identity was authenticated by the
    /// transport layer.
    TxVoteReceived { vote: TxVote },

    /// A round vote arrived. Voter identity was authenticated by the
    /// transport layer.
    RoundVoteReceived { vote: RoundVote },

    /// The external round timer expired without progress.
    RoundTooLong,
}

impl Event {
    /// Get the event type name for telemetry.
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::TipUpdated { .. } => "TipUpdated",
            Event::TransactionReceived { .. } => "TransactionReceived",
            Event::ViceBlockReceived { .. } => "ViceBlockReceived",
            Event::TxVoteReceived { .. } => "TxVoteReceived",
            Event::RoundVoteReceived { .. } => "RoundVoteReceived",
            Event::RoundTooLong => "RoundTooLong",
        }
    }

    /// Check if this event came from the network (as opposed to the host).
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Event::ViceBlockReceived { .. }
                | Event::TxVoteReceived { .. }
                | Event::RoundVoteReceived { .. }
        )
    }
}
