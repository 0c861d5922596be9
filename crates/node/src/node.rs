//! The host-facing node: one lock around one voter.

use crate::RelayMap;
use dpos_archive::{Archive, ArchiveError};
use dpos_core::{Output, World};
use dpos_messages::{Inventory, RoundVoteMessage, TxVoteMessage};
use dpos_types::{
    BlockHash, ConsensusParams, Hash, RoundVote, Transaction, TxId, TxVote, ViceBlock, VoterId,
};
use dpos_voter::Voter;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Records first observed during this session, pending archive write-back.
#[derive(Debug, Default)]
struct SessionLog {
    vice_blocks: BTreeMap<Hash, ViceBlock>,
    round_votes: BTreeMap<Hash, RoundVote>,
    tx_votes: BTreeMap<Hash, TxVote>,
}

/// Owns the voter, the archive and the relay bookkeeping.
///
/// The voter is guarded by a single exclusive lock for the duration of each
/// entry-point call; the relay map and session log run under their own locks
/// and are never touched from inside the voter.
pub struct Node<W, A> {
    voter: Mutex<Voter<W>>,
    archive: A,
    session: Mutex<SessionLog>,
    relay: Mutex<RelayMap>,
}

impl<W: World, A: Archive> Node<W, A> {
    /// Create a node around a fresh voter.
    pub fn new(world: W, archive: A, params: ConsensusParams) -> Self {
        Self {
            voter: Mutex::new(Voter::new(world, params)),
            archive,
            session: Mutex::new(SessionLog::default()),
            relay: Mutex::new(RelayMap::new()),
        }
    }

    /// Set this node's identity and whether it actively votes.
    pub fn set_voting(&self, am_i_voter: bool, me: VoterId) {
        self.voter.lock().set_voting(am_i_voter, me);
    }

    /// Advance the parent tip.
    pub fn update_tip(&self, tip: BlockHash) {
        self.voter.lock().update_tip(tip);
    }

    /// Feed an instant transaction (from the mempool or a fetch response).
    pub fn submit_transaction(&self, tx: Transaction) -> Output {
        let out = self.voter.lock().apply_tx(tx);
        self.record_output(&out);
        out
    }

    /// Feed a vice-block received from the network.
    pub fn receive_vice_block(&self, block: ViceBlock) -> Output {
        let key = block.hash().hash();
        let record = block.clone();
        let out = self.voter.lock().apply_vice_block(block);
        if out.errors.is_empty() {
            self.session.lock().vice_blocks.insert(key, record);
        }
        self.record_output(&out);
        out
    }

    /// Feed a transaction vote received from the network.
    pub fn receive_tx_vote(&self, vote: TxVote) -> Output {
        let key = TxVoteMessage::from_vote(&vote).hash();
        let record = vote.clone();
        let out = self.voter.lock().apply_tx_vote(vote);
        if out.errors.is_empty() {
            self.session.lock().tx_votes.insert(key, record);
        }
        self.record_output(&out);
        out
    }

    /// Feed a round vote received from the network.
    pub fn receive_round_vote(&self, vote: RoundVote) -> Output {
        let key = RoundVoteMessage::from_vote(&vote).hash();
        let record = vote.clone();
        let out = self.voter.lock().apply_round_vote(vote);
        if out.errors.is_empty() {
            self.session.lock().round_votes.insert(key, record);
        }
        self.record_output(&out);
        out
    }

    /// The external round timer fired.
    pub fn on_round_too_long(&self) -> Output {
        let out = self.voter.lock().on_round_too_long();
        self.record_output(&out);
        out
    }

    /// Whether this object still needs relaying; true exactly once per
    /// fifteen-minute window.
    pub fn should_relay(&self, inv: Inventory) -> bool {
        self.relay.lock().should_relay(inv)
    }

    /// Replay archived records through the voter. Call once on startup,
    /// after `set_voting` and the initial `update_tip`. The returned output
    /// aggregates whatever the replay provoked (usually nothing the host
    /// needs to re-broadcast).
    pub fn replay(&self) -> Result<Output, ArchiveError> {
        let mut out = Output::empty();
        {
            let mut voter = self.voter.lock();

            let mut count = 0usize;
            self.archive.load_vice_blocks(&mut |_, block| {
                out += voter.apply_vice_block(block);
                count += 1;
            })?;
            debug!(count, "Replayed archived vice-blocks");

            count = 0;
            self.archive.load_round_votes(&mut |_, vote| {
                out += voter.apply_round_vote(vote);
                count += 1;
            })?;
            debug!(count, "Replayed archived round votes");

            count = 0;
            self.archive.load_tx_votes(&mut |_, vote| {
                out += voter.apply_tx_vote(vote);
                count += 1;
            })?;
            debug!(count, "Replayed archived tx votes");
        }
        Ok(out)
    }

    /// Write back records first observed during this session. Call on
    /// shutdown.
    pub fn flush(&self) -> Result<(), ArchiveError> {
        let session = std::mem::take(&mut *self.session.lock());
        info!(
            vice_blocks = session.vice_blocks.len(),
            round_votes = session.round_votes.len(),
            tx_votes = session.tx_votes.len(),
            "Flushing session records to archive"
        );
        for (key, block) in &session.vice_blocks {
            self.archive.write_vice_block(*key, block)?;
        }
        for (key, vote) in &session.round_votes {
            self.archive.write_round_vote(*key, vote)?;
        }
        for (key, vote) in &session.tx_votes {
            self.archive.write_tx_vote(*key, vote)?;
        }
        Ok(())
    }

    /// Transactions the committee has progressed past voting on.
    pub fn list_committed_txs(&self) -> BTreeMap<TxId, Transaction> {
        self.voter.lock().list_committed_txs()
    }

    /// Whether the committee has progressed past voting on this transaction.
    pub fn is_committed_tx(&self, tx: &Transaction) -> bool {
        self.voter.lock().is_committed_tx(tx)
    }

    /// The current round on the current tip.
    pub fn current_round(&self) -> dpos_types::Round {
        self.voter.lock().current_round()
    }

    /// Whether this node is an active committee member.
    pub fn check_am_i_voter(&self) -> bool {
        self.voter.lock().check_am_i_voter()
    }

    /// Self-emitted votes also belong in the session log: the node must not
    /// forget its own decisions across a restart.
    fn record_output(&self, out: &Output) {
        if out.tx_votes.is_empty() && out.round_votes.is_empty() {
            return;
        }
        let mut session = self.session.lock();
        for vote in &out.tx_votes {
            let key = TxVoteMessage::from_vote(vote).hash();
            session.tx_votes.insert(key, vote.clone());
        }
        for vote in &out.round_votes {
            let key = RoundVoteMessage::from_vote(vote).hash();
            session.round_votes.insert(key, vote.clone());
        }
    }
}
