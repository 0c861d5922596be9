//! The per-tip voting state machine.
//!
//! One [`Voter`] instance runs the whole voting epoch for the current parent
//! tip: it ingests transactions, vice-blocks and votes, decides this
//! masternode's own votes, and reports everything the host must do through
//! [`Output`]. Every entry point is a synchronous pure function of the
//! accumulated input: replaying the same event sequence on a fresh instance
//! yields identical outputs on every honest node.

use crate::state::TipState;
use crate::tally::{
    check_round_stalemate, check_tx_not_committable, RoundVotingStats, TxVotingStats,
};
use dpos_core::{BlockToSubmit, Event, Misbehavior, Output, World};
use dpos_types::{
    BlockHash, ConsensusParams, Decision, Round, RoundVote, Transaction, TxId, TxVote,
    ViceBlock, VoteChoice, VoteSignature, VoterId,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument, warn};

/// Transactions this masternode has YES-voted, plus the ones it YES-voted
/// but no longer holds. Voting is deferred while anything is missing: without
/// the full approved set the voter cannot detect conflicts and could
/// doublesign by accident.
#[derive(Debug, Default)]
struct ApprovedTxs {
    txs: BTreeMap<TxId, Transaction>,
    missing: BTreeSet<TxId>,
}

/// The voting state machine.
///
/// Owns the per-tip vote store and the instant-transaction pool. All I/O is
/// behind the injected [`World`] callbacks, which must be synchronous and
/// side-effect-free with respect to voter state.
pub struct Voter<W> {
    /// Current parent tip. Votes for other tips are stored for archiving
    /// only.
    tip: BlockHash,

    /// This masternode's identity.
    me: VoterId,

    /// Whether this node is an active committee member. When false the voter
    /// only collects state.
    am_i_voter: bool,

    /// Committee size and quorum threshold.
    params: ConsensusParams,

    /// Known instant transactions, ordered by id.
    txs: BTreeMap<TxId, Transaction>,

    /// Per-tip stores, created lazily on first access.
    v: BTreeMap<BlockHash, TipState>,

    /// Host callbacks.
    world: W,
}

impl<W> std::fmt::Debug for Voter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Voter")
            .field("tip", &self.tip)
            .field("me", &self.me)
            .field("am_i_voter", &self.am_i_voter)
            .field("txs", &self.txs.len())
            .field("tips", &self.v.len())
            .finish()
    }
}

impl<W: World> Voter<W> {
    /// Create a voter with no tip and no identity. The host calls
    /// [`set_voting`](Self::set_voting) and [`update_tip`](Self::update_tip)
    /// before feeding events.
    pub fn new(world: W, params: ConsensusParams) -> Self {
        Self {
            tip: BlockHash::ZERO,
            me: VoterId::default(),
            am_i_voter: false,
            params,
            txs: BTreeMap::new(),
            v: BTreeMap::new(),
            world,
        }
    }

    /// Set this node's identity and whether it actively votes.
    pub fn set_voting(&mut self, am_i_voter: bool, me: VoterId) {
        self.am_i_voter = am_i_voter;
        self.me = me;
    }

    /// Current parent tip.
    pub fn tip(&self) -> BlockHash {
        self.tip
    }

    /// This masternode's identity.
    pub fn me(&self) -> VoterId {
        self.me
    }

    /// Whether this node is an active committee member.
    pub fn check_am_i_voter(&self) -> bool {
        self.am_i_voter
    }

    /// Consensus parameters.
    pub fn params(&self) -> &ConsensusParams {
        &self.params
    }

    /// Whether the transaction pool holds the given id.
    pub fn has_tx(&self, txid: TxId) -> bool {
        self.txs.contains_key(&txid)
    }

    /// The per-tip store for the current tip, if any input arrived for it.
    pub fn tip_state(&self) -> Option<&TipState> {
        self.v.get(&self.tip)
    }

    /// Dispatch a single event to the matching handler.
    pub fn handle(&mut self, event: Event) -> Output {
        match event {
            Event::TipUpdated { tip } => {
                self.update_tip(tip);
                Output::empty()
            }
            Event::TransactionReceived { tx } => self.apply_tx(tx),
            Event::ViceBlockReceived { block } => self.apply_vice_block(block),
            Event::TxVoteReceived { vote } => self.apply_tx_vote(vote),
            Event::RoundVoteReceived { vote } => self.apply_round_vote(vote),
            Event::RoundTooLong => self.on_round_too_long(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Event handlers
    // ═══════════════════════════════════════════════════════════════════════

    /// Swap to a new parent tip, dropping finished transactions so memory
    /// does not grow unbounded across tips.
    #[instrument(skip(self), fields(tip = ?tip))]
    pub fn update_tip(&mut self, tip: BlockHash) {
        if !self.tip.is_zero() {
            let round = self.current_round();
            let mut kept = std::mem::take(&mut self.txs);
            self.filter_finished_txs(&mut kept, round);
            self.txs = kept;
        }
        self.tip = tip;
    }

    /// Ingest an instant transaction.
    ///
    /// If votes referencing it arrived first (a "lost" transaction), the
    /// whole voting pipeline re-runs; otherwise only this transaction is
    /// considered.
    #[instrument(skip(self, tx), fields(txid = ?tx.id()))]
    pub fn apply_tx(&mut self, tx: Transaction) -> Output {
        assert!(tx.instant, "only instant transactions enter the voting core");

        let txid = tx.id();
        let mut single = BTreeMap::new();
        single.insert(txid, tx.clone());
        if !self.world.validate_txs(&single) {
            debug!(%txid, "Received invalid tx");
            return Output::empty();
        }

        let was_lost = self.was_tx_lost(txid);
        self.txs.insert(txid, tx.clone());

        let mut out = Output::empty();
        if was_lost {
            out += self.do_txs_voting();
            out += self.do_round_voting();
        } else {
            out += self.vote_for_tx(&tx);
        }
        out
    }

    /// Ingest a candidate next block.
    #[instrument(skip(self, block), fields(hash = ?block.hash(), round = block.round))]
    pub fn apply_vice_block(&mut self, block: ViceBlock) -> Output {
        if !self
            .world
            .validate_block(&block, &BTreeMap::new(), false)
        {
            return Output::misbehaving(Misbehavior::InvalidViceBlock {
                block: block.hash(),
            });
        }

        if block.prev_block != self.tip && !self.world.allow_archiving(block.prev_block) {
            debug!("Ignoring too old vice-block");
            return Output::empty();
        }

        let hash = block.hash();
        let tip = block.prev_block;
        let block_round = block.round;
        let namespace = self.v.entry(tip).or_default();
        if namespace.vice_blocks.contains_key(&hash) {
            debug!("Ignoring duplicating vice-block");
            return Output::empty();
        }
        namespace.vice_blocks.insert(hash, block);

        if tip != self.tip {
            // Kept for archiving only.
            return Output::empty();
        }
        if block_round != self.current_round() {
            debug!("Ignoring vice-block from prev. round");
            return Output::empty();
        }

        info!(?hash, "Received vice-block");
        self.do_round_voting()
    }

    /// Ingest a transaction vote.
    #[instrument(skip(self, vote), fields(voter = ?vote.voter, round = vote.round))]
    pub fn apply_tx_vote(&mut self, vote: TxVote) -> Output {
        if vote.tip != self.tip && !self.world.allow_archiving(vote.tip) {
            debug!(tip = ?vote.tip, "Ignoring too old transaction vote");
            return Output::empty();
        }

        let txid = TxId(vote.choice.subject);
        debug!(%txid, "Received transaction vote");

        let tx_voting = self
            .v
            .entry(vote.tip)
            .or_default()
            .tx_votes
            .entry(vote.round)
            .or_default()
            .entry(txid)
            .or_default();

        if let Some(existing) = tx_voting.get(&vote.voter) {
            if *existing != vote {
                warn!(voter = ?vote.voter, %txid, "MISBEHAVING MASTERNODE! doublesign, tx voting");
                return Output::misbehaving(Misbehavior::TxDoublesign {
                    voter: vote.voter,
                    subject: txid,
                    round: vote.round,
                });
            }
            debug!("Ignoring duplicating transaction vote");
            return Output::empty();
        }

        let for_current_tip = vote.tip == self.tip;
        tx_voting.insert(vote.voter, vote);
        if !for_current_tip {
            return Output::empty();
        }

        let mut out = Output::empty();
        if !self.txs.contains_key(&txid) {
            // Request the missing tx.
            out.tx_requests.push(txid);
        }
        out + self.do_round_voting()
    }

    /// Ingest a round vote.
    #[instrument(skip(self, vote), fields(voter = ?vote.voter, round = vote.round))]
    pub fn apply_round_vote(&mut self, vote: RoundVote) -> Output {
        if vote.tip != self.tip && !self.world.allow_archiving(vote.tip) {
            debug!(tip = ?vote.tip, "Ignoring too old round vote");
            return Output::empty();
        }

        debug!(subject = ?vote.choice.subject, "Received round vote");

        let round_voting = self
            .v
            .entry(vote.tip)
            .or_default()
            .round_votes
            .entry(vote.round)
            .or_default();

        if let Some(existing) = round_voting.get(&vote.voter) {
            if *existing != vote {
                warn!(voter = ?vote.voter, "MISBEHAVING MASTERNODE! doublesign, round voting");
                return Output::misbehaving(Misbehavior::RoundDoublesign {
                    voter: vote.voter,
                    round: vote.round,
                });
            }
            debug!("Ignoring duplicating round vote");
            return Output::empty();
        }
        if vote.choice.decision == Decision::Pass && !vote.choice.subject.is_zero() {
            warn!(voter = ?vote.voter, "MISBEHAVING MASTERNODE! malformed vote subject");
            return Output::misbehaving(Misbehavior::MalformedVoteSubject {
                voter: vote.voter,
                round: vote.round,
            });
        }
        if vote.choice.decision == Decision::No {
            warn!(voter = ?vote.voter, "MISBEHAVING MASTERNODE! malformed vote decision");
            return Output::misbehaving(Misbehavior::MalformedVoteDecision {
                voter: vote.voter,
                round: vote.round,
            });
        }

        let for_current_tip = vote.tip == self.tip;
        let decision = vote.choice.decision;
        let subject = vote.choice.subject;
        let round = vote.round;
        round_voting.insert(vote.voter, vote);

        if !for_current_tip {
            return Output::empty();
        }

        let mut out = Output::empty();

        // Check the voting result after the vote landed.
        let stats = self.calc_round_voting_stats(round);
        if check_round_stalemate(&stats, &self.params) {
            info!(round = self.current_round(), "New round");
            out += self.do_txs_voting();
            out += self.do_round_voting();
        }
        out += self.do_round_voting();
        if decision == Decision::Yes {
            out += self.try_to_submit_block(BlockHash(subject));
        }

        out
    }

    /// Forced PASS: the external round timer fired without progress.
    #[instrument(skip(self))]
    pub fn on_round_too_long(&mut self) -> Output {
        if !self.am_i_voter {
            return Output::empty();
        }
        let round = self.current_round();
        let mut out = Output::empty();
        if !self.was_voted_by_me_round(round) {
            let vote = RoundVote {
                voter: self.me,
                tip: self.tip,
                round,
                choice: VoteChoice::pass(),
                signature: VoteSignature::zero(),
            };
            out.round_votes.push(vote.clone());
            out += self.apply_round_vote(vote);
        }
        out
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Decision engine
    // ═══════════════════════════════════════════════════════════════════════

    /// Vote for the winning vice-block of the current round, if this node
    /// can do so safely.
    fn do_round_voting(&mut self) -> Output {
        if !self.am_i_voter {
            return Output::empty();
        }

        let mut out = Output::empty();
        let round = self.current_round();
        let stats = self.calc_round_voting_stats(round);

        let my_txs = self.list_approved_by_me_txs();
        if !my_txs.missing.is_empty() {
            // Voting is forbidden while an approved-by-me tx is missing:
            // without it, conflicts with the approved set are undetectable
            // and an accidental doublesign becomes possible.
            out.tx_requests.extend(my_txs.missing.iter().copied());
            return out;
        }

        let mut unfinished = my_txs.txs;
        self.filter_finished_txs(&mut unfinished, round);
        if !unfinished.is_empty() {
            debug!(
                count = unfinished.len(),
                "Can't do round voting, approved-by-me txs aren't finished"
            );
            return out;
        }

        if self.was_voted_by_me_round(round) {
            debug!("Round was already voted by me");
            return out;
        }

        // Candidates ordered by (YES count descending, hash ascending).
        let mut sorted_vice_blocks: Vec<(usize, BlockHash)> = self
            .tip_state()
            .map(|state| {
                state
                    .vice_blocks
                    .keys()
                    .map(|hash| (stats.pro.get(hash).copied().unwrap_or(0), *hash))
                    .collect()
            })
            .unwrap_or_default();
        sorted_vice_blocks.sort_by(|l, r| r.0.cmp(&l.0).then(l.1.cmp(&r.1)));

        // The committed list may be not full, which is fine.
        let committed_txs = self.list_committed_txs();
        let mut vice_block_to_vote = None;
        if let Some(state) = self.tip_state() {
            for (_, hash) in &sorted_vice_blocks {
                let vice_block = &state.vice_blocks[hash];
                if vice_block.round == round
                    && self.world.validate_block(vice_block, &committed_txs, true)
                {
                    vice_block_to_vote = Some(*hash);
                    break;
                }
            }
        }

        if let Some(subject) = vice_block_to_vote {
            info!(?subject, round, "Vote for vice block");
            let vote = RoundVote {
                voter: self.me,
                tip: self.tip,
                round,
                choice: VoteChoice::yes(subject.hash()),
                signature: VoteSignature::zero(),
            };
            out.round_votes.push(vote.clone());
            out += self.apply_round_vote(vote);
        } else {
            debug!("Suitable vice block wasn't found");
        }

        out
    }

    /// Decide this node's vote on one transaction.
    fn vote_for_tx(&mut self, tx: &Transaction) -> Output {
        if !self.am_i_voter {
            return Output::empty();
        }
        let txid = tx.id();
        let mut out = Output::empty();
        let round = self.current_round();

        if self.was_voted_by_me_tx(txid, round) {
            debug!(%txid, "Tx was already voted by me");
            return out;
        }

        let my_txs = self.list_approved_by_me_txs();
        if !my_txs.missing.is_empty() {
            // Same doublesign hazard as in round voting: the approved set
            // must be complete before any new decision.
            out.tx_requests.extend(my_txs.missing.iter().copied());
            return out;
        }

        let mut decision = Decision::Yes;

        let mut mine = my_txs.txs;
        mine.insert(txid, tx.clone());
        if !self.world.validate_txs(&mine) {
            // Conflicts with what I already approved.
            decision = Decision::No;
        } else {
            // Checking against the committed set is not strictly required,
            // but it speeds up the consensus. The committed list may be not
            // full, which is fine.
            let mut committed = self.list_committed_txs();
            committed.insert(txid, tx.clone());
            if !self.world.validate_txs(&committed) {
                decision = Decision::No;
            }
        }

        if decision == Decision::Yes && self.was_voted_by_me_round(round) {
            decision = Decision::Pass;
        }
        if decision == Decision::Yes && self.at_least_one_vice_block_is_valid(round) {
            decision = Decision::Pass;
        }

        let vote = TxVote {
            voter: self.me,
            tip: self.tip,
            round,
            choice: VoteChoice::new(txid.hash(), decision),
            signature: VoteSignature::zero(),
        };
        out.tx_votes.push(vote.clone());
        out += self.apply_tx_vote(vote);

        out
    }

    /// Run [`vote_for_tx`](Self::vote_for_tx) over the whole pool.
    fn do_txs_voting(&mut self) -> Output {
        if !self.am_i_voter {
            return Output::empty();
        }
        debug!("do_txs_voting");
        let mut out = Output::empty();
        let pool: Vec<Transaction> = self.txs.values().cloned().collect();
        for tx in &pool {
            out += self.vote_for_tx(tx);
        }
        out
    }

    /// Emit the block if the given vice-block reached round quorum and still
    /// validates.
    fn try_to_submit_block(&self, vice_block_id: BlockHash) -> Output {
        let mut out = Output::empty();
        let round = self.current_round();
        let stats = self.calc_round_voting_stats(round);

        if stats.pro.get(&vice_block_id).copied().unwrap_or(0) >= self.params.min_quorum() {
            let Some(state) = self.tip_state() else {
                return out;
            };
            let Some(vice_block) = state.vice_blocks.get(&vice_block_id) else {
                return out;
            };
            if vice_block.round != round {
                return out;
            }
            // The committed list may be not full, which is fine.
            if !self
                .world
                .validate_block(vice_block, &self.list_committed_txs(), true)
            {
                return out;
            }

            info!(?vice_block_id, "Submit block");
            let approved_by: Vec<VoterId> = state
                .round_votes
                .get(&round)
                .map(|by_voter| by_voter.keys().copied().collect())
                .unwrap_or_default();
            out.block_to_submit = Some(BlockToSubmit {
                block: vice_block.clone(),
                approved_by,
            });
        }

        out
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    /// The smallest round that is not in stalemate. Monotonically
    /// non-decreasing while the tip is fixed.
    pub fn current_round(&self) -> Round {
        let mut round: Round = 1;
        loop {
            let stats = self.calc_round_voting_stats(round);
            if !check_round_stalemate(&stats, &self.params) {
                return round;
            }
            round += 1;
        }
    }

    /// Transactions the committee has progressed past voting on.
    pub fn list_committed_txs(&self) -> BTreeMap<TxId, Transaction> {
        let round = self.current_round();
        let mut res = BTreeMap::new();
        for (txid, tx) in &self.txs {
            let stats = self.calc_tx_voting_stats(*txid, round);
            if stats.pro >= self.params.min_quorum() {
                res.insert(*txid, tx.clone());
            }
        }
        res
    }

    /// Whether the committee has progressed past voting on this transaction.
    pub fn is_committed_tx(&self, tx: &Transaction) -> bool {
        let round = self.current_round();
        let stats = self.calc_tx_voting_stats(tx.id(), round);
        stats.pro >= self.params.min_quorum()
    }

    /// Whether this node has YES-voted the transaction (or YES-voted it and
    /// lost it since).
    pub fn is_tx_approved_by_me(&self, tx: &Transaction) -> bool {
        let my_txs = self.list_approved_by_me_txs();
        let txid = tx.id();
        my_txs.txs.contains_key(&txid) || my_txs.missing.contains(&txid)
    }

    /// Vote distribution for one transaction.
    ///
    /// `pro` counts every round-vote YES across the tip's rounds: a
    /// transaction is committed once the committee has cast `min_quorum`
    /// round votes, which encodes that it progressed past voting on it.
    pub fn calc_tx_voting_stats(&self, txid: TxId, _round: Round) -> TxVotingStats {
        let mut stats = TxVotingStats::default();
        let Some(state) = self.v.get(&self.tip) else {
            return stats;
        };

        for by_voter in state.round_votes.values() {
            for vote in by_voter.values() {
                match vote.choice.decision {
                    Decision::Yes => stats.pro += 1,
                    Decision::No => stats.contra += 1,
                    Decision::Pass => {
                        if vote.choice.subject == txid.hash() {
                            stats.abstinendi += 1;
                        }
                    }
                }
            }
        }

        stats
    }

    /// Vote distribution for one round.
    pub fn calc_round_voting_stats(&self, round: Round) -> RoundVotingStats {
        let mut stats = RoundVotingStats::default();
        let Some(by_voter) = self
            .v
            .get(&self.tip)
            .and_then(|state| state.round_votes.get(&round))
        else {
            return stats;
        };

        for vote in by_voter.values() {
            // Sanity checks live here so they don't get copy-pasted around.
            debug_assert_eq!(vote.round, round);
            debug_assert_eq!(vote.tip, self.tip);
            debug_assert_ne!(vote.choice.decision, Decision::No);

            match vote.choice.decision {
                Decision::Yes => {
                    *stats.pro.entry(BlockHash(vote.choice.subject)).or_insert(0) += 1;
                }
                Decision::Pass => {
                    debug_assert!(vote.choice.subject.is_zero());
                    stats.abstinendi += 1;
                }
                Decision::No => {}
            }
        }

        stats
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Internals
    // ═══════════════════════════════════════════════════════════════════════

    /// Whether this node has a binding vote on the transaction: any vote in
    /// the given round, or a YES/NO in any other round (those stay active
    /// across rounds; PASS is non-binding).
    fn was_voted_by_me_tx(&self, txid: TxId, round: Round) -> bool {
        let Some(state) = self.v.get(&self.tip) else {
            return false;
        };

        if state.tx_vote(round, txid, &self.me).is_some() {
            return true;
        }

        for by_tx in state.tx_votes.values() {
            if let Some(vote) = by_tx.get(&txid).and_then(|by_voter| by_voter.get(&self.me)) {
                if vote.choice.decision != Decision::Pass {
                    return true;
                }
            }
        }

        false
    }

    /// Whether this node already cast a round vote in the given round.
    fn was_voted_by_me_round(&self, round: Round) -> bool {
        self.v
            .get(&self.tip)
            .and_then(|state| state.round_vote(round, &self.me))
            .is_some()
    }

    /// Collect the transactions this node YES-voted across all rounds of the
    /// current tip, noting the ones missing from the pool.
    fn list_approved_by_me_txs(&self) -> ApprovedTxs {
        let mut res = ApprovedTxs::default();
        let Some(state) = self.v.get(&self.tip) else {
            return res;
        };

        for (round, by_tx) in &state.tx_votes {
            for by_voter in by_tx.values() {
                let Some(vote) = by_voter.get(&self.me) else {
                    continue;
                };
                debug_assert_eq!(vote.round, *round);
                debug_assert_eq!(vote.tip, self.tip);
                debug_assert_eq!(vote.voter, self.me);

                if vote.choice.decision == Decision::Yes {
                    let txid = TxId(vote.choice.subject);
                    match self.txs.get(&txid) {
                        Some(tx) => {
                            res.txs.insert(txid, tx.clone());
                        }
                        None => {
                            // Can happen after reindex, if not all txs were
                            // downloaded yet.
                            warn!(%txid, "Approved tx not found in the pool");
                            res.missing.insert(txid);
                        }
                    }
                }
            }
        }

        res
    }

    /// Whether any current-round vice-block validates against the committed
    /// set.
    fn at_least_one_vice_block_is_valid(&self, round: Round) -> bool {
        let Some(state) = self.tip_state() else {
            return false;
        };
        if state.vice_blocks.is_empty() {
            return false;
        }

        // The committed list may be not full, which is fine.
        let committed_txs = self.list_committed_txs();
        state.vice_blocks.values().any(|vice_block| {
            vice_block.round == round && self.world.validate_block(vice_block, &committed_txs, true)
        })
    }

    /// A transaction is lost when votes reference it but the pool does not
    /// hold it.
    fn was_tx_lost(&self, txid: TxId) -> bool {
        if self.txs.contains_key(&txid) {
            return false;
        }
        self.v
            .get(&self.tip)
            .map(|state| state.tx_has_any_vote(txid))
            .unwrap_or(false)
    }

    /// Drop finished transactions (committed or no longer committable) from
    /// the given set.
    fn filter_finished_txs(&self, txs: &mut BTreeMap<TxId, Transaction>, round: Round) {
        txs.retain(|txid, _| {
            let stats = self.calc_tx_voting_stats(*txid, round);
            let not_committable = check_tx_not_committable(&stats, &self.params);
            let committed = stats.pro >= self.params.min_quorum();
            !(not_committable || committed)
        });
    }
}
