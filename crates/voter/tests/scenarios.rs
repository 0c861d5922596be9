//! End-to-end scenarios on a four-masternode committee with quorum three.

mod common;

use common::*;
use dpos_core::Misbehavior;
use dpos_types::test_utils::*;
use dpos_types::{BlockHash, Decision, ViceBlock};
use tracing_test::traced_test;

/// Feed a vice-block to M1, collect its own YES, then two more YES votes:
/// the third one must produce the block ready for submission.
#[test]
#[traced_test]
fn happy_path_submits_block() {
    let mut voter = make_voter(TestWorld::new());
    let block = test_vice_block(tip(), 1);

    // M1 sees the candidate and votes for it.
    let out = voter.apply_vice_block(block.clone());
    assert_eq!(out.round_votes.len(), 1);
    let my_vote = &out.round_votes[0];
    assert_eq!(my_vote.voter, m(1));
    assert_eq!(my_vote.round, 1);
    assert_eq!(my_vote.choice.decision, Decision::Yes);
    assert_eq!(my_vote.choice.subject, block.hash().hash());
    assert!(out.block_to_submit.is_none());

    // Second YES: two of four, no quorum yet.
    let out = voter.apply_round_vote(yes_round_vote(m(2), 1, block.hash()));
    assert!(out.block_to_submit.is_none());

    // Third YES reaches quorum.
    let out = voter.apply_round_vote(yes_round_vote(m(3), 1, block.hash()));
    let submit = out.block_to_submit.expect("quorum must submit the block");
    assert_eq!(submit.block, block);
    for voter_id in [m(1), m(2), m(3)] {
        assert!(
            submit.approved_by.contains(&voter_id),
            "{voter_id} must be in the approval list"
        );
    }
}

/// Two different round votes from the same voter in one round: Byzantine.
/// The first vote stays; the second only yields misbehavior evidence.
#[test]
fn round_doublesign_is_detected() {
    let mut voter = make_observer(TestWorld::new());
    let b1 = ViceBlock::new(tip(), 1, vec![]);
    let b2 = ViceBlock::new(tip(), 1, vec![test_transaction(1)]);

    let first = yes_round_vote(m(2), 1, b1.hash());
    assert!(voter.apply_round_vote(first.clone()).is_empty());

    let out = voter.apply_round_vote(yes_round_vote(m(2), 1, b2.hash()));
    assert_eq!(
        out.errors,
        vec![Misbehavior::RoundDoublesign {
            voter: m(2),
            round: 1,
        }]
    );
    assert!(out.round_votes.is_empty());

    let stored = voter
        .tip_state()
        .and_then(|state| state.round_vote(1, &m(2)))
        .expect("first vote must remain");
    assert_eq!(*stored, first);
}

/// Same slot, different decision kind: a tx-vote doublesign.
#[test]
fn tx_doublesign_is_detected() {
    let mut voter = make_observer(TestWorld::new());
    let txid = test_transaction(7).id();

    let first = tx_vote(m(3), 1, txid, Decision::Yes);
    let out = voter.apply_tx_vote(first.clone());
    // The tx itself is unknown, so the voter asks for it.
    assert_eq!(out.tx_requests, vec![txid]);

    let out = voter.apply_tx_vote(tx_vote(m(3), 1, txid, Decision::No));
    assert_eq!(
        out.errors,
        vec![Misbehavior::TxDoublesign {
            voter: m(3),
            subject: txid,
            round: 1,
        }]
    );

    let stored = voter
        .tip_state()
        .and_then(|state| state.tx_vote(1, txid, &m(3)))
        .expect("first vote must remain");
    assert_eq!(*stored, first);
}

/// No vice-block suits M1 (the tx-set check fails), so the round stalls.
/// The timer forces a PASS; once the other three PASS as well, the round
/// advances.
#[test]
#[traced_test]
fn forced_pass_advances_round() {
    let world = TestWorld::new();
    world.block_txs_invalid.set(true);
    let mut voter = make_voter(world);

    // Candidate arrives but M1 cannot vote for it.
    let out = voter.apply_vice_block(test_vice_block(tip(), 1));
    assert!(out.round_votes.is_empty());

    // Timer fires: forced PASS with the zero subject.
    let out = voter.on_round_too_long();
    assert_eq!(out.round_votes.len(), 1);
    let pass = &out.round_votes[0];
    assert_eq!(pass.voter, m(1));
    assert_eq!(pass.choice.decision, Decision::Pass);
    assert!(pass.choice.subject.is_zero());

    // A second timer fire changes nothing: already voted this round.
    assert!(voter.on_round_too_long().is_empty());
    assert_eq!(voter.current_round(), 1);

    // The rest of the committee passes too; round one is now a stalemate.
    voter.apply_round_vote(pass_round_vote(m(2), 1));
    voter.apply_round_vote(pass_round_vote(m(3), 1));
    voter.apply_round_vote(pass_round_vote(m(4), 1));
    assert_eq!(voter.current_round(), 2);
}

/// A vote referencing an unknown transaction requests a fetch; delivering
/// the transaction afterwards makes M1 cast its own tx vote.
#[test]
fn lost_tx_is_requested_and_recovered() {
    let mut voter = make_voter(TestWorld::new());
    let tx = test_transaction(0x42);
    let txid = tx.id();

    let out = voter.apply_tx_vote(tx_vote(m(2), 1, txid, Decision::Yes));
    assert_eq!(out.tx_requests, vec![txid]);
    assert!(out.tx_votes.is_empty());

    let out = voter.apply_tx(tx);
    assert_eq!(out.tx_votes.len(), 1);
    let my_vote = &out.tx_votes[0];
    assert_eq!(my_vote.voter, m(1));
    assert_eq!(my_vote.choice.subject, txid.hash());
    assert_eq!(my_vote.choice.decision, Decision::Yes);
}

/// A transaction that conflicts with the approved-by-me set draws a NO.
#[test]
fn conflicting_tx_gets_no_vote() {
    let world = TestWorld::new();
    let mut voter = make_voter(world.clone());

    // M1 approves a first transaction.
    let accepted = voter.apply_tx(test_transaction(0x50));
    assert_eq!(accepted.tx_votes[0].choice.decision, Decision::Yes);

    // The second validates alone but conflicts with the approved set.
    let tx = test_transaction(0x51);
    world.conflict_tx.set(Some(tx.id()));
    let out = voter.apply_tx(tx.clone());
    assert_eq!(out.tx_votes.len(), 1);
    assert_eq!(out.tx_votes[0].choice.decision, Decision::No);
    assert_eq!(out.tx_votes[0].choice.subject, tx.id().hash());

    // An invalid transaction never even enters the pool.
    let bad = test_transaction(0x52);
    world.invalid_tx.set(Some(bad.id()));
    let out = voter.apply_tx(bad);
    assert!(out.is_empty());
}

/// PASS with a non-zero subject is malformed: misbehavior, nothing stored.
#[test]
fn malformed_round_vote_is_rejected() {
    let mut voter = make_observer(TestWorld::new());

    let mut vote = pass_round_vote(m(2), 1);
    vote.choice.subject = test_hash(0x13);
    let out = voter.apply_round_vote(vote);
    assert_eq!(
        out.errors,
        vec![Misbehavior::MalformedVoteSubject {
            voter: m(2),
            round: 1,
        }]
    );
    assert!(voter
        .tip_state()
        .and_then(|state| state.round_vote(1, &m(2)))
        .is_none());

    // NO is never a legal round-vote decision.
    let mut vote = yes_round_vote_for(m(3), 1, test_hash(0x14));
    vote.choice.decision = Decision::No;
    let out = voter.apply_round_vote(vote);
    assert_eq!(
        out.errors,
        vec![Misbehavior::MalformedVoteDecision {
            voter: m(3),
            round: 1,
        }]
    );
    assert!(voter
        .tip_state()
        .and_then(|state| state.round_vote(1, &m(3)))
        .is_none());
}

/// A structurally invalid vice-block is Byzantine evidence.
#[test]
fn invalid_vice_block_is_misbehavior() {
    let world = TestWorld::new();
    world.block_invalid.set(true);
    let mut voter = make_voter(world);

    let block = test_vice_block(tip(), 1);
    let out = voter.apply_vice_block(block.clone());
    assert_eq!(
        out.errors,
        vec![Misbehavior::InvalidViceBlock {
            block: block.hash(),
        }]
    );
    assert!(voter.tip_state().is_none());
}

/// Votes for an unknown historical tip are silently dropped unless
/// archiving allows them; archived votes never influence the current tip.
#[test]
fn old_tip_votes_drop_or_archive() {
    let world = TestWorld::new();
    let mut voter = make_voter(world.clone());
    let old_tip = BlockHash(test_hash(0x77));

    let mut vote = yes_round_vote(m(2), 1, BlockHash(test_hash(0x78)));
    vote.tip = old_tip;

    // Archiving disallowed: silent drop.
    let out = voter.apply_round_vote(vote.clone());
    assert!(out.is_empty());
    assert!(voter.tip_state().is_none());

    // Archiving allowed: stored, still no output for the current tip.
    world.archiving.set(true);
    let out = voter.apply_round_vote(vote);
    assert!(out.is_empty());
    assert!(voter.tip_state().is_none());
    assert_eq!(voter.current_round(), 1);
}

/// After a tip advance, committed transactions and the old namespace are
/// gone.
#[test]
fn tip_advance_prunes_finished_txs() {
    let mut voter = make_voter(TestWorld::new());
    let tx = test_transaction(0x61);
    let txid = tx.id();

    // M1 approves the tx; three round votes commit it.
    let out = voter.apply_tx(tx.clone());
    assert_eq!(out.tx_votes[0].choice.decision, Decision::Yes);
    let block = test_vice_block(tip(), 1);
    voter.apply_vice_block(block.clone());
    voter.apply_round_vote(yes_round_vote(m(2), 1, block.hash()));
    voter.apply_round_vote(yes_round_vote(m(3), 1, block.hash()));
    voter.apply_round_vote(yes_round_vote(m(4), 1, block.hash()));

    assert!(voter.is_committed_tx(&tx));
    assert_eq!(
        voter.list_committed_txs().keys().copied().collect::<Vec<_>>(),
        vec![txid]
    );

    // New tip: the committed tx is pruned and no votes leak across.
    let new_tip = BlockHash(test_hash(0xab));
    voter.update_tip(new_tip);
    assert_eq!(voter.tip(), new_tip);
    assert!(voter.list_committed_txs().is_empty());
    assert!(!voter.is_committed_tx(&tx));
    assert!(voter.tip_state().is_none(), "no votes in the new namespace");
    assert_eq!(voter.current_round(), 1);
}

/// Duplicate vice-blocks and votes are silently ignored.
#[test]
fn duplicates_are_silent() {
    let mut voter = make_voter(TestWorld::new());
    let block = test_vice_block(tip(), 1);

    let first = voter.apply_vice_block(block.clone());
    assert!(!first.is_empty());
    let second = voter.apply_vice_block(block);
    assert!(second.is_empty());

    let vote = yes_round_vote(m(2), 1, test_vice_block(tip(), 1).hash());
    voter.apply_round_vote(vote.clone());
    let out = voter.apply_round_vote(vote);
    assert!(out.is_empty());
}

/// A non-voting node collects state but never emits votes.
#[test]
fn observer_never_votes() {
    let mut voter = make_observer(TestWorld::new());

    assert!(voter.apply_vice_block(test_vice_block(tip(), 1)).is_empty());
    assert!(voter.on_round_too_long().is_empty());
    let out = voter.apply_tx(test_transaction(3));
    assert!(out.tx_votes.is_empty());
    assert!(out.round_votes.is_empty());
}

/// Once M1 round-voted, later transactions draw PASS instead of YES: the
/// node has already committed to a vice-block this round.
#[test]
fn tx_vote_downgrades_to_pass_after_round_vote() {
    let mut voter = make_voter(TestWorld::new());
    let block = test_vice_block(tip(), 1);

    let out = voter.apply_vice_block(block);
    assert_eq!(out.round_votes.len(), 1, "M1 round-voted");

    let tx = test_transaction(0x71);
    let out = voter.apply_tx(tx.clone());
    assert_eq!(out.tx_votes.len(), 1);
    assert_eq!(out.tx_votes[0].choice.decision, Decision::Pass);
    assert_eq!(out.tx_votes[0].choice.subject, tx.id().hash());
}

/// A vice-block for a round that already passed is stored but provokes no
/// vote.
#[test]
fn stale_round_vice_block_is_ignored() {
    let mut voter = make_voter(TestWorld::new());

    // Push round one into stalemate with four PASS votes.
    voter.on_round_too_long();
    voter.apply_round_vote(pass_round_vote(m(2), 1));
    voter.apply_round_vote(pass_round_vote(m(3), 1));
    voter.apply_round_vote(pass_round_vote(m(4), 1));
    assert_eq!(voter.current_round(), 2);

    let stale = test_vice_block(tip(), 1);
    let out = voter.apply_vice_block(stale.clone());
    assert!(out.round_votes.is_empty());
    // Stored nonetheless.
    assert!(voter
        .tip_state()
        .map(|state| state.vice_blocks.contains_key(&stale.hash()))
        .unwrap_or(false));
}
