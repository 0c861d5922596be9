//! Quantified properties: idempotence, permutation invariance, replay
//! determinism, and the structural vote invariants.

mod common;

use common::*;
use dpos_core::Event;
use dpos_types::test_utils::*;
use dpos_types::{Decision, ViceBlock};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Replaying the same tx vote twice: same state, empty second output.
#[test]
fn tx_vote_is_idempotent() {
    let mut voter = make_observer(TestWorld::new());
    let vote = tx_vote(m(2), 1, test_transaction(1).id(), Decision::Yes);

    voter.apply_tx_vote(vote.clone());
    let before = voter.tip_state().cloned();

    let out = voter.apply_tx_vote(vote);
    assert!(out.is_empty());
    assert_eq!(voter.tip_state().cloned(), before);
}

/// Replaying the same round vote twice: same state, empty second output.
#[test]
fn round_vote_is_idempotent() {
    let mut voter = make_observer(TestWorld::new());
    let vote = yes_round_vote(m(2), 1, test_vice_block(tip(), 1).hash());

    voter.apply_round_vote(vote.clone());
    let before = voter.tip_state().cloned();

    let out = voter.apply_round_vote(vote);
    assert!(out.is_empty());
    assert_eq!(voter.tip_state().cloned(), before);
}

/// Replaying the same vice-block twice: same state, empty second output.
#[test]
fn vice_block_is_idempotent() {
    let mut voter = make_voter(TestWorld::new());
    let block = test_vice_block(tip(), 1);

    voter.apply_vice_block(block.clone());
    let before = voter.tip_state().cloned();

    let out = voter.apply_vice_block(block);
    assert!(out.is_empty());
    assert_eq!(voter.tip_state().cloned(), before);
}

/// A mixed event pool with one event per `(voter, kind, round)` slot. Every
/// permutation must converge to the same state.
fn event_pool() -> Vec<Event> {
    let b1 = test_vice_block(tip(), 1);
    let b2 = ViceBlock::new(tip(), 1, vec![test_transaction(9)]);
    let b3 = test_vice_block(tip(), 2);
    let x = test_transaction(0x0a);
    let y = test_transaction(0x0b);

    vec![
        Event::ViceBlockReceived { block: b1.clone() },
        Event::ViceBlockReceived { block: b2.clone() },
        Event::ViceBlockReceived { block: b3 },
        Event::TransactionReceived { tx: x.clone() },
        Event::TransactionReceived { tx: y.clone() },
        Event::RoundVoteReceived {
            vote: yes_round_vote(m(1), 1, b1.hash()),
        },
        Event::RoundVoteReceived {
            vote: yes_round_vote(m(2), 1, b2.hash()),
        },
        Event::RoundVoteReceived {
            vote: pass_round_vote(m(3), 1),
        },
        Event::RoundVoteReceived {
            vote: pass_round_vote(m(4), 1),
        },
        Event::RoundVoteReceived {
            vote: yes_round_vote(m(2), 2, b1.hash()),
        },
        Event::TxVoteReceived {
            vote: tx_vote(m(1), 1, x.id(), Decision::Yes),
        },
        Event::TxVoteReceived {
            vote: tx_vote(m(2), 1, x.id(), Decision::No),
        },
        Event::TxVoteReceived {
            vote: tx_vote(m(3), 1, y.id(), Decision::Yes),
        },
        Event::TxVoteReceived {
            vote: tx_vote(m(4), 2, y.id(), Decision::Pass),
        },
    ]
}

/// Observer state is invariant under event reordering.
#[test]
fn permutations_converge() {
    let baseline = {
        let mut voter = make_observer(TestWorld::new());
        for event in event_pool() {
            voter.handle(event);
        }
        (voter.tip_state().cloned(), voter.current_round())
    };

    for seed in 0..16u64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut events = event_pool();
        events.shuffle(&mut rng);

        let mut voter = make_observer(TestWorld::new());
        for event in events {
            voter.handle(event);
        }
        assert_eq!(
            (voter.tip_state().cloned(), voter.current_round()),
            baseline,
            "seed {seed} diverged"
        );
    }
}

/// The voter is a pure function of the event sequence: two fresh instances
/// fed identically produce identical outputs, not just identical state.
#[test]
fn replay_is_deterministic() {
    let run = || {
        let mut voter = make_voter(TestWorld::new());
        event_pool()
            .into_iter()
            .map(|event| voter.handle(event))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

/// Every self-emitted vote carries this node's identity and the current tip.
#[test]
fn self_outputs_are_stamped() {
    let mut voter = make_voter(TestWorld::new());
    let mut outputs = Vec::new();
    for event in event_pool() {
        outputs.push(voter.handle(event));
    }
    outputs.push(voter.on_round_too_long());

    let mut emitted = 0;
    for out in &outputs {
        for vote in &out.tx_votes {
            assert_eq!(vote.voter, m(1));
            assert_eq!(vote.tip, tip());
            assert!(vote.round >= 1);
            emitted += 1;
        }
        for vote in &out.round_votes {
            assert_eq!(vote.voter, m(1));
            assert_eq!(vote.tip, tip());
            assert!(vote.round >= 1);
            emitted += 1;
        }
    }
    assert!(emitted > 0, "the run must have produced own votes");
}

/// Stored round votes satisfy the well-formedness invariant:
/// decision ∈ {YES, PASS} and PASS ⇔ zero subject.
#[test]
fn stored_round_votes_are_well_formed() {
    let mut voter = make_voter(TestWorld::new());
    for event in event_pool() {
        voter.handle(event);
    }
    voter.on_round_too_long();

    let state = voter.tip_state().expect("events must have created state");
    for (round, by_voter) in &state.round_votes {
        for (voter_id, vote) in by_voter {
            assert_eq!(vote.round, *round);
            assert_eq!(vote.voter, *voter_id);
            assert_ne!(vote.choice.decision, Decision::No);
            assert_eq!(
                vote.choice.decision == Decision::Pass,
                vote.choice.subject.is_zero()
            );
        }
    }
}

/// The current round never decreases while the tip is fixed.
#[test]
fn round_is_monotonic() {
    for seed in 0..8u64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut events = event_pool();
        events.shuffle(&mut rng);

        let mut voter = make_observer(TestWorld::new());
        let mut last = voter.current_round();
        for event in events {
            voter.handle(event);
            let now = voter.current_round();
            assert!(now >= last, "round went backwards under seed {seed}");
            last = now;
        }
    }
}

/// One vote per slot: feeding doublesigns leaves exactly the first vote in
/// each `(round, voter)` and `(round, txid, voter)` slot.
#[test]
fn slots_hold_at_most_one_vote() {
    let mut voter = make_observer(TestWorld::new());
    let b1 = test_vice_block(tip(), 1);
    let b2 = ViceBlock::new(tip(), 1, vec![test_transaction(3)]);
    let x = test_transaction(0x21).id();

    voter.apply_round_vote(yes_round_vote(m(2), 1, b1.hash()));
    voter.apply_round_vote(yes_round_vote(m(2), 1, b2.hash()));
    voter.apply_round_vote(yes_round_vote(m(2), 1, b1.hash()));
    voter.apply_tx_vote(tx_vote(m(2), 1, x, Decision::Yes));
    voter.apply_tx_vote(tx_vote(m(2), 1, x, Decision::No));

    let state = voter.tip_state().unwrap();
    assert_eq!(state.round_vote_count(), 1);
    assert_eq!(state.tx_vote_count(), 1);
    assert_eq!(
        state.round_vote(1, &m(2)).unwrap().choice.subject,
        b1.hash().hash()
    );
    assert_eq!(
        state.tx_vote(1, x, &m(2)).unwrap().choice.decision,
        Decision::Yes
    );
}
