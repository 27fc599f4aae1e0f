//! Randomized checks of the reconciler against the in-domain ledger
//!
//! Sequences are driven by a seeded RNG so failures are reproducible.

use blog_core::{decide, PostVotes, Snowflake, UserId, VoteAction, VoteType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SEEDS: [u64; 4] = [1, 7, 42, 2024];

fn users(n: usize) -> Vec<UserId> {
    (0..n).map(|i| UserId::new(format!("user-{i}")).unwrap()).collect()
}

fn random_action(rng: &mut StdRng) -> VoteAction {
    if rng.gen_bool(0.5) {
        VoteAction::Upvote
    } else {
        VoteAction::Downvote
    }
}

fn cast(votes: &mut PostVotes, user: &UserId, action: VoteAction) {
    let decision = decide(votes.current(user), action);
    votes.apply(user, decision).expect("fresh decision must apply");
}

#[test]
fn same_direction_twice_restores_state() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let people = users(8);
        let mut votes = PostVotes::new(Snowflake::new(1));

        for _ in 0..200 {
            let who = &people[rng.gen_range(0..people.len())];
            cast(&mut votes, who, random_action(&mut rng));
        }

        for _ in 0..200 {
            let who = &people[rng.gen_range(0..people.len())];
            let action = random_action(&mut rng);
            let before = votes.clone();

            cast(&mut votes, who, action);
            cast(&mut votes, who, action);

            // from "none" or the same direction the pair is a no-op; from
            // the opposite direction it flips and then retracts
            if before.current(who) == Some(action.vote_type().opposite()) {
                assert_eq!(votes.current(who), None, "seed {seed}");
                assert_eq!(votes.len(), before.len() - 1, "seed {seed}");
            } else {
                assert_eq!(votes, before, "seed {seed}");
            }
        }
    }
}

#[test]
fn insert_then_retract_round_trip_from_empty() {
    for action in VoteAction::ALL {
        let who = UserId::new("solo").unwrap();
        let mut votes = PostVotes::new(Snowflake::new(3));
        let empty = votes.clone();

        cast(&mut votes, &who, action);
        assert_eq!(votes.current(&who), Some(action.vote_type()));
        cast(&mut votes, &who, action);

        assert_eq!(votes, empty);
        assert_eq!(votes.upvote_count(), 0);
        assert_eq!(votes.downvote_count(), 0);
    }
}

#[test]
fn counters_always_match_ledger() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let people = users(16);
        let mut votes = PostVotes::new(Snowflake::new(2));

        for step in 0..1000 {
            let who = &people[rng.gen_range(0..people.len())];
            cast(&mut votes, who, random_action(&mut rng));

            votes.verify().unwrap_or_else(|e| panic!("seed {seed} step {step}: {e}"));
            assert_eq!(
                votes.upvote_count() + votes.downvote_count(),
                votes.len() as i64
            );
            assert!(votes.upvote_count() >= 0 && votes.downvote_count() >= 0);

            let records = votes.records();
            let mut ids: Vec<_> = records.iter().map(|r| &r.user_id).collect();
            ids.dedup();
            assert_eq!(ids.len(), records.len(), "one record per user");
        }
    }
}

#[test]
fn upvote_then_downvote_flips_in_place() {
    let who = UserId::new("flipper").unwrap();
    let bystander = UserId::new("bystander").unwrap();
    let mut votes = PostVotes::new(Snowflake::new(4));
    cast(&mut votes, &bystander, VoteAction::Upvote);
    let (up0, down0) = (votes.upvote_count(), votes.downvote_count());

    cast(&mut votes, &who, VoteAction::Upvote);
    cast(&mut votes, &who, VoteAction::Downvote);

    assert_eq!(votes.upvote_count(), up0);
    assert_eq!(votes.downvote_count(), down0 + 1);
    assert_eq!(votes.current(&who), Some(VoteType::Downvote));
    assert_eq!(votes.len(), 2);
}
