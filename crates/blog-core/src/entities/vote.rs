//! Vote entities - the per-user vote ledger of a post

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{Snowflake, UserId};
use crate::voting::Decision;

/// Direction of a stored vote
///
/// There is no "none" variant: a user without a vote has no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Upvote,
    Downvote,
}

impl VoteType {
    /// Storage / wire representation
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upvote => "upvote",
            Self::Downvote => "downvote",
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Upvote => Self::Downvote,
            Self::Downvote => Self::Upvote,
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upvote" => Ok(Self::Upvote),
            "downvote" => Ok(Self::Downvote),
            other => Err(DomainError::InvalidVoteDirection(other.to_string())),
        }
    }
}

/// One user's vote on one post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRecord {
    pub post_id: Snowflake,
    pub user_id: UserId,
    pub vote_type: VoteType,
}

impl VoteRecord {
    pub fn new(post_id: Snowflake, user_id: UserId, vote_type: VoteType) -> Self {
        Self {
            post_id,
            user_id,
            vote_type,
        }
    }
}

/// Aggregate view returned after a decision has been applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    pub upvote_count: i64,
    pub downvote_count: i64,
    /// `true` when the caller's record was retracted
    pub removed: bool,
}

/// Vote-relevant projection of a post: the ledger plus its counters
///
/// Votes are keyed by user, so a second record for the same user cannot be
/// represented. Counters move only inside [`PostVotes::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostVotes {
    post_id: Snowflake,
    votes: HashMap<UserId, VoteType>,
    upvote_count: i64,
    downvote_count: i64,
}

impl PostVotes {
    pub fn new(post_id: Snowflake) -> Self {
        Self {
            post_id,
            ..Self::default()
        }
    }

    pub fn post_id(&self) -> Snowflake {
        self.post_id
    }

    pub fn upvote_count(&self) -> i64 {
        self.upvote_count
    }

    pub fn downvote_count(&self) -> i64 {
        self.downvote_count
    }

    /// Current vote of `user_id`, if any
    pub fn current(&self, user_id: &UserId) -> Option<VoteType> {
        self.votes.get(user_id).copied()
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Ledger contents ordered by user id
    pub fn records(&self) -> Vec<VoteRecord> {
        let mut records: Vec<_> = self
            .votes
            .iter()
            .map(|(user, vote)| VoteRecord::new(self.post_id, user.clone(), *vote))
            .collect();
        records.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        records
    }

    /// Apply a decision computed against this ledger.
    ///
    /// Fails with [`DomainError::LedgerIntegrity`] and leaves the ledger
    /// untouched if the user's stored vote no longer matches the state the
    /// decision was computed against.
    pub fn apply(&mut self, user_id: &UserId, decision: Decision) -> Result<VoteTally, DomainError> {
        let stored = self.current(user_id);
        if stored != decision.expected_prior() {
            return Err(DomainError::stale_vote(self.post_id, user_id, stored, decision));
        }

        let (upvote_count, downvote_count) = decision
            .delta()
            .apply_to(self.upvote_count, self.downvote_count)?;

        match decision.resulting() {
            Some(vote) => {
                self.votes.insert(user_id.clone(), vote);
            }
            None => {
                self.votes.remove(user_id);
            }
        }
        self.upvote_count = upvote_count;
        self.downvote_count = downvote_count;

        Ok(VoteTally {
            upvote_count,
            downvote_count,
            removed: decision.is_removal(),
        })
    }

    /// Check that both counters equal the number of matching records
    pub fn verify(&self) -> Result<(), DomainError> {
        let ups = self
            .votes
            .values()
            .filter(|v| **v == VoteType::Upvote)
            .count() as i64;
        let downs = self.votes.len() as i64 - ups;

        if ups != self.upvote_count || downs != self.downvote_count {
            return Err(DomainError::LedgerIntegrity(format!(
                "post {} counters ({}, {}) disagree with ledger ({ups}, {downs})",
                self.post_id, self.upvote_count, self.downvote_count
            )));
        }
        Ok(())
    }
}
