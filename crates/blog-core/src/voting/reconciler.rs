//! Vote reconciler
//!
//! Maps a user's current vote on a post and the direction they just cast to
//! the single ledger mutation that has to happen. Both directions share one
//! table; nothing here performs I/O.
//!
//! | current  | action   | decision                |
//! |----------|----------|-------------------------|
//! | none     | Upvote   | `Insert(Upvote)`        |
//! | none     | Downvote | `Insert(Downvote)`      |
//! | Upvote   | Upvote   | `Retract(Upvote)`       |
//! | Upvote   | Downvote | `Flip(Upvote→Downvote)` |
//! | Downvote | Downvote | `Retract(Downvote)`     |
//! | Downvote | Upvote   | `Flip(Downvote→Upvote)` |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entities::{VoteRecord, VoteType};
use crate::error::DomainError;
use crate::value_objects::UserId;

/// Direction the caller is casting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
    Upvote,
    Downvote,
}

impl VoteAction {
    pub const ALL: [VoteAction; 2] = [VoteAction::Upvote, VoteAction::Downvote];

    /// The record type this action asks for
    #[inline]
    pub const fn vote_type(self) -> VoteType {
        match self {
            Self::Upvote => VoteType::Upvote,
            Self::Downvote => VoteType::Downvote,
        }
    }
}

impl fmt::Display for VoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.vote_type().as_str())
    }
}

impl FromStr for VoteAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<VoteType>()? {
            VoteType::Upvote => Self::Upvote,
            VoteType::Downvote => Self::Downvote,
        })
    }
}

/// The ledger mutation for one cast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No prior record: create one
    Insert(VoteType),
    /// Prior record already in the requested direction: delete it
    Retract(VoteType),
    /// Prior record in the other direction: change its type in place
    Flip { from: VoteType, to: VoteType },
}

impl Decision {
    /// Stored vote this decision was computed against
    pub const fn expected_prior(self) -> Option<VoteType> {
        match self {
            Self::Insert(_) => None,
            Self::Retract(vote) => Some(vote),
            Self::Flip { from, .. } => Some(from),
        }
    }

    /// Stored vote once the decision has landed
    pub const fn resulting(self) -> Option<VoteType> {
        match self {
            Self::Insert(vote) => Some(vote),
            Self::Retract(_) => None,
            Self::Flip { to, .. } => Some(to),
        }
    }

    #[inline]
    pub const fn is_removal(self) -> bool {
        matches!(self, Self::Retract(_))
    }

    /// Counter movement implied by the decision
    pub fn delta(self) -> CounterDelta {
        match self {
            Self::Insert(vote) => CounterDelta::one(vote, 1),
            Self::Retract(vote) => CounterDelta::one(vote, -1),
            Self::Flip { from, to } => CounterDelta::one(to, 1) + CounterDelta::one(from, -1),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert(vote) => write!(f, "insert {vote}"),
            Self::Retract(vote) => write!(f, "retract {vote}"),
            Self::Flip { from, to } => write!(f, "flip {from} -> {to}"),
        }
    }
}

/// Change to apply to a post's `(upvote_count, downvote_count)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterDelta {
    pub upvote: i64,
    pub downvote: i64,
}

impl CounterDelta {
    fn one(vote: VoteType, by: i64) -> Self {
        match vote {
            VoteType::Upvote => Self { upvote: by, downvote: 0 },
            VoteType::Downvote => Self { upvote: 0, downvote: by },
        }
    }

    /// Apply to a pair of counters, refusing to take either below zero
    pub fn apply_to(self, upvotes: i64, downvotes: i64) -> Result<(i64, i64), DomainError> {
        let up = upvotes
            .checked_add(self.upvote)
            .filter(|n| *n >= 0)
            .ok_or_else(|| counter_underflow("upvote", upvotes, self.upvote))?;
        let down = downvotes
            .checked_add(self.downvote)
            .filter(|n| *n >= 0)
            .ok_or_else(|| counter_underflow("downvote", downvotes, self.downvote))?;
        Ok((up, down))
    }
}

impl std::ops::Add for CounterDelta {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            upvote: self.upvote + rhs.upvote,
            downvote: self.downvote + rhs.downvote,
        }
    }
}

fn counter_underflow(name: &str, current: i64, by: i64) -> DomainError {
    DomainError::LedgerIntegrity(format!("{name} counter {current} cannot move by {by}"))
}

/// Decide the mutation for `action` given the user's current vote
pub fn decide(current: Option<VoteType>, action: VoteAction) -> Decision {
    let wanted = action.vote_type();
    match current {
        None => Decision::Insert(wanted),
        Some(existing) if existing == wanted => Decision::Retract(wanted),
        Some(existing) => Decision::Flip {
            from: existing,
            to: wanted,
        },
    }
}

/// Find `user_id`'s vote among `records`.
///
/// More than one record for the same user is ledger corruption and is
/// reported instead of silently picking one.
pub fn current_vote(records: &[VoteRecord], user_id: &UserId) -> Result<Option<VoteType>, DomainError> {
    let mut mine = records.iter().filter(|r| &r.user_id == user_id);
    let first = mine.next();
    if mine.next().is_some() {
        return Err(DomainError::LedgerIntegrity(format!(
            "user {user_id} holds more than one vote record"
        )));
    }
    Ok(first.map(|r| r.vote_type))
}

/// [`decide`] over a raw set of records, checking for duplicates first
pub fn decide_from_records(
    records: &[VoteRecord],
    user_id: &UserId,
    action: VoteAction,
) -> Result<Decision, DomainError> {
    Ok(decide(current_vote(records, user_id)?, action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::Snowflake;

    use crate::entities::VoteType::{Downvote, Upvote};

    #[test]
    fn test_decision_table() {
        let table = [
            (None, VoteAction::Upvote, Decision::Insert(Upvote)),
            (None, VoteAction::Downvote, Decision::Insert(Downvote)),
            (Some(Upvote), VoteAction::Upvote, Decision::Retract(Upvote)),
            (
                Some(Upvote),
                VoteAction::Downvote,
                Decision::Flip { from: Upvote, to: Downvote },
            ),
            (Some(Downvote), VoteAction::Downvote, Decision::Retract(Downvote)),
            (
                Some(Downvote),
                VoteAction::Upvote,
                Decision::Flip { from: Downvote, to: Upvote },
            ),
        ];

        for (current, action, expected) in table {
            assert_eq!(decide(current, action), expected, "{current:?} + {action}");
        }
    }

    #[test]
    fn test_deltas() {
        assert_eq!(
            Decision::Insert(Upvote).delta(),
            CounterDelta { upvote: 1, downvote: 0 }
        );
        assert_eq!(
            Decision::Retract(Downvote).delta(),
            CounterDelta { upvote: 0, downvote: -1 }
        );
        assert_eq!(
            Decision::Flip { from: Upvote, to: Downvote }.delta(),
            CounterDelta { upvote: -1, downvote: 1 }
        );
    }

    #[test]
    fn test_prior_and_result_follow_the_decision() {
        for current in [None, Some(Upvote), Some(Downvote)] {
            for action in VoteAction::ALL {
                let decision = decide(current, action);
                assert_eq!(decision.expected_prior(), current);
                assert_ne!(decision.resulting(), current);
                assert_eq!(decision.is_removal(), decision.resulting().is_none());
            }
        }
    }

    #[test]
    fn test_delta_refuses_negative_counters() {
        let err = Decision::Retract(Upvote).delta().apply_to(0, 4).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(Decision::Retract(Upvote).delta().apply_to(1, 4).unwrap(), (0, 4));
    }

    #[test]
    fn test_duplicate_records_are_an_integrity_error() {
        let post = Snowflake::new(1);
        let a = UserId::new("a").unwrap();
        let records = vec![
            VoteRecord::new(post, a.clone(), Upvote),
            VoteRecord::new(post, UserId::new("b").unwrap(), Downvote),
            VoteRecord::new(post, a.clone(), Downvote),
        ];

        let err = decide_from_records(&records, &a, VoteAction::Upvote).unwrap_err();
        assert!(matches!(err, DomainError::LedgerIntegrity(_)));
    }

    #[test]
    fn test_decide_from_records_scopes_to_user() {
        let post = Snowflake::new(1);
        let records = vec![VoteRecord::new(post, UserId::new("b").unwrap(), Downvote)];

        let decision =
            decide_from_records(&records, &UserId::new("a").unwrap(), VoteAction::Downvote).unwrap();
        assert_eq!(decision, Decision::Insert(Downvote));
    }

    #[test]
    fn test_action_parse() {
        assert_eq!("upvote".parse::<VoteAction>().unwrap(), VoteAction::Upvote);
        assert!("UP".parse::<VoteAction>().is_err());
    }
}
