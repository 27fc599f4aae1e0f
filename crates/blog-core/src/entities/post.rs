//! Post entity - a published blog post with its vote aggregates

use chrono::{DateTime, Utc};

use crate::value_objects::{Snowflake, UserId};

/// Post entity
///
/// `upvote_count` and `downvote_count` are denormalized from the vote
/// ledger and only ever change through [`crate::traits::VoteLedger::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: Snowflake,
    pub author_id: UserId,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub upvote_count: i64,
    pub downvote_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new Post with zeroed counters
    pub fn new(
        id: Snowflake,
        author_id: UserId,
        title: String,
        excerpt: String,
        content: String,
        category: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            author_id,
            title,
            excerpt,
            content,
            category,
            upvote_count: 0,
            downvote_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Net score shown next to the post
    #[inline]
    pub fn score(&self) -> i64 {
        self.upvote_count - self.downvote_count
    }

    /// Total number of votes recorded against the post
    #[inline]
    pub fn total_votes(&self) -> i64 {
        self.upvote_count + self.downvote_count
    }
}
