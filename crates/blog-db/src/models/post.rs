//! Post database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for posts table
#[derive(Debug, Clone, FromRow)]
pub struct PostModel {
    pub id: i64,
    pub author_id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub upvote_count: i64,
    pub downvote_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Counter pair returned by `UPDATE posts ... RETURNING`
#[derive(Debug, Clone, Copy, FromRow)]
pub struct CountersModel {
    pub upvote_count: i64,
    pub downvote_count: i64,
}
