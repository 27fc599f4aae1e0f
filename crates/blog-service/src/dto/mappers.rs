//! Entity to DTO mappers

use blog_core::{Post, Snowflake, VoteTally, VoteType};

use super::responses::{PostResponse, VoteResponse};

impl From<&Post> for PostResponse {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id.to_string(),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            content: post.content.clone(),
            category: post.category.clone(),
            upvote_count: post.upvote_count,
            downvote_count: post.downvote_count,
            score: post.score(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self::from(&post)
    }
}

impl VoteResponse {
    /// Combine the tally of an applied decision with the caller's new vote
    pub fn from_tally(post_id: Snowflake, tally: VoteTally, vote: Option<VoteType>) -> Self {
        Self {
            post_id,
            upvote_count: tally.upvote_count,
            downvote_count: tally.downvote_count,
            removed: tally.removed,
            vote,
        }
    }
}
