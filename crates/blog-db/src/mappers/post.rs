//! Post entity <-> model mapper

use blog_core::{DomainError, Post, Snowflake, UserId};

use crate::models::PostModel;

impl TryFrom<PostModel> for Post {
    type Error = DomainError;

    fn try_from(model: PostModel) -> Result<Self, Self::Error> {
        let author_id = UserId::new(model.author_id).map_err(|e| {
            DomainError::InternalError(format!("post {} has a bad author id: {e}", model.id))
        })?;

        Ok(Post {
            id: Snowflake::new(model.id),
            author_id,
            title: model.title,
            excerpt: model.excerpt,
            content: model.content,
            category: model.category,
            upvote_count: model.upvote_count,
            downvote_count: model.downvote_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Post entity values for database insertion
pub struct PostInsert<'a> {
    pub id: i64,
    pub author_id: &'a str,
    pub title: &'a str,
    pub excerpt: &'a str,
    pub content: &'a str,
    pub category: &'a str,
}

impl<'a> PostInsert<'a> {
    pub fn new(post: &'a Post) -> Self {
        Self {
            id: post.id.into_inner(),
            author_id: post.author_id.as_str(),
            title: &post.title,
            excerpt: &post.excerpt,
            content: &post.content,
            category: &post.category,
        }
    }
}
