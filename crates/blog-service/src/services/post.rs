//! Post service
//!
//! Publishing, fetching and listing posts.

use blog_core::entities::Post;
use blog_core::traits::PostQuery;
use blog_core::{DomainError, Snowflake, UserId};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{CreatePostRequest, PostResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Post service
pub struct PostService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PostService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Publish a new post with zeroed counters
    #[instrument(skip(self, author_id, request), fields(author_id = %author_id))]
    pub async fn create_post(
        &self,
        author_id: UserId,
        request: CreatePostRequest,
    ) -> ServiceResult<PostResponse> {
        request.validate()?;

        let post = Post::new(
            self.ctx.generate_id(),
            author_id,
            request.title,
            request.excerpt,
            request.content,
            request.category,
        );

        self.ctx.post_repo().create(&post).await?;

        info!(post_id = %post.id, "Post created");

        Ok(PostResponse::from(post))
    }

    /// Fetch one post with its counters
    #[instrument(skip(self))]
    pub async fn get_post(&self, post_id: Snowflake) -> ServiceResult<PostResponse> {
        let post = self
            .ctx
            .post_repo()
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))?;

        Ok(PostResponse::from(post))
    }

    /// List posts, newest first
    #[instrument(skip(self))]
    pub async fn list_posts(&self, query: PostQuery) -> ServiceResult<Vec<PostResponse>> {
        let posts = self.ctx.post_repo().list(query).await?;
        Ok(posts.into_iter().map(PostResponse::from).collect())
    }
}
