//! Request DTOs for API endpoints

use blog_core::{DomainError, Snowflake, VoteAction};
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Post Requests
// ============================================================================

/// Create post request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 5, max = 200, message = "Title must be 5-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 500, message = "Excerpt must be 1-500 characters"))]
    pub excerpt: String,

    #[validate(length(min = 5, message = "Content must be at least 5 characters"))]
    pub content: String,

    #[validate(length(min = 1, max = 64, message = "Category must be 1-64 characters"))]
    pub category: String,
}

// ============================================================================
// Vote Requests
// ============================================================================

/// Single-endpoint vote request
///
/// `direction` stays a string here so an unknown value is reported as an
/// invalid direction instead of a generic JSON error.
#[derive(Debug, Clone, Deserialize)]
pub struct VoteRequest {
    pub post_id: Snowflake,
    pub direction: String,
}

impl VoteRequest {
    /// Parse `direction`, rejecting anything but `upvote` / `downvote`
    pub fn action(&self) -> Result<VoteAction, DomainError> {
        self.direction.parse()
    }
}
