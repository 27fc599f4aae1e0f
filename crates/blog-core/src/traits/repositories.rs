//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;

use crate::entities::{Post, VoteRecord, VoteTally};
use crate::error::DomainError;
use crate::value_objects::{Snowflake, UserId};
use crate::voting::Decision;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Query parameters for listing posts (newest first)
#[derive(Debug, Clone, Copy)]
pub struct PostQuery {
    /// Only posts with an id lower than this cursor
    pub before: Option<Snowflake>,
    pub limit: i64,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            before: None,
            limit: 20,
        }
    }
}

// ============================================================================
// Post Repository
// ============================================================================

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find post by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Post>>;

    /// List posts, newest first
    async fn list(&self, query: PostQuery) -> RepoResult<Vec<Post>>;

    /// Create a new post
    async fn create(&self, post: &Post) -> RepoResult<()>;
}

// ============================================================================
// Vote Ledger
// ============================================================================

/// Authoritative per-post vote storage.
///
/// Reads are scoped to a single `(post_id, user_id)` pair. `apply` is the
/// only write path: it must re-check at write time that the stored vote
/// still equals [`Decision::expected_prior`] and land the record change and
/// the counter change together, or neither.
#[async_trait]
pub trait VoteLedger: Send + Sync {
    /// All records `user_id` holds on `post_id`.
    ///
    /// Healthy storage returns at most one; callers run the result through
    /// [`crate::voting::decide_from_records`], which rejects duplicates.
    /// Fails with `PostNotFound` if the post does not exist.
    async fn find_votes(&self, post_id: Snowflake, user_id: &UserId) -> RepoResult<Vec<VoteRecord>>;

    /// Apply a decision atomically.
    ///
    /// Errors:
    /// - `PostNotFound` if the post does not exist
    /// - `LedgerIntegrity` if the stored vote changed since the decision was made
    async fn apply(
        &self,
        post_id: Snowflake,
        user_id: &UserId,
        decision: Decision,
    ) -> RepoResult<VoteTally>;
}

// ============================================================================
// Storage health
// ============================================================================

/// Readiness probe for whatever backs the repositories
#[async_trait]
pub trait StorageHealth: Send + Sync {
    /// Succeeds when storage can serve requests
    async fn ping(&self) -> RepoResult<()>;
}
