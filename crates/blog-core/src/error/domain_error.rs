//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::entities::VoteType;
use crate::value_objects::{Snowflake, UserId, UserIdError};
use crate::voting::Decision;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Post not found: {0}")]
    PostNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid vote direction: {0:?}")]
    InvalidVoteDirection(String),

    #[error("Invalid user id: {0}")]
    InvalidUserId(#[from] UserIdError),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    /// The vote ledger does not match the state a decision was computed
    /// against, or holds more than one record for a user.
    #[error("Vote ledger integrity violation: {0}")]
    LedgerIntegrity(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Conflict raised when a decision no longer matches the stored vote
    pub fn stale_vote(
        post_id: Snowflake,
        user_id: &UserId,
        stored: Option<VoteType>,
        decision: Decision,
    ) -> Self {
        let stored = stored.map_or("none", VoteType::as_str);
        Self::LedgerIntegrity(format!(
            "vote of {user_id} on post {post_id} is {stored}, cannot {decision}"
        ))
    }

    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::PostNotFound(_) => "UNKNOWN_POST",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidVoteDirection(_) => "INVALID_VOTE_DIRECTION",
            Self::InvalidUserId(_) => "INVALID_USER_ID",
            Self::LedgerIntegrity(_) => "VOTE_CONFLICT",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PostNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::InvalidVoteDirection(_) | Self::InvalidUserId(_)
        )
    }

    /// Check if this is a conflict error (retryable for votes)
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::LedgerIntegrity(_))
    }
}
