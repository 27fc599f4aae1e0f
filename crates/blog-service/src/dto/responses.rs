//! Response DTOs for API endpoints

use blog_core::{Snowflake, VoteType};
use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Post Responses
// ============================================================================

/// Post with its vote counters
#[derive(Debug, Clone, Serialize)]
pub struct PostResponse {
    pub id: Snowflake,
    pub author_id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub upvote_count: i64,
    pub downvote_count: i64,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Vote Responses
// ============================================================================

/// Result of one cast
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteResponse {
    pub post_id: Snowflake,
    pub upvote_count: i64,
    pub downvote_count: i64,
    /// The caller's vote was retracted by this cast
    pub removed: bool,
    /// The caller's vote after this cast
    pub vote: Option<VoteType>,
}

/// The caller's current vote on a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MyVoteResponse {
    pub post_id: Snowflake,
    pub vote: Option<VoteType>,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub storage: String,
}

impl ReadinessResponse {
    pub fn ready(storage_healthy: bool) -> Self {
        Self {
            status: if storage_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                storage: if storage_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
