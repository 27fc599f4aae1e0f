//! Route definitions
//!
//! API routes are mounted under /api/v1; health routes sit at the root.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{health, posts, votes};
use crate::state::AppState;

/// Create the main API router (health routes are separate so they bypass rate limiting)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new().merge(post_routes()).merge(vote_routes())
}

/// Post routes
fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route("/posts/:post_id", get(posts::get_post))
}

/// Vote routes
fn vote_routes() -> Router<AppState> {
    Router::new()
        // Literal segment, matched ahead of /posts/:post_id
        .route("/posts/vote", post(votes::cast_vote))
        .route("/posts/:post_id/upvote", post(votes::upvote))
        .route("/posts/:post_id/downvote", post(votes::downvote))
        .route("/posts/:post_id/votes/@me", get(votes::get_my_vote))
}
