//! Vote handlers
//!
//! Each cast toggles or flips the caller's vote and answers with the
//! post's counters after the change.

use axum::{
    extract::{Path, State},
    Json,
};
use blog_service::{MyVoteResponse, VoteRequest, VoteResponse, VoteService};

use crate::extractors::{AuthUser, JsonBody, PostIdPath};
use crate::response::ApiResult;
use crate::state::AppState;

/// POST /posts/{post_id}/upvote
pub async fn upvote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<PostIdPath>,
) -> ApiResult<Json<VoteResponse>> {
    let post_id = path.post_id()?;
    let service = VoteService::new(state.service_context());
    Ok(Json(service.upvote(post_id, &auth.user_id).await?))
}

/// POST /posts/{post_id}/downvote
pub async fn downvote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<PostIdPath>,
) -> ApiResult<Json<VoteResponse>> {
    let post_id = path.post_id()?;
    let service = VoteService::new(state.service_context());
    Ok(Json(service.downvote(post_id, &auth.user_id).await?))
}

/// Cast with the direction in the body
///
/// POST /posts/vote
/// Body: `{ "post_id": "...", "direction": "upvote" | "downvote" }`
pub async fn cast_vote(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(request): JsonBody<VoteRequest>,
) -> ApiResult<Json<VoteResponse>> {
    let service = VoteService::new(state.service_context());
    Ok(Json(service.cast_request(&auth.user_id, request).await?))
}

/// The caller's current vote on a post
///
/// GET /posts/{post_id}/votes/@me
pub async fn get_my_vote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<PostIdPath>,
) -> ApiResult<Json<MyVoteResponse>> {
    let post_id = path.post_id()?;
    let service = VoteService::new(state.service_context());
    Ok(Json(service.my_vote(post_id, &auth.user_id).await?))
}
