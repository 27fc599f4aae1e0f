//! Post handlers

use axum::{
    extract::{Path, State},
    Json,
};
use blog_service::{CreatePostRequest, PostResponse, PostService};

use crate::extractors::{AuthUser, Pagination, PostIdPath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// List posts, newest first
///
/// GET /posts?before={post_id}&limit={n}
pub async fn list_posts(
    State(state): State<AppState>,
    pagination: Pagination,
) -> ApiResult<Json<Vec<PostResponse>>> {
    let service = PostService::new(state.service_context());
    let posts = service.list_posts(pagination.into()).await?;
    Ok(Json(posts))
}

/// Publish a post as the caller
///
/// POST /posts
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreatePostRequest>,
) -> ApiResult<Created<Json<PostResponse>>> {
    let service = PostService::new(state.service_context());
    let post = service.create_post(auth.user_id, request).await?;
    Ok(Created(Json(post)))
}

/// GET /posts/{post_id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(path): Path<PostIdPath>,
) -> ApiResult<Json<PostResponse>> {
    let post_id = path.post_id()?;
    let service = PostService::new(state.service_context());
    Ok(Json(service.get_post(post_id).await?))
}
