//! Upvote REST API Routes

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use minipad_core::IdeaId;

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ActorExtractor, PathId},
    services::Minipad,
    state::AppState,
    types::{UpvoteResponse, UpvoteStatusQuery, UpvoteStatusResponse},
};

/// POST /api/v1/ideas/{id}/upvote - Upvote an idea
#[utoipa::path(
    post,
    path = "/api/v1/ideas/{id}/upvote",
    tag = "Upvotes",
    params(("id" = String, Path, description = "Idea ID")),
    responses(
        (status = 200, description = "Upvote recorded, or already present", body = UpvoteResponse),
        (status = 401, description = "Wallet not connected", body = ApiError),
        (status = 404, description = "Idea not found", body = ApiError),
    ),
)]
pub async fn upvote(
    State(minipad): State<Arc<Minipad>>,
    ActorExtractor(actor): ActorExtractor,
    PathId(idea_id): PathId<IdeaId>,
) -> ApiResult<Json<UpvoteResponse>> {
    Ok(Json(minipad.upvote(&actor, idea_id).await?))
}

/// DELETE /api/v1/ideas/{id}/upvote - Withdraw an upvote
#[utoipa::path(
    delete,
    path = "/api/v1/ideas/{id}/upvote",
    tag = "Upvotes",
    params(("id" = String, Path, description = "Idea ID")),
    responses(
        (status = 200, description = "Upvote removed, or none was present", body = UpvoteResponse),
        (status = 401, description = "Wallet not connected", body = ApiError),
        (status = 404, description = "Idea not found", body = ApiError),
    ),
)]
pub async fn remove_upvote(
    State(minipad): State<Arc<Minipad>>,
    ActorExtractor(actor): ActorExtractor,
    PathId(idea_id): PathId<IdeaId>,
) -> ApiResult<Json<UpvoteResponse>> {
    Ok(Json(minipad.remove_upvote(&actor, idea_id).await?))
}

/// GET /api/v1/ideas/{id}/upvotes - Count, and whether `voter` has upvoted
#[utoipa::path(
    get,
    path = "/api/v1/ideas/{id}/upvotes",
    tag = "Upvotes",
    params(("id" = String, Path, description = "Idea ID"), UpvoteStatusQuery),
    responses(
        (status = 200, description = "Upvote status", body = UpvoteStatusResponse),
    ),
)]
pub async fn upvote_status(
    State(minipad): State<Arc<Minipad>>,
    PathId(idea_id): PathId<IdeaId>,
    Query(query): Query<UpvoteStatusQuery>,
) -> ApiResult<Json<UpvoteStatusResponse>> {
    let has_upvoted = match query.voter.as_deref().map(str::trim) {
        Some(voter) if !voter.is_empty() => minipad.has_upvoted(idea_id, voter)?,
        _ => false,
    };
    Ok(Json(UpvoteStatusResponse {
        idea_id,
        upvotes: minipad.upvote_count(idea_id)?,
        has_upvoted,
    }))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ideas/:id/upvote", post(upvote).delete(remove_upvote))
        .route("/ideas/:id/upvotes", get(upvote_status))
}
