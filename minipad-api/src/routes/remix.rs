//! Remix REST API Routes
//!
//! A remix is an idea that points back at an original. Remixes are listed
//! under their original and deleted through their own path.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use std::sync::Arc;

use minipad_core::IdeaId;

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ActorExtractor, PathId},
    services::Minipad,
    state::AppState,
    types::{DeleteIdeaResponse, IdeaResponse, ListIdeasResponse, SubmitIdeaRequest},
};

/// POST /api/v1/ideas/{id}/remixes - Remix an idea
#[utoipa::path(
    post,
    path = "/api/v1/ideas/{id}/remixes",
    tag = "Remixes",
    params(("id" = String, Path, description = "Original idea ID")),
    request_body = SubmitIdeaRequest,
    responses(
        (status = 201, description = "Remix created", body = IdeaResponse),
        (status = 400, description = "Blank fields, or the original is itself a remix", body = ApiError),
        (status = 401, description = "Wallet not connected", body = ApiError),
        (status = 404, description = "Original idea not found", body = ApiError),
    ),
)]
pub async fn create_remix(
    State(minipad): State<Arc<Minipad>>,
    ActorExtractor(actor): ActorExtractor,
    PathId(original_id): PathId<IdeaId>,
    Json(req): Json<SubmitIdeaRequest>,
) -> ApiResult<impl IntoResponse> {
    let remix = minipad.create_remix(&actor, original_id, req).await?;
    Ok((StatusCode::CREATED, Json(IdeaResponse::from(remix))))
}

/// GET /api/v1/ideas/{id}/remixes - Remixes of an idea
#[utoipa::path(
    get,
    path = "/api/v1/ideas/{id}/remixes",
    tag = "Remixes",
    params(("id" = String, Path, description = "Original idea ID")),
    responses(
        (status = 200, description = "Remixes in creation order", body = ListIdeasResponse),
    ),
)]
pub async fn list_remixes(
    State(minipad): State<Arc<Minipad>>,
    PathId(original_id): PathId<IdeaId>,
) -> ApiResult<Json<ListIdeasResponse>> {
    Ok(Json(minipad.list_remixes(original_id)?.into()))
}

/// DELETE /api/v1/remixes/{id} - Delete a remix (author only)
#[utoipa::path(
    delete,
    path = "/api/v1/remixes/{id}",
    tag = "Remixes",
    params(("id" = String, Path, description = "Remix ID")),
    responses(
        (status = 200, description = "Remix deleted", body = DeleteIdeaResponse),
        (status = 400, description = "Idea is not a remix", body = ApiError),
        (status = 401, description = "Wallet not connected", body = ApiError),
        (status = 403, description = "Caller is not the author", body = ApiError),
        (status = 404, description = "Remix not found", body = ApiError),
    ),
)]
pub async fn delete_remix(
    State(minipad): State<Arc<Minipad>>,
    ActorExtractor(actor): ActorExtractor,
    PathId(remix_id): PathId<IdeaId>,
) -> ApiResult<Json<DeleteIdeaResponse>> {
    Ok(Json(minipad.delete_remix(&actor, remix_id).await?))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ideas/:id/remixes", get(list_remixes).post(create_remix))
        .route("/remixes/:id", delete(delete_remix))
}
