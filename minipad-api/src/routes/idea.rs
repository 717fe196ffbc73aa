//! Idea REST API Routes
//!
//! Board listing, submission, lookup, deletion, and recording an attestation
//! obtained by the client after submission.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use std::sync::Arc;

use minipad_core::IdeaId;

use crate::{
    config::ApiConfig,
    error::{ApiError, ApiResult},
    extractors::{ActorExtractor, PathId},
    services::Minipad,
    state::AppState,
    types::{
        DeleteIdeaResponse, IdeaResponse, ListIdeasQuery, ListIdeasResponse, SubmitIdeaRequest,
        UpdateAttestationRequest,
    },
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/ideas - Board listing
#[utoipa::path(
    get,
    path = "/api/v1/ideas",
    tag = "Ideas",
    params(ListIdeasQuery),
    responses(
        (status = 200, description = "Ideas, newest first unless sorted otherwise", body = ListIdeasResponse),
        (status = 400, description = "Invalid query", body = ApiError),
    ),
)]
pub async fn list_ideas(
    State(minipad): State<Arc<Minipad>>,
    State(config): State<Arc<ApiConfig>>,
    Query(query): Query<ListIdeasQuery>,
) -> ApiResult<Json<ListIdeasResponse>> {
    let ideas = minipad.list_ideas(query.to_filter(&config))?;
    Ok(Json(ideas.into()))
}

/// POST /api/v1/ideas - Submit an idea
#[utoipa::path(
    post,
    path = "/api/v1/ideas",
    tag = "Ideas",
    request_body = SubmitIdeaRequest,
    responses(
        (status = 201, description = "Idea submitted", body = IdeaResponse),
        (status = 400, description = "Blank title or description", body = ApiError),
        (status = 401, description = "Wallet not connected", body = ApiError),
    ),
)]
pub async fn submit_idea(
    State(minipad): State<Arc<Minipad>>,
    ActorExtractor(actor): ActorExtractor,
    Json(req): Json<SubmitIdeaRequest>,
) -> ApiResult<impl IntoResponse> {
    let idea = minipad.submit_idea(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(IdeaResponse::from(idea))))
}

/// GET /api/v1/ideas/{id} - Get an idea by ID
#[utoipa::path(
    get,
    path = "/api/v1/ideas/{id}",
    tag = "Ideas",
    params(("id" = String, Path, description = "Idea ID")),
    responses(
        (status = 200, description = "Idea details", body = IdeaResponse),
        (status = 404, description = "Idea not found", body = ApiError),
    ),
)]
pub async fn get_idea(
    State(minipad): State<Arc<Minipad>>,
    PathId(idea_id): PathId<IdeaId>,
) -> ApiResult<Json<IdeaResponse>> {
    let idea = minipad
        .get_idea(idea_id)?
        .ok_or_else(|| ApiError::idea_not_found(idea_id))?;
    Ok(Json(idea.into()))
}

/// DELETE /api/v1/ideas/{id} - Delete an idea (author only)
#[utoipa::path(
    delete,
    path = "/api/v1/ideas/{id}",
    tag = "Ideas",
    params(("id" = String, Path, description = "Idea ID")),
    responses(
        (status = 200, description = "Idea and its upvotes and claims deleted", body = DeleteIdeaResponse),
        (status = 401, description = "Wallet not connected", body = ApiError),
        (status = 403, description = "Caller is not the author", body = ApiError),
        (status = 404, description = "Idea not found", body = ApiError),
    ),
)]
pub async fn delete_idea(
    State(minipad): State<Arc<Minipad>>,
    ActorExtractor(actor): ActorExtractor,
    PathId(idea_id): PathId<IdeaId>,
) -> ApiResult<Json<DeleteIdeaResponse>> {
    let removed = minipad.delete_idea(&actor, idea_id).await?;
    Ok(Json(removed))
}

/// PUT /api/v1/ideas/{id}/attestation - Record a client-side attestation
#[utoipa::path(
    put,
    path = "/api/v1/ideas/{id}/attestation",
    tag = "Ideas",
    params(("id" = String, Path, description = "Idea ID")),
    request_body = UpdateAttestationRequest,
    responses(
        (status = 200, description = "Attestation recorded", body = IdeaResponse),
        (status = 400, description = "Blank attestation uid", body = ApiError),
        (status = 401, description = "Wallet not connected", body = ApiError),
        (status = 404, description = "Idea not found", body = ApiError),
    ),
)]
pub async fn update_attestation(
    State(minipad): State<Arc<Minipad>>,
    ActorExtractor(_actor): ActorExtractor,
    PathId(idea_id): PathId<IdeaId>,
    Json(req): Json<UpdateAttestationRequest>,
) -> ApiResult<Json<IdeaResponse>> {
    let idea = minipad
        .update_idea_attestation(idea_id, req.attestation_uid)
        .await?;
    Ok(Json(idea.into()))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ideas", get(list_ideas).post(submit_idea))
        .route("/ideas/:id", get(get_idea).delete(delete_idea))
        .route("/ideas/:id/attestation", put(update_attestation))
}
