//! Claim REST API Routes
//!
//! Claiming, releasing and completing ideas, plus the claim history of an
//! idea.

use axum::{
    extract::State,
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
    types::{
        ClaimIdeaRequest, ClaimResponse, CompleteIdeaRequest, CompleteResponse,
        ListClaimsResponse, UnclaimResponse,
    },
};

/// POST /api/v1/ideas/{id}/claim - Claim an open idea
#[utoipa::path(
    post,
    path = "/api/v1/ideas/{id}/claim",
    tag = "Claims",
    params(("id" = String, Path, description = "Idea ID")),
    request_body = ClaimIdeaRequest,
    responses(
        (status = 200, description = "Idea claimed", body = ClaimResponse),
        (status = 401, description = "Wallet not connected", body = ApiError),
        (status = 404, description = "Idea not found", body = ApiError),
        (status = 409, description = "Idea is not open", body = ApiError),
    ),
)]
pub async fn claim_idea(
    State(minipad): State<Arc<Minipad>>,
    ActorExtractor(actor): ActorExtractor,
    PathId(idea_id): PathId<IdeaId>,
    req: Option<Json<ClaimIdeaRequest>>,
) -> ApiResult<Json<ClaimResponse>> {
    let req = req.map(|Json(req)| req).unwrap_or_default();
    let (idea, claim) = minipad.claim_idea(&actor, idea_id, req).await?;
    Ok(Json(ClaimResponse {
        idea: idea.into(),
        claim,
    }))
}

/// POST /api/v1/ideas/{id}/unclaim - Release a claim
#[utoipa::path(
    post,
    path = "/api/v1/ideas/{id}/unclaim",
    tag = "Claims",
    params(("id" = String, Path, description = "Idea ID")),
    responses(
        (status = 200, description = "Idea is open again", body = UnclaimResponse),
        (status = 401, description = "Wallet not connected", body = ApiError),
        (status = 403, description = "Caller does not hold the claim", body = ApiError),
        (status = 404, description = "Idea not found", body = ApiError),
        (status = 409, description = "Idea is not claimed", body = ApiError),
    ),
)]
pub async fn unclaim_idea(
    State(minipad): State<Arc<Minipad>>,
    ActorExtractor(actor): ActorExtractor,
    PathId(idea_id): PathId<IdeaId>,
) -> ApiResult<Json<UnclaimResponse>> {
    let outcome = minipad.unclaim_idea(&actor, idea_id).await?;
    Ok(Json(UnclaimResponse {
        idea: outcome.idea.into(),
        attestation_uid: outcome.attestation_uid,
    }))
}

/// POST /api/v1/ideas/{id}/complete - Mark a claimed idea completed
#[utoipa::path(
    post,
    path = "/api/v1/ideas/{id}/complete",
    tag = "Claims",
    params(("id" = String, Path, description = "Idea ID")),
    request_body = CompleteIdeaRequest,
    responses(
        (status = 200, description = "Idea completed", body = CompleteResponse),
        (status = 400, description = "Malformed URL", body = ApiError),
        (status = 401, description = "Wallet not connected", body = ApiError),
        (status = 403, description = "Caller is not the claimer", body = ApiError),
        (status = 404, description = "Idea not found", body = ApiError),
        (status = 409, description = "Idea is not claimed", body = ApiError),
    ),
)]
pub async fn complete_idea(
    State(minipad): State<Arc<Minipad>>,
    ActorExtractor(actor): ActorExtractor,
    PathId(idea_id): PathId<IdeaId>,
    Json(req): Json<CompleteIdeaRequest>,
) -> ApiResult<Json<CompleteResponse>> {
    let (idea, claim) = minipad.complete_idea(&actor, idea_id, req).await?;
    Ok(Json(CompleteResponse {
        idea: idea.into(),
        claim,
    }))
}

/// GET /api/v1/ideas/{id}/claims - Claim history of an idea
#[utoipa::path(
    get,
    path = "/api/v1/ideas/{id}/claims",
    tag = "Claims",
    params(("id" = String, Path, description = "Idea ID")),
    responses(
        (status = 200, description = "Claims, oldest first", body = ListClaimsResponse),
    ),
)]
pub async fn list_claims(
    State(minipad): State<Arc<Minipad>>,
    PathId(idea_id): PathId<IdeaId>,
) -> ApiResult<Json<ListClaimsResponse>> {
    Ok(Json(minipad.claims_for_idea(idea_id)?.into()))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ideas/:id/claim", post(claim_idea))
        .route("/ideas/:id/unclaim", post(unclaim_idea))
        .route("/ideas/:id/complete", post(complete_idea))
        .route("/ideas/:id/claims", get(list_claims))
}
