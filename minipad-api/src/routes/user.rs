//! User REST API Routes
//!
//! Per-wallet views of the board. Addresses are matched verbatim.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::{
    error::ApiResult,
    services::Minipad,
    state::AppState,
    types::{ListClaimsResponse, ListIdeasResponse},
};

/// GET /api/v1/users/{address}/ideas - Ideas the user submitted
#[utoipa::path(
    get,
    path = "/api/v1/users/{address}/ideas",
    tag = "Users",
    params(("address" = String, Path, description = "Wallet address")),
    responses(
        (status = 200, description = "Submitted ideas, newest first, remixes excluded", body = ListIdeasResponse),
    ),
)]
pub async fn submitted_ideas(
    State(minipad): State<Arc<Minipad>>,
    Path(address): Path<String>,
) -> ApiResult<Json<ListIdeasResponse>> {
    Ok(Json(minipad.user_submitted_ideas(&address)?.into()))
}

/// GET /api/v1/users/{address}/claimed - Ideas the user has claimed
#[utoipa::path(
    get,
    path = "/api/v1/users/{address}/claimed",
    tag = "Users",
    params(("address" = String, Path, description = "Wallet address")),
    responses(
        (status = 200, description = "Claimed ideas, newest first", body = ListIdeasResponse),
    ),
)]
pub async fn claimed_ideas(
    State(minipad): State<Arc<Minipad>>,
    Path(address): Path<String>,
) -> ApiResult<Json<ListIdeasResponse>> {
    Ok(Json(minipad.user_claimed_ideas(&address)?.into()))
}

/// GET /api/v1/users/{address}/completed - Ideas the user has shipped
#[utoipa::path(
    get,
    path = "/api/v1/users/{address}/completed",
    tag = "Users",
    params(("address" = String, Path, description = "Wallet address")),
    responses(
        (status = 200, description = "Completed ideas, most recently completed first", body = ListIdeasResponse),
    ),
)]
pub async fn completed_ideas(
    State(minipad): State<Arc<Minipad>>,
    Path(address): Path<String>,
) -> ApiResult<Json<ListIdeasResponse>> {
    Ok(Json(minipad.user_completed_ideas(&address)?.into()))
}

/// GET /api/v1/users/{address}/claims - Claim records of the user
#[utoipa::path(
    get,
    path = "/api/v1/users/{address}/claims",
    tag = "Users",
    params(("address" = String, Path, description = "Wallet address")),
    responses(
        (status = 200, description = "Claims by the user", body = ListClaimsResponse),
    ),
)]
pub async fn user_claims(
    State(minipad): State<Arc<Minipad>>,
    Path(address): Path<String>,
) -> ApiResult<Json<ListClaimsResponse>> {
    Ok(Json(minipad.claims_by_user(&address)?.into()))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/users/:address/ideas", get(submitted_ideas))
        .route("/users/:address/claimed", get(claimed_ideas))
        .route("/users/:address/completed", get(completed_ideas))
        .route("/users/:address/claims", get(user_claims))
}
