//! Profile REST API Routes
//!
//! Thin proxy over the identity provider so the frontend never calls it
//! directly.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use minipad_core::{Fid, Profile, ProfileResolver};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// GET /api/v1/profiles/{fid} - Resolve a Farcaster profile
#[utoipa::path(
    get,
    path = "/api/v1/profiles/{fid}",
    tag = "Profiles",
    params(("fid" = u64, Path, description = "Farcaster id")),
    responses(
        (status = 200, description = "Profile", body = Profile),
        (status = 404, description = "No profile for this fid", body = ApiError),
        (status = 502, description = "Identity provider unavailable", body = ApiError),
    ),
)]
pub async fn get_profile(
    State(profiles): State<Arc<dyn ProfileResolver>>,
    Path(fid): Path<Fid>,
) -> ApiResult<Json<Profile>> {
    let profile = profiles
        .resolve_profile(fid)
        .await?
        .ok_or_else(|| ApiError::profile_not_found(fid))?;
    Ok(Json(profile))
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/profiles/:fid", get(get_profile))
}
