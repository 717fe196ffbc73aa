//! REST API Routes Module
//!
//! Route handlers grouped by entity. Every group returns a
//! `Router<AppState>` with paths relative to `/api/v1`; handlers pull the
//! pieces of state they need through `FromRef`.
//!
//! Mutating routes require the `X-Wallet-Address` header. Reads are public.

pub mod claim;
pub mod health;
pub mod idea;
pub mod profile;
pub mod remix;
pub mod upvote;
pub mod user;

use std::time::Duration;

use axum::{
    http::{header, header::HeaderName, request, HeaderValue, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::constants::{FARCASTER_FID_HEADER, WALLET_ADDRESS_HEADER};
use crate::openapi::ApiDoc;
use crate::state::AppState;
use crate::ws::ws_handler;

pub use claim::create_router as claim_router;
pub use health::create_router as health_router;
pub use idea::create_router as idea_router;
pub use profile::create_router as profile_router;
pub use remix::create_router as remix_router;
pub use upvote::create_router as upvote_router;
pub use user::create_router as user_router;

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

/// Handler for /api/openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// Empty origins allow everything (development). Otherwise each request
/// origin is checked with `ApiConfig::is_origin_allowed`, which also
/// accepts `*.domain` entries.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(WALLET_ADDRESS_HEADER),
            HeaderName::from_static(FARCASTER_FID_HEADER),
        ])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS: allowing configured origins");
        let allowed = config.clone();
        cors.allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &request::Parts| {
                origin
                    .to_str()
                    .map(|o| allowed.is_origin_allowed(o))
                    .unwrap_or(false)
            },
        ))
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Routes mounted under `/api/v1`.
fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(idea_router())
        .merge(upvote_router())
        .merge(claim_router())
        .merge(remix_router())
        .merge(user_router())
        .merge(profile_router())
        .route("/ws", get(ws_handler))
}

/// Create the complete API router.
///
/// - REST routes under /api/v1/*
/// - Change feed at /api/v1/ws
/// - Health checks at /health/*
/// - OpenAPI spec at /api/openapi.json
/// - Swagger UI at /swagger-ui (when the swagger-ui feature is enabled)
pub fn create_api_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config);

    #[allow(unused_mut)]
    let mut router = Router::new()
        .nest("/api/v1", api_routes())
        .nest("/health", health_router())
        .route("/api/openapi.json", get(openapi_json))
        .with_state(state);

    #[cfg(feature = "swagger-ui")]
    {
        use utoipa_swagger_ui::SwaggerUi;
        router = router.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
    }

    router.layer(TraceLayer::new_for_http()).layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_builds_for_both_modes() {
        let _ = build_cors_layer(&ApiConfig::default());

        let config = ApiConfig {
            cors_origins: vec!["https://minipad.example".to_string()],
            ..ApiConfig::default()
        };
        let _ = build_cors_layer(&config);
    }
}
