//! Minipad API Server Entry Point
//!
//! Loads configuration from the environment, wires the in-memory store and
//! the configured collaborators together, and serves the Axum router.

use std::sync::Arc;

use axum::Router;
use minipad_api::telemetry::{init_tracer, TelemetryConfig};
use minipad_api::{create_api_router, ApiConfig, ApiError, ApiResult, AppState};
use minipad_core::MinipadError;
use minipad_storage::InMemoryStorage;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::from_env()?;
    init_tracer(&telemetry_config)?;

    let config = ApiConfig::from_env().map_err(MinipadError::from)?;
    let addr = config.bind_addr().map_err(MinipadError::from)?;
    tracing::info!(
        attestation_mode = ?config.attestation.mode,
        schemas = config.attestation.schemas.len(),
        identity_base_url = %config.identity.base_url,
        "Configuration loaded"
    );

    let state =
        AppState::new(config, Arc::new(InMemoryStorage::new())).map_err(MinipadError::from)?;
    let app: Router = create_api_router(state);

    tracing::info!(%addr, "Starting Minipad API server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
