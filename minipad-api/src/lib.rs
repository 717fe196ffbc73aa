//! Minipad API - REST/WebSocket Layer
//!
//! Axum server for the Minipad idea board. `services::Minipad` owns every
//! query and mutation; routes translate HTTP into calls on it, and each
//! committed mutation is published on the WebSocket change feed.

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod extractors;
pub mod macros;
pub mod openapi;
pub mod providers;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod types;
pub mod ws;

// Re-export commonly used types
pub use config::{ApiConfig, AttestationConfig, AttestationMode, IdentityConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use events::MinipadEvent;
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use services::{AttestationDispatch, AttestationTarget, Minipad, UnclaimOutcome};
pub use state::AppState;
pub use types::*;
pub use ws::ChangeFeed;
