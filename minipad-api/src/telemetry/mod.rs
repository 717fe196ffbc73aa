//! Minipad Telemetry
//!
//! Structured logging for the API server. Request spans come from
//! `tower_http::trace::TraceLayer` on the router.

pub mod tracer;

pub use tracer::{init_tracer, LogFormat, TelemetryConfig};
