//! Collaborator Implementations
//!
//! Concrete clients behind the `AttestationGateway` and `ProfileResolver`
//! traits from `minipad_core`. `from_config` picks the implementation the
//! server wires in.

pub mod attestation;
pub mod identity;

pub use attestation::{DisabledGateway, MockGateway};
pub use identity::{NoopResolver, WarpcastResolver};

use crate::config::{ApiConfig, AttestationMode};
use minipad_core::{AttestationGateway, ConfigError, ProfileResolver};
use std::sync::Arc;

/// Build the attestation gateway selected by configuration.
pub fn gateway_from_config(config: &ApiConfig) -> Arc<dyn AttestationGateway> {
    match config.attestation.mode {
        AttestationMode::Disabled => Arc::new(DisabledGateway),
        AttestationMode::Mock => Arc::new(MockGateway::new(config.attestation.schemas.clone())),
    }
}

/// Build the identity provider client.
pub fn resolver_from_config(config: &ApiConfig) -> Result<Arc<dyn ProfileResolver>, ConfigError> {
    Ok(Arc::new(WarpcastResolver::new(config.identity.clone())?))
}
