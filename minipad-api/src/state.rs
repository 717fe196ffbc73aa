//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use minipad_core::{ConfigError, ProfileResolver};
use minipad_storage::StorageTrait;

use crate::config::ApiConfig;
use crate::providers::{gateway_from_config, resolver_from_config};
use crate::services::Minipad;
use crate::ws::ChangeFeed;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub minipad: Arc<Minipad>,
    pub feed: Arc<ChangeFeed>,
    pub profiles: Arc<dyn ProfileResolver>,
    pub config: Arc<ApiConfig>,
    pub start_time: Instant,
}

impl AppState {
    /// Wire storage and the configured collaborators together.
    ///
    /// # Errors
    /// `ConfigError` if a collaborator client cannot be built.
    pub fn new(config: ApiConfig, storage: Arc<dyn StorageTrait>) -> Result<Self, ConfigError> {
        let feed = Arc::new(ChangeFeed::new(config.ws_capacity));
        let profiles = resolver_from_config(&config)?;
        let minipad = Minipad::new(storage, feed.clone())
            .with_attestation(gateway_from_config(&config))
            .with_profiles(profiles);
        Ok(Self::from_service(config, minipad))
    }

    /// State around an already-built service, e.g. one with test doubles.
    pub fn from_service(config: ApiConfig, minipad: Minipad) -> Self {
        Self {
            feed: minipad.feed().clone(),
            profiles: minipad.profiles().clone(),
            minipad: Arc::new(minipad),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }
}

crate::impl_from_ref!(Arc<Minipad>, minipad);
crate::impl_from_ref!(Arc<ChangeFeed>, feed);
crate::impl_from_ref!(Arc<dyn ProfileResolver>, profiles);
crate::impl_from_ref!(Arc<ApiConfig>, config);
crate::impl_from_ref!(Instant, start_time);

#[cfg(test)]
mod tests {
    use super::*;
    use minipad_storage::InMemoryStorage;

    #[test]
    fn test_new_wires_configured_collaborators() {
        let config = ApiConfig {
            ws_capacity: 8,
            ..ApiConfig::default()
        };
        let state = AppState::new(config, Arc::new(InMemoryStorage::new())).unwrap();
        assert_eq!(state.config.ws_capacity, 8);
        assert!(Arc::ptr_eq(&state.feed, state.minipad.feed()));
        assert!(Arc::ptr_eq(&state.profiles, state.minipad.profiles()));
    }
}
