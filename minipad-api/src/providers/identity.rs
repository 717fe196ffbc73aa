//! Farcaster profile resolution.
//!
//! Profiles are looked up on the Warpcast client API and cached for a short
//! TTL. Lookups are best-effort everywhere they are used.

use crate::config::IdentityConfig;
use async_trait::async_trait;
use minipad_core::{ConfigError, ExternalServiceError, Fid, MinipadResult, Profile, ProfileResolver};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::debug;

const SERVICE: &str = "identity provider";
const MAX_CACHE_ENTRIES: usize = 10_000;

// ============================================================================
// WIRE FORMAT
// ============================================================================

#[derive(Debug, Deserialize)]
struct UserByFidResponse {
    result: UserByFidResult,
}

#[derive(Debug, Deserialize)]
struct UserByFidResult {
    user: WarpcastUser,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WarpcastUser {
    fid: Fid,
    display_name: Option<String>,
    username: Option<String>,
    pfp: Option<WarpcastPfp>,
    profile: Option<WarpcastProfile>,
    #[serde(default)]
    follower_count: u64,
    #[serde(default)]
    following_count: u64,
}

#[derive(Debug, Deserialize)]
struct WarpcastPfp {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WarpcastProfile {
    bio: Option<WarpcastBio>,
}

#[derive(Debug, Deserialize)]
struct WarpcastBio {
    text: Option<String>,
}

impl From<WarpcastUser> for Profile {
    fn from(user: WarpcastUser) -> Self {
        Profile {
            fid: user.fid,
            display_name: user.display_name,
            username: user.username,
            avatar_url: user.pfp.and_then(|p| p.url),
            bio: user.profile.and_then(|p| p.bio).and_then(|b| b.text),
            follower_count: user.follower_count,
            following_count: user.following_count,
        }
    }
}

/// Decode a `user-by-fid` body.
fn parse_user_response(body: &str) -> MinipadResult<Profile> {
    let response: UserByFidResponse =
        serde_json::from_str(body).map_err(|e| ExternalServiceError::InvalidResponse {
            service: SERVICE.to_string(),
            reason: e.to_string(),
        })?;
    Ok(response.result.user.into())
}

// ============================================================================
// RESOLVER
// ============================================================================

struct CachedProfile {
    profile: Option<Profile>,
    expires_at: Instant,
}

/// HTTP client for the Warpcast `user-by-fid` endpoint.
pub struct WarpcastResolver {
    config: IdentityConfig,
    cache: RwLock<HashMap<Fid, CachedProfile>>,
    max_cache_entries: usize,
    http_client: reqwest::Client,
}

impl WarpcastResolver {
    /// # Errors
    /// `ConfigError` if the HTTP client cannot be built with the configured
    /// timeout.
    pub fn new(config: IdentityConfig) -> Result<Self, ConfigError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent("Mozilla/5.0 (compatible; MiniApp/1.0)")
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "MINIPAD_IDENTITY_TIMEOUT_SECS".to_string(),
                value: format!("{:?}", config.timeout),
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            config,
            cache: RwLock::new(HashMap::new()),
            max_cache_entries: MAX_CACHE_ENTRIES,
            http_client,
        })
    }

    fn user_url(&self, fid: Fid) -> String {
        format!("{}/v2/user-by-fid?fid={}", self.config.base_url, fid)
    }

    async fn get_cached(&self, fid: Fid) -> Option<Option<Profile>> {
        let cache = self.cache.read().await;
        cache.get(&fid).and_then(|cached| {
            if cached.expires_at > Instant::now() {
                Some(cached.profile.clone())
            } else {
                None
            }
        })
    }

    async fn cache_profile(&self, fid: Fid, profile: Option<Profile>) {
        let mut cache = self.cache.write().await;
        if cache.len() >= self.max_cache_entries && !cache.contains_key(&fid) {
            let now = Instant::now();
            cache.retain(|_, v| v.expires_at > now);
            if cache.len() >= self.max_cache_entries {
                let soonest = cache
                    .iter()
                    .min_by_key(|(_, cached)| cached.expires_at)
                    .map(|(fid, _)| *fid);
                if let Some(soonest) = soonest {
                    cache.remove(&soonest);
                }
            }
        }
        cache.insert(
            fid,
            CachedProfile {
                profile,
                expires_at: Instant::now() + self.config.cache_ttl,
            },
        );
    }

    async fn fetch(&self, fid: Fid) -> MinipadResult<Option<Profile>> {
        let url = self.user_url(fid);
        debug!(fid = fid, url = %url, "Resolving Farcaster profile");

        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExternalServiceError::Timeout {
                        service: SERVICE.to_string(),
                    }
                } else {
                    ExternalServiceError::RequestFailed {
                        service: SERVICE.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ExternalServiceError::RequestFailed {
                service: SERVICE.to_string(),
                reason: format!("HTTP {} from {}", response.status(), url),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| ExternalServiceError::InvalidResponse {
                service: SERVICE.to_string(),
                reason: e.to_string(),
            })?;
        parse_user_response(&body).map(Some)
    }
}

#[async_trait]
impl ProfileResolver for WarpcastResolver {
    async fn resolve_profile(&self, fid: Fid) -> MinipadResult<Option<Profile>> {
        if let Some(profile) = self.get_cached(fid).await {
            debug!(fid = fid, "Profile resolved from cache");
            return Ok(profile);
        }

        let profile = self.fetch(fid).await?;
        self.cache_profile(fid, profile.clone()).await;
        Ok(profile)
    }
}

/// Resolver that knows nobody. Used when enrichment is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolver;

#[async_trait]
impl ProfileResolver for NoopResolver {
    async fn resolve_profile(&self, _fid: Fid) -> MinipadResult<Option<Profile>> {
        Ok(None)
    }
}
