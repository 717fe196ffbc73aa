//! API Configuration Module
//!
//! Configuration is loaded from environment variables with defaults that
//! work for local development. Values that are present but unparsable are
//! reported as `ConfigError` instead of being silently replaced.

use crate::constants::{
    DEFAULT_BIND_HOST, DEFAULT_CORS_MAX_AGE_SECS, DEFAULT_IDENTITY_BASE_URL,
    DEFAULT_IDENTITY_CACHE_TTL_SECS, DEFAULT_IDENTITY_TIMEOUT_SECS, DEFAULT_LIST_LIMIT,
    DEFAULT_PORT, DEFAULT_WS_CAPACITY, MAX_LIST_LIMIT,
};
use minipad_core::{ConfigError, SchemaKind};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// ATTESTATION CONFIGURATION
// ============================================================================

/// Which attestation gateway the server wires in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttestationMode {
    /// No attestations; every call reports the schema as unconfigured
    #[default]
    Disabled,
    /// Synthetic uids computed locally
    Mock,
}

impl FromStr for AttestationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "disabled" | "off" => Ok(AttestationMode::Disabled),
            "mock" => Ok(AttestationMode::Mock),
            other => Err(ConfigError::InvalidValue {
                field: "MINIPAD_ATTESTATION_MODE".to_string(),
                value: other.to_string(),
                reason: "expected 'disabled' or 'mock'".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AttestationConfig {
    pub mode: AttestationMode,
    /// Schema uid per kind. A kind without an entry is skipped.
    pub schemas: BTreeMap<SchemaKind, String>,
}

// ============================================================================
// IDENTITY CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub cache_ttl: Duration,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_IDENTITY_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_IDENTITY_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_IDENTITY_CACHE_TTL_SECS),
        }
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // Server
    // ========================================================================
    pub bind_host: String,
    pub port: u16,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Listing
    // ========================================================================
    pub default_list_limit: usize,
    pub max_list_limit: usize,

    // ========================================================================
    // Collaborators
    // ========================================================================
    /// Capacity of the change feed broadcast channel.
    pub ws_capacity: usize,
    pub attestation: AttestationConfig,
    pub identity: IdentityConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_BIND_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: Vec::new(),
            cors_max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,
            default_list_limit: DEFAULT_LIST_LIMIT,
            max_list_limit: MAX_LIST_LIMIT,
            ws_capacity: DEFAULT_WS_CAPACITY,
            attestation: AttestationConfig::default(),
            identity: IdentityConfig::default(),
        }
    }
}

fn parse_field<T: FromStr>(field: &str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            field: field.to_string(),
            value,
            reason: "could not be parsed".to_string(),
        }),
    }
}

fn schema_env_var(kind: SchemaKind) -> String {
    format!("MINIPAD_SCHEMA_{}", kind.as_str())
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `MINIPAD_API_BIND`: Bind host (default: 0.0.0.0)
    /// - `PORT` / `MINIPAD_API_PORT`: Port (default: 3000)
    /// - `MINIPAD_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `MINIPAD_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `MINIPAD_DEFAULT_LIST_LIMIT` / `MINIPAD_MAX_LIST_LIMIT`: Board page sizes (20 / 100)
    /// - `MINIPAD_WS_CAPACITY`: Change feed buffer (default: 1000)
    /// - `MINIPAD_ATTESTATION_MODE`: `disabled` or `mock` (default: disabled)
    /// - `MINIPAD_SCHEMA_{IDEA,REMIX,CLAIM,COMPLETION}`: Schema uids
    /// - `MINIPAD_IDENTITY_BASE_URL`, `MINIPAD_IDENTITY_TIMEOUT_SECS`,
    ///   `MINIPAD_IDENTITY_CACHE_TTL_SECS`: Identity provider client
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_host = lookup("MINIPAD_API_BIND").unwrap_or(defaults.bind_host);
        let port = parse_field(
            "PORT",
            lookup("PORT").or_else(|| lookup("MINIPAD_API_PORT")),
            defaults.port,
        )?;

        let cors_origins = lookup("MINIPAD_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        let cors_max_age_secs = parse_field(
            "MINIPAD_CORS_MAX_AGE_SECS",
            lookup("MINIPAD_CORS_MAX_AGE_SECS"),
            defaults.cors_max_age_secs,
        )?;

        let default_list_limit = parse_field(
            "MINIPAD_DEFAULT_LIST_LIMIT",
            lookup("MINIPAD_DEFAULT_LIST_LIMIT"),
            defaults.default_list_limit,
        )?;
        let max_list_limit = parse_field(
            "MINIPAD_MAX_LIST_LIMIT",
            lookup("MINIPAD_MAX_LIST_LIMIT"),
            defaults.max_list_limit,
        )?;
        if default_list_limit == 0 || default_list_limit > max_list_limit {
            return Err(ConfigError::InvalidValue {
                field: "MINIPAD_DEFAULT_LIST_LIMIT".to_string(),
                value: default_list_limit.to_string(),
                reason: format!("must be between 1 and {}", max_list_limit),
            });
        }

        let ws_capacity = parse_field(
            "MINIPAD_WS_CAPACITY",
            lookup("MINIPAD_WS_CAPACITY"),
            defaults.ws_capacity,
        )?;
        if ws_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "MINIPAD_WS_CAPACITY".to_string(),
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        let mode = match lookup("MINIPAD_ATTESTATION_MODE") {
            Some(raw) => raw.parse()?,
            None => AttestationMode::default(),
        };
        let schemas = SchemaKind::ALL
            .iter()
            .filter_map(|kind| {
                lookup(&schema_env_var(*kind))
                    .map(|uid| uid.trim().to_string())
                    .filter(|uid| !uid.is_empty())
                    .map(|uid| (*kind, uid))
            })
            .collect();

        let identity = IdentityConfig {
            base_url: lookup("MINIPAD_IDENTITY_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.identity.base_url),
            timeout: Duration::from_secs(parse_field(
                "MINIPAD_IDENTITY_TIMEOUT_SECS",
                lookup("MINIPAD_IDENTITY_TIMEOUT_SECS"),
                DEFAULT_IDENTITY_TIMEOUT_SECS,
            )?),
            cache_ttl: Duration::from_secs(parse_field(
                "MINIPAD_IDENTITY_CACHE_TTL_SECS",
                lookup("MINIPAD_IDENTITY_CACHE_TTL_SECS"),
                DEFAULT_IDENTITY_CACHE_TTL_SECS,
            )?),
        };

        Ok(Self {
            bind_host,
            port,
            cors_origins,
            cors_max_age_secs,
            default_list_limit,
            max_list_limit,
            ws_capacity,
            attestation: AttestationConfig { mode, schemas },
            identity,
        })
    }

    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidValue {
            field: "MINIPAD_API_BIND".to_string(),
            value: addr.clone(),
            reason: "not a socket address".to_string(),
        })
    }

    /// Clamp a client-supplied limit to the configured bounds.
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_list_limit)
            .clamp(1, self.max_list_limit)
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            if allowed == origin {
                return true;
            }
            // *.example.com
            if let Some(pattern) = allowed.strip_prefix("*.") {
                if let Some(origin_domain) = origin.strip_prefix("https://") {
                    return origin_domain.ends_with(&format!(".{}", pattern))
                        || origin_domain == pattern;
                }
            }
            false
        })
    }
}
