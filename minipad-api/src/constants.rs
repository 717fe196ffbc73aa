//! Constants for Minipad API

// ============================================================================
// SERVER
// ============================================================================

pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 3000;

/// Default CORS max age in seconds (24 hours)
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 86400;

// ============================================================================
// LISTING
// ============================================================================

/// Page size when a board query names no limit
pub const DEFAULT_LIST_LIMIT: usize = 20;

/// Upper bound for any client-supplied limit
pub const MAX_LIST_LIMIT: usize = 100;

// ============================================================================
// CHANGE FEED
// ============================================================================

/// Broadcast buffer for the WebSocket change feed
pub const DEFAULT_WS_CAPACITY: usize = 1000;

// ============================================================================
// IDENTITY PROVIDER
// ============================================================================

pub const DEFAULT_IDENTITY_BASE_URL: &str = "https://client.warpcast.com";

pub const DEFAULT_IDENTITY_TIMEOUT_SECS: u64 = 5;

/// How long a resolved profile is served from cache
pub const DEFAULT_IDENTITY_CACHE_TTL_SECS: u64 = 300;

// ============================================================================
// HEADERS
// ============================================================================

/// Connected wallet of the caller
pub const WALLET_ADDRESS_HEADER: &str = "x-wallet-address";

/// Farcaster id of the caller, when signed in through a frame
pub const FARCASTER_FID_HEADER: &str = "x-farcaster-fid";
