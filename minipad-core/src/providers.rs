//! Traits for the external collaborators.
//!
//! Both are best-effort from the point of view of the lifecycle: a failure is
//! logged by the caller and never rolls back a committed mutation.

use crate::{AttestationPayload, AttestationReceipt, Fid, MinipadResult, Profile, SchemaKind};
use async_trait::async_trait;

/// Client for the on-chain attestation service.
#[async_trait]
pub trait AttestationGateway: Send + Sync {
    /// Create an attestation for a payload.
    ///
    /// # Returns
    /// * `Ok(AttestationReceipt)` - The uid assigned by the service
    /// * `Err(MinipadError::External)` - If the schema is not configured or the call fails
    async fn attest(&self, payload: &AttestationPayload) -> MinipadResult<AttestationReceipt>;

    /// Revoke a previously issued attestation.
    async fn revoke(&self, uid: &str, kind: SchemaKind) -> MinipadResult<()>;

    /// Whether a schema uid is configured for this kind.
    fn is_enabled(&self, kind: SchemaKind) -> bool;
}

/// Resolves display profiles from the social identity provider.
#[async_trait]
pub trait ProfileResolver: Send + Sync {
    /// Fetch the profile for a Farcaster id.
    ///
    /// # Returns
    /// * `Ok(Some(Profile))` - The resolved profile
    /// * `Ok(None)` - The provider does not know this fid
    /// * `Err(MinipadError::External)` - If the provider is unreachable or answers garbage
    async fn resolve_profile(&self, fid: Fid) -> MinipadResult<Option<Profile>>;
}
