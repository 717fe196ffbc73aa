//! Service Layer
//!
//! `Minipad` is the single entry point for every query and mutation. Routes
//! translate HTTP into calls on it; tests drive it directly.
//!
//! Each mutation takes the write gate for its whole read-validate-write
//! sequence, so the lifecycle checks always see the state they commit
//! against. Events are broadcast after the gate is released. Attestation
//! and revocation calls run after commit and can only log on failure.

mod claim_service;
mod idea_service;
mod remix_service;
mod upvote_service;
mod user_service;

pub use claim_service::UnclaimOutcome;

use std::sync::Arc;

use minipad_core::{
    AttestationGateway, AttestationPayload, AttestationReceipt, ClaimId, ClaimUpdate, EntityType,
    Idea, IdeaId, IdeaUpdate, MinipadError, MinipadResult, ProfileResolver, SchemaKind,
    StorageError,
};
use minipad_storage::StorageTrait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::events::MinipadEvent;
use crate::providers::{DisabledGateway, NoopResolver};
use crate::ws::ChangeFeed;

/// How post-commit attestation work is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttestationDispatch {
    /// Spawn a task and return immediately
    #[default]
    Background,
    /// Await the call before returning. The mutation outcome is the same
    /// either way; this only makes the uid visible on the next read.
    Inline,
}

/// Record that receives the uid of a successful attestation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttestationTarget {
    Idea(IdeaId),
    Remix(IdeaId),
    Claim { idea_id: IdeaId, claim_id: ClaimId },
    Completion {
        idea_id: IdeaId,
        claim_id: Option<ClaimId>,
    },
}

/// Application service over storage, collaborators and the change feed.
#[derive(Clone)]
pub struct Minipad {
    storage: Arc<dyn StorageTrait>,
    attestation: Arc<dyn AttestationGateway>,
    profiles: Arc<dyn ProfileResolver>,
    feed: Arc<ChangeFeed>,
    gate: Arc<Mutex<()>>,
    dispatch: AttestationDispatch,
}

impl Minipad {
    /// Service with attestations disabled and no profile enrichment.
    pub fn new(storage: Arc<dyn StorageTrait>, feed: Arc<ChangeFeed>) -> Self {
        Self {
            storage,
            attestation: Arc::new(DisabledGateway),
            profiles: Arc::new(NoopResolver),
            feed,
            gate: Arc::new(Mutex::new(())),
            dispatch: AttestationDispatch::default(),
        }
    }

    pub fn with_attestation(mut self, gateway: Arc<dyn AttestationGateway>) -> Self {
        self.attestation = gateway;
        self
    }

    pub fn with_profiles(mut self, resolver: Arc<dyn ProfileResolver>) -> Self {
        self.profiles = resolver;
        self
    }

    pub fn with_dispatch(mut self, dispatch: AttestationDispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn storage(&self) -> &Arc<dyn StorageTrait> {
        &self.storage
    }

    pub fn feed(&self) -> &Arc<ChangeFeed> {
        &self.feed
    }

    pub fn profiles(&self) -> &Arc<dyn ProfileResolver> {
        &self.profiles
    }

    /// Load an idea or fail with `NotFound`.
    fn require_idea(&self, idea_id: IdeaId) -> MinipadResult<Idea> {
        self.storage
            .idea_get(idea_id)?
            .ok_or_else(|| MinipadError::not_found(EntityType::Idea, idea_id))
    }

    // ========================================================================
    // ATTESTATION
    // ========================================================================

    /// Attest `payload` and write the resulting uid onto `target`.
    ///
    /// Returns `Ok(None)` without calling the gateway when the schema kind is
    /// not enabled.
    ///
    /// # Errors
    /// Gateway failures, or `NotFound` if the target was deleted while the
    /// call was in flight.
    pub async fn record_attestation(
        &self,
        target: AttestationTarget,
        payload: AttestationPayload,
    ) -> MinipadResult<Option<AttestationReceipt>> {
        if !self.attestation.is_enabled(payload.kind) {
            debug!(kind = %payload.kind, "Attestation schema disabled, skipping");
            return Ok(None);
        }

        let receipt = self.attestation.attest(&payload).await?;
        let uid = receipt.uid.clone();

        let updated = {
            let _guard = self.gate.lock().await;
            match target {
                AttestationTarget::Idea(idea_id) => Some(self.storage.idea_update(
                    idea_id,
                    IdeaUpdate {
                        attestation_uid: Some(uid),
                        ..Default::default()
                    },
                )?),
                AttestationTarget::Remix(idea_id) => Some(self.storage.idea_update(
                    idea_id,
                    IdeaUpdate {
                        attestation_uid: Some(uid.clone()),
                        remix_attestation_uid: Some(uid),
                        ..Default::default()
                    },
                )?),
                AttestationTarget::Claim { claim_id, .. } => {
                    self.storage.claim_update(
                        claim_id,
                        ClaimUpdate {
                            attestation_uid: Some(uid),
                            ..Default::default()
                        },
                    )?;
                    None
                }
                AttestationTarget::Completion { idea_id, claim_id } => {
                    if let Some(claim_id) = claim_id {
                        self.storage.claim_update(
                            claim_id,
                            ClaimUpdate {
                                completion_attestation_uid: Some(uid.clone()),
                                ..Default::default()
                            },
                        )?;
                    }
                    Some(self.storage.idea_update(
                        idea_id,
                        IdeaUpdate {
                            completion_attestation_uid: Some(uid),
                            ..Default::default()
                        },
                    )?)
                }
            }
        };

        if let Some(idea) = updated {
            self.feed.broadcast(MinipadEvent::IdeaUpdated { idea });
        }
        Ok(Some(receipt))
    }

    async fn run_attestation(&self, target: AttestationTarget, payload: AttestationPayload) {
        let kind = payload.kind;
        match self.record_attestation(target, payload).await {
            Ok(Some(receipt)) => {
                info!(kind = %kind, uid = %receipt.uid, target = ?target, "Attestation recorded");
            }
            Ok(None) => {}
            Err(MinipadError::Storage(StorageError::NotFound { .. })) => {
                debug!(kind = %kind, target = ?target, "Attested record no longer exists");
            }
            Err(e) => {
                warn!(kind = %kind, target = ?target, error = %e, "Attestation failed, mutation kept");
            }
        }
    }

    /// Schedule an attestation for a committed mutation.
    async fn attest_after_commit(&self, target: AttestationTarget, payload: AttestationPayload) {
        match self.dispatch {
            AttestationDispatch::Inline => self.run_attestation(target, payload).await,
            AttestationDispatch::Background => {
                let service = self.clone();
                tokio::spawn(async move {
                    service.run_attestation(target, payload).await;
                });
            }
        }
    }

    async fn run_revocation(&self, uid: String, kind: SchemaKind) {
        match self.attestation.revoke(&uid, kind).await {
            Ok(()) => info!(kind = %kind, uid = %uid, "Attestation revoked"),
            Err(e) => warn!(kind = %kind, uid = %uid, error = %e, "Revocation failed"),
        }
    }

    /// Best-effort revocation of an attestation whose record is gone.
    async fn revoke_after_commit(&self, uid: Option<String>, kind: SchemaKind) {
        let Some(uid) = uid else { return };
        if !self.attestation.is_enabled(kind) {
            return;
        }
        match self.dispatch {
            AttestationDispatch::Inline => self.run_revocation(uid, kind).await,
            AttestationDispatch::Background => {
                let service = self.clone();
                tokio::spawn(async move {
                    service.run_revocation(uid, kind).await;
                });
            }
        }
    }
}
