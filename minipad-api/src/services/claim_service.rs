//! Claim Service
//!
//! `open -> claimed -> completed`, with `claimed -> open` on release. The
//! transition rules live in `minipad_core::lifecycle`; this module commits
//! their plans.

use chrono::Utc;
use minipad_core::lifecycle::{plan_claim, plan_complete, plan_unclaim};
use minipad_core::validation::{validate_address, validate_url};
use minipad_core::{Actor, AttestationPayload, Claim, Idea, IdeaId, MinipadResult, SchemaKind};
use tracing::info;

use super::{AttestationTarget, Minipad};
use crate::events::MinipadEvent;
use crate::types::{ClaimIdeaRequest, CompleteIdeaRequest};

/// Result of releasing a claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnclaimOutcome {
    pub idea: Idea,
    /// Attestation of the deleted claim, if one had been recorded
    pub attestation_uid: Option<String>,
}

impl Minipad {
    /// Claim an open idea for `actor`.
    ///
    /// # Errors
    /// `NotFound`, or `InvalidTransition` if the idea is not open. Nothing
    /// is written on failure.
    pub async fn claim_idea(
        &self,
        actor: &Actor,
        idea_id: IdeaId,
        request: ClaimIdeaRequest,
    ) -> MinipadResult<(Idea, Claim)> {
        validate_address(&actor.address)?;
        let attestation_uid = request.attestation_uid.filter(|uid| !uid.trim().is_empty());

        let (idea, claim) = {
            let _guard = self.gate.lock().await;
            let idea = self.require_idea(idea_id)?;
            let plan = plan_claim(&idea, actor, attestation_uid, Utc::now())?;
            self.storage.claim_insert(&plan.claim)?;
            let idea = self.storage.idea_update(idea_id, plan.idea_update)?;
            (idea, plan.claim)
        };

        info!(idea_id = %idea_id, claimer = %actor.address, claim_id = %claim.claim_id, "Idea claimed");
        self.feed.broadcast(MinipadEvent::IdeaClaimed {
            idea: idea.clone(),
            claim: claim.clone(),
        });

        if claim.attestation_uid.is_none() {
            self.attest_after_commit(
                AttestationTarget::Claim {
                    idea_id,
                    claim_id: claim.claim_id,
                },
                AttestationPayload::for_claim(
                    idea_id,
                    claim.claim_id,
                    &claim.claimer,
                    claim.claimer_fid,
                    claim.timestamp,
                ),
            )
            .await;
        }
        Ok((idea, claim))
    }

    /// Release a claim, returning the idea to `open`.
    ///
    /// The claimer's active claim record is deleted and its attestation
    /// revoked best-effort.
    ///
    /// # Errors
    /// `NotFound`; `NotOwner` if `actor` does not hold the claim (checked
    /// first); `InvalidTransition` if the idea is not claimed.
    pub async fn unclaim_idea(&self, actor: &Actor, idea_id: IdeaId) -> MinipadResult<UnclaimOutcome> {
        let (idea, claim) = {
            let _guard = self.gate.lock().await;
            let idea = self.require_idea(idea_id)?;
            let update = plan_unclaim(&idea, &actor.address)?;
            let claim = self.storage.claim_find_active(idea_id, &actor.address)?;
            if let Some(claim) = &claim {
                self.storage.claim_delete(claim.claim_id)?;
            }
            let idea = self.storage.idea_update(idea_id, update)?;
            (idea, claim)
        };

        info!(idea_id = %idea_id, claimer = %actor.address, "Idea unclaimed");
        self.feed.broadcast(MinipadEvent::IdeaUnclaimed {
            idea: idea.clone(),
            claimer: actor.address.clone(),
        });

        let attestation_uid = claim.and_then(|c| c.attestation_uid);
        self.revoke_after_commit(attestation_uid.clone(), SchemaKind::Claim)
            .await;
        Ok(UnclaimOutcome {
            idea,
            attestation_uid,
        })
    }

    /// Mark a claimed idea completed. The claimer's claim is marked
    /// completed alongside when it exists.
    ///
    /// # Errors
    /// `NotFound`; `ValidationError` for a malformed URL; `NotOwner` if
    /// `actor` is not the claimer (checked first); `InvalidTransition` if
    /// the idea is not claimed.
    pub async fn complete_idea(
        &self,
        actor: &Actor,
        idea_id: IdeaId,
        request: CompleteIdeaRequest,
    ) -> MinipadResult<(Idea, Option<Claim>)> {
        let details = request.details();
        validate_url("deployment_url", &details.deployment_url)?;
        if let Some(github_url) = &details.github_url {
            validate_url("github_url", github_url)?;
        }

        let (idea, claim) = {
            let _guard = self.gate.lock().await;
            let idea = self.require_idea(idea_id)?;
            let plan = plan_complete(&idea, &actor.address, &details, Utc::now())?;
            let claim = match self.storage.claim_find_active(idea_id, &actor.address)? {
                Some(active) => Some(self.storage.claim_update(active.claim_id, plan.claim_update)?),
                None => None,
            };
            let idea = self.storage.idea_update(idea_id, plan.idea_update)?;
            (idea, claim)
        };

        info!(idea_id = %idea_id, claimer = %actor.address, "Idea completed");
        self.feed.broadcast(MinipadEvent::IdeaCompleted {
            idea: idea.clone(),
            claim: claim.clone(),
        });

        if idea.completion_attestation_uid.is_none() {
            let completed_at = idea.completed_at.unwrap_or(idea.timestamp);
            self.attest_after_commit(
                AttestationTarget::Completion {
                    idea_id,
                    claim_id: claim.as_ref().map(|c| c.claim_id),
                },
                AttestationPayload::for_completion(
                    idea_id,
                    &actor.address,
                    &details.deployment_url,
                    actor.fid,
                    completed_at,
                ),
            )
            .await;
        }
        Ok((idea, claim))
    }

    /// All claims ever recorded for an idea, oldest first.
    pub fn claims_for_idea(&self, idea_id: IdeaId) -> MinipadResult<Vec<Claim>> {
        self.storage.claim_list_by_idea(idea_id)
    }

    pub fn claims_by_user(&self, claimer: &str) -> MinipadResult<Vec<Claim>> {
        self.storage.claim_list_by_claimer(claimer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SubmitIdeaRequest;
    use crate::ws::ChangeFeed;
    use minipad_core::{ClaimStatus, ErrorKind, IdeaStatus};
    use minipad_storage::InMemoryStorage;
    use std::sync::Arc;

    async fn service_with_idea() -> (Minipad, IdeaId) {
        let minipad = Minipad::new(Arc::new(InMemoryStorage::new()), Arc::new(ChangeFeed::new(64)));
        let idea = minipad
            .submit_idea(&Actor::new("0xa"), SubmitIdeaRequest::new("Tip jar", "Tips"))
            .await
            .unwrap();
        (minipad, idea.idea_id)
    }

    #[tokio::test]
    async fn test_claim_then_second_claim_conflicts() {
        let (minipad, idea_id) = service_with_idea().await;
        let (idea, claim) = minipad
            .claim_idea(&Actor::new("0xb"), idea_id, ClaimIdeaRequest::default())
            .await
            .unwrap();
        assert_eq!(idea.status, IdeaStatus::Claimed);
        assert_eq!(idea.claimed_by.as_deref(), Some("0xb"));
        assert_eq!(claim.status, ClaimStatus::Claimed);

        let err = minipad
            .claim_idea(&Actor::new("0xc"), idea_id, ClaimIdeaRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert_eq!(minipad.claims_for_idea(idea_id).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unclaim_by_other_user_changes_nothing() {
        let (minipad, idea_id) = service_with_idea().await;
        minipad
            .claim_idea(&Actor::new("0xb"), idea_id, ClaimIdeaRequest::default())
            .await
            .unwrap();
        let before = minipad.get_idea(idea_id).unwrap();

        let err = minipad
            .unclaim_idea(&Actor::new("0xd"), idea_id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOwner);
        assert_eq!(minipad.get_idea(idea_id).unwrap(), before);
    }

    #[tokio::test]
    async fn test_unclaim_returns_claim_attestation() {
        let (minipad, idea_id) = service_with_idea().await;
        minipad
            .claim_idea(
                &Actor::new("0xb"),
                idea_id,
                ClaimIdeaRequest {
                    attestation_uid: Some("0xclaim".to_string()),
                },
            )
            .await
            .unwrap();

        let outcome = minipad
            .unclaim_idea(&Actor::new("0xb"), idea_id)
            .await
            .unwrap();
        assert_eq!(outcome.attestation_uid.as_deref(), Some("0xclaim"));
        assert_eq!(outcome.idea.status, IdeaStatus::Open);
        assert!(outcome.idea.claimed_by.is_none());
        assert!(outcome.idea.claimed_at.is_none());
        assert!(minipad.claims_for_idea(idea_id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_complete_requires_claimer_and_valid_url() {
        let (minipad, idea_id) = service_with_idea().await;
        minipad
            .claim_idea(&Actor::new("0xb"), idea_id, ClaimIdeaRequest::default())
            .await
            .unwrap();

        let err = minipad
            .complete_idea(&Actor::new("0xb"), idea_id, CompleteIdeaRequest::new("ftp://x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = minipad
            .complete_idea(
                &Actor::new("0xc"),
                idea_id,
                CompleteIdeaRequest::new("https://app.example"),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOwner);

        let (idea, claim) = minipad
            .complete_idea(
                &Actor::new("0xb"),
                idea_id,
                CompleteIdeaRequest::new("https://app.example"),
            )
            .await
            .unwrap();
        assert_eq!(idea.status, IdeaStatus::Completed);
        assert_eq!(idea.deployment_url.as_deref(), Some("https://app.example"));
        let claim = claim.unwrap();
        assert_eq!(claim.status, ClaimStatus::Completed);
        assert_eq!(claim.miniapp_url.as_deref(), Some("https://app.example"));
        assert!(claim.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_claim_of_open_idea_is_the_only_entry() {
        let (minipad, idea_id) = service_with_idea().await;
        let err = minipad
            .unclaim_idea(&Actor::new("0xb"), idea_id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOwner);

        let err = minipad
            .complete_idea(
                &Actor::new("0xb"),
                idea_id,
                CompleteIdeaRequest::new("https://app.example"),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOwner);
    }

    #[tokio::test]
    async fn test_claims_by_user() {
        let (minipad, idea_id) = service_with_idea().await;
        minipad
            .claim_idea(&Actor::new("0xb"), idea_id, ClaimIdeaRequest::default())
            .await
            .unwrap();
        assert_eq!(minipad.claims_by_user("0xb").unwrap().len(), 1);
        assert!(minipad.claims_by_user("0xc").unwrap().is_empty());
    }
}
