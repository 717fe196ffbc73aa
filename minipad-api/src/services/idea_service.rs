//! Idea Service
//!
//! Submission, board listing, attestation updates and deletion.

use chrono::Utc;
use minipad_core::lifecycle::check_delete;
use minipad_core::validation::{validate_address, validate_description, validate_title};
use minipad_core::{
    Actor, AttestationPayload, AuthorProfile, Idea, IdeaDraft, IdeaId, IdeaUpdate, MinipadResult,
    SchemaKind, ValidationError,
};
use tracing::{debug, info, warn};

use super::{AttestationTarget, Minipad};
use crate::events::MinipadEvent;
use crate::types::{DeleteIdeaResponse, IdeaFilter, IdeaSort, SubmitIdeaRequest};

impl Minipad {
    /// Submit a new idea authored by `actor`.
    ///
    /// Missing display fields are filled from the identity provider when a
    /// fid is known. The lookup never blocks submission.
    ///
    /// # Errors
    /// `ValidationError` for an empty address, title or description.
    pub async fn submit_idea(
        &self,
        actor: &Actor,
        request: SubmitIdeaRequest,
    ) -> MinipadResult<Idea> {
        let draft = self.prepare_draft(actor, request).await?;

        let idea = {
            let _guard = self.gate.lock().await;
            let idea = Idea::from_draft(draft, Utc::now());
            self.storage.idea_insert(&idea)?;
            idea
        };

        info!(idea_id = %idea.idea_id, author = %idea.author, "Idea submitted");
        self.feed.broadcast(MinipadEvent::IdeaSubmitted { idea: idea.clone() });

        if idea.attestation_uid.is_none() {
            self.attest_after_commit(
                AttestationTarget::Idea(idea.idea_id),
                AttestationPayload::for_idea(&idea),
            )
            .await;
        }
        Ok(idea)
    }

    /// Validate a submission and resolve its author profile.
    pub(super) async fn prepare_draft(
        &self,
        actor: &Actor,
        request: SubmitIdeaRequest,
    ) -> MinipadResult<IdeaDraft> {
        validate_address(&actor.address)?;
        validate_title(&request.title)?;
        validate_description(&request.description)?;

        let profile = self.enrich_profile(request.author_profile(actor)).await;
        Ok(IdeaDraft {
            title: request.title,
            description: request.description,
            author: actor.address.clone(),
            profile,
            attestation_uid: request.attestation_uid.filter(|uid| !uid.trim().is_empty()),
        })
    }

    async fn enrich_profile(&self, mut profile: AuthorProfile) -> AuthorProfile {
        let Some(fid) = profile.fid else {
            return profile;
        };
        if !profile.lacks_display_fields() {
            return profile;
        }

        match self.profiles.resolve_profile(fid).await {
            Ok(Some(resolved)) => profile.merge_from(&resolved),
            Ok(None) => debug!(fid = fid, "No profile known for fid"),
            Err(e) => warn!(fid = fid, error = %e, "Profile lookup failed, submitting without it"),
        }
        profile
    }

    pub fn get_idea(&self, idea_id: IdeaId) -> MinipadResult<Option<Idea>> {
        self.storage.idea_get(idea_id)
    }

    /// Board listing.
    ///
    /// Filtering happens before truncation, so a page is only short when
    /// fewer matching ideas exist.
    pub fn list_ideas(&self, filter: IdeaFilter) -> MinipadResult<Vec<Idea>> {
        let candidates = match (filter.status, filter.sort) {
            (Some(status), _) => self.storage.idea_list_by_status(status)?,
            (None, IdeaSort::Popular) if filter.include_remixes => {
                self.storage.idea_list_most_upvoted(filter.limit)?
            }
            (None, IdeaSort::Popular) => self.storage.idea_list_most_upvoted(usize::MAX)?,
            (None, IdeaSort::Newest) if filter.include_remixes => {
                self.storage.idea_list(filter.limit)?
            }
            (None, IdeaSort::Newest) => self.storage.idea_list(usize::MAX)?,
        };

        let mut ideas: Vec<Idea> = candidates
            .into_iter()
            .filter(|idea| filter.matches(idea))
            .collect();
        if filter.status.is_some() && filter.sort == IdeaSort::Popular {
            ideas.sort_by(|a, b| {
                b.upvotes
                    .cmp(&a.upvotes)
                    .then_with(|| b.timestamp.cmp(&a.timestamp))
                    .then_with(|| b.idea_id.cmp(&a.idea_id))
            });
        }
        ideas.truncate(filter.limit);
        Ok(ideas)
    }

    /// Record an attestation uid obtained after submission.
    ///
    /// # Errors
    /// `NotFound` if the idea does not exist, `ValidationError` for a blank uid.
    pub async fn update_idea_attestation(
        &self,
        idea_id: IdeaId,
        attestation_uid: String,
    ) -> MinipadResult<Idea> {
        if attestation_uid.trim().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "attestation_uid".to_string(),
            }
            .into());
        }

        let idea = {
            let _guard = self.gate.lock().await;
            self.storage.idea_update(
                idea_id,
                IdeaUpdate {
                    attestation_uid: Some(attestation_uid),
                    ..Default::default()
                },
            )?
        };

        self.feed.broadcast(MinipadEvent::IdeaUpdated { idea: idea.clone() });
        Ok(idea)
    }

    /// Delete an idea with all its upvotes and claims.
    ///
    /// Allowed in any status, for the author only. Remixes of the idea are
    /// left in place.
    ///
    /// # Errors
    /// `NotFound`, or `NotOwner` when `actor` is not the author.
    pub async fn delete_idea(
        &self,
        actor: &Actor,
        idea_id: IdeaId,
    ) -> MinipadResult<DeleteIdeaResponse> {
        let (idea, removed) = {
            let _guard = self.gate.lock().await;
            let idea = self.require_idea(idea_id)?;
            check_delete(&idea, &actor.address)?;
            let removed = self.cascade_delete(idea_id)?;
            (idea, removed)
        };

        info!(
            idea_id = %idea_id,
            upvotes_removed = removed.upvotes_removed,
            claims_removed = removed.claims_removed,
            "Idea deleted"
        );
        self.feed.broadcast(MinipadEvent::IdeaDeleted { idea_id });
        self.revoke_after_commit(idea.attestation_uid, SchemaKind::Idea)
            .await;
        Ok(removed)
    }

    /// Remove an idea and everything that references it. Caller holds the gate.
    pub(super) fn cascade_delete(&self, idea_id: IdeaId) -> MinipadResult<DeleteIdeaResponse> {
        let upvotes_removed = self.storage.upvote_delete_by_idea(idea_id)?;
        let claims_removed = self.storage.claim_delete_by_idea(idea_id)?;
        self.storage.idea_delete(idea_id)?;
        Ok(DeleteIdeaResponse {
            idea_id,
            upvotes_removed,
            claims_removed,
        })
    }
}
