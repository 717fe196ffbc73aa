//! Remix Service
//!
//! A remix is an idea with a back-reference to its original. Remixes go one
//! level deep.

use chrono::Utc;
use minipad_core::lifecycle::{check_delete_remix, check_remix_target};
use minipad_core::{Actor, AttestationPayload, Idea, IdeaId, MinipadResult, SchemaKind};
use tracing::info;

use super::{AttestationTarget, Minipad};
use crate::events::MinipadEvent;
use crate::types::{DeleteIdeaResponse, SubmitIdeaRequest};

impl Minipad {
    /// Create a remix of `original_id` authored by `actor`.
    ///
    /// The remix starts open with zero upvotes; nothing but the
    /// back-reference is inherited from the original.
    ///
    /// # Errors
    /// `NotFound` if the original does not exist (nothing is created),
    /// `ValidationError` for blank fields or when the original is itself a
    /// remix.
    pub async fn create_remix(
        &self,
        actor: &Actor,
        original_id: IdeaId,
        request: SubmitIdeaRequest,
    ) -> MinipadResult<Idea> {
        let draft = self.prepare_draft(actor, request).await?;

        let remix = {
            let _guard = self.gate.lock().await;
            let original = self.require_idea(original_id)?;
            check_remix_target(&original)?;
            let remix = Idea::remix_of(original_id, draft, Utc::now());
            self.storage.idea_insert(&remix)?;
            remix
        };

        info!(
            remix_id = %remix.idea_id,
            original_id = %original_id,
            author = %remix.author,
            "Remix created"
        );
        self.feed.broadcast(MinipadEvent::RemixCreated {
            remix: remix.clone(),
        });

        if remix.remix_attestation_uid.is_none() {
            self.attest_after_commit(
                AttestationTarget::Remix(remix.idea_id),
                AttestationPayload::for_remix(&remix),
            )
            .await;
        }
        Ok(remix)
    }

    /// Remixes of an idea in insertion order.
    pub fn list_remixes(&self, original_id: IdeaId) -> MinipadResult<Vec<Idea>> {
        self.storage.idea_list_by_original(original_id)
    }

    /// Delete a remix with its upvotes and claims.
    ///
    /// # Errors
    /// `NotFound`; `NotOwner` when `actor` is not the author;
    /// `ValidationError` when the idea is not a remix.
    pub async fn delete_remix(
        &self,
        actor: &Actor,
        remix_id: IdeaId,
    ) -> MinipadResult<DeleteIdeaResponse> {
        let (remix, removed) = {
            let _guard = self.gate.lock().await;
            let remix = self.require_idea(remix_id)?;
            check_delete_remix(&remix, &actor.address)?;
            let removed = self.cascade_delete(remix_id)?;
            (remix, removed)
        };

        info!(remix_id = %remix_id, "Remix deleted");
        self.feed.broadcast(MinipadEvent::RemixDeleted {
            idea_id: remix_id,
            original_idea_id: remix.original_idea_id,
        });
        self.revoke_after_commit(
            remix.remix_attestation_uid.or(remix.attestation_uid),
            SchemaKind::Remix,
        )
        .await;
        Ok(removed)
    }
}
