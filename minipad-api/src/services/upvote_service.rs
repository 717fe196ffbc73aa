//! Upvote Service
//!
//! The ledger keeps at most one upvote per (idea, voter) and the idea's
//! counter equal to the number of rows. Both primitives used here update the
//! row and the counter in one storage call.

use chrono::Utc;
use minipad_core::validation::validate_address;
use minipad_core::{Actor, IdeaId, MinipadResult, Upvote};
use tracing::debug;

use super::Minipad;
use crate::events::MinipadEvent;
use crate::types::UpvoteResponse;

impl Minipad {
    /// Upvote an idea. A repeated upvote is a no-op that reports
    /// `changed: false`.
    ///
    /// # Errors
    /// `NotFound` if the idea does not exist.
    pub async fn upvote(&self, actor: &Actor, idea_id: IdeaId) -> MinipadResult<UpvoteResponse> {
        validate_address(&actor.address)?;

        let (changed, upvotes) = {
            let _guard = self.gate.lock().await;
            self.require_idea(idea_id)?;
            let upvote = Upvote::new(idea_id, actor.address.clone(), Utc::now());
            let changed = self.storage.upvote_insert_if_absent(&upvote)?;
            (changed, self.require_idea(idea_id)?.upvotes)
        };

        if changed {
            self.feed.broadcast(MinipadEvent::UpvoteAdded {
                idea_id,
                voter: actor.address.clone(),
                upvotes,
            });
        } else {
            debug!(idea_id = %idea_id, voter = %actor.address, "Already upvoted");
        }

        Ok(UpvoteResponse {
            idea_id,
            upvotes,
            has_upvoted: true,
            changed,
        })
    }

    /// Withdraw an upvote. Without an existing upvote this is a no-op.
    ///
    /// # Errors
    /// `NotFound` if the idea does not exist.
    pub async fn remove_upvote(
        &self,
        actor: &Actor,
        idea_id: IdeaId,
    ) -> MinipadResult<UpvoteResponse> {
        validate_address(&actor.address)?;

        let (changed, upvotes) = {
            let _guard = self.gate.lock().await;
            self.require_idea(idea_id)?;
            let changed = self.storage.upvote_remove(idea_id, &actor.address)?;
            (changed, self.require_idea(idea_id)?.upvotes)
        };

        if changed {
            self.feed.broadcast(MinipadEvent::UpvoteRemoved {
                idea_id,
                voter: actor.address.clone(),
                upvotes,
            });
        }

        Ok(UpvoteResponse {
            idea_id,
            upvotes,
            has_upvoted: false,
            changed,
        })
    }

    pub fn has_upvoted(&self, idea_id: IdeaId, voter: &str) -> MinipadResult<bool> {
        Ok(self.storage.upvote_find(idea_id, voter)?.is_some())
    }

    /// Counter value; 0 for unknown ideas.
    pub fn upvote_count(&self, idea_id: IdeaId) -> MinipadResult<u64> {
        Ok(self
            .storage
            .idea_get(idea_id)?
            .map(|idea| idea.upvotes)
            .unwrap_or(0))
    }
}
