//! User Views
//!
//! Per-wallet listings for profile pages.

use std::collections::HashSet;

use minipad_core::{ClaimStatus, Idea, IdeaId, MinipadResult};

use super::Minipad;

impl Minipad {
    /// Non-remix ideas authored by `author`, newest first.
    pub fn user_submitted_ideas(&self, author: &str) -> MinipadResult<Vec<Idea>> {
        Ok(self
            .storage
            .idea_list_by_author(author)?
            .into_iter()
            .filter(|idea| !idea.is_remix)
            .collect())
    }

    /// Ideas the user holds or has held a claim on, newest idea first.
    ///
    /// Claims whose idea has since been deleted are skipped.
    pub fn user_claimed_ideas(&self, claimer: &str) -> MinipadResult<Vec<Idea>> {
        let claims = self.storage.claim_list_by_claimer(claimer)?;
        let mut ideas = self.ideas_for(claims.into_iter().map(|c| c.idea_id))?;
        ideas.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.idea_id.cmp(&a.idea_id))
        });
        Ok(ideas)
    }

    /// Ideas of the user's completed claims, most recently completed first.
    pub fn user_completed_ideas(&self, claimer: &str) -> MinipadResult<Vec<Idea>> {
        let claims = self.storage.claim_list_by_claimer(claimer)?;
        let mut ideas = self.ideas_for(
            claims
                .into_iter()
                .filter(|c| c.status == ClaimStatus::Completed)
                .map(|c| c.idea_id),
        )?;
        ideas.sort_by(|a, b| {
            b.completion_sort_key()
                .cmp(&a.completion_sort_key())
                .then_with(|| b.idea_id.cmp(&a.idea_id))
        });
        Ok(ideas)
    }

    fn ideas_for(&self, ids: impl Iterator<Item = IdeaId>) -> MinipadResult<Vec<Idea>> {
        let mut seen = HashSet::new();
        let mut ideas = Vec::new();
        for id in ids {
            if !seen.insert(id) {
                continue;
            }
            if let Some(idea) = self.storage.idea_get(id)? {
                ideas.push(idea);
            }
        }
        Ok(ideas)
    }
}
