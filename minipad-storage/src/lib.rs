//! Minipad Storage - Storage Trait and In-Memory Implementation
//!
//! Defines the storage abstraction for ideas, upvotes and claims. The store
//! is the sole mutator of persisted records; lifecycle checks happen before
//! any call into it.

use minipad_core::{
    Claim, ClaimId, ClaimStatus, ClaimUpdate, EntityType, Idea, IdeaId, IdeaStatus, IdeaUpdate,
    MinipadError, MinipadResult, StorageError, Upvote, UpvoteId, WalletAddress,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

// ============================================================================
// STORAGE TRAIT
// ============================================================================

/// Storage trait for Minipad entities.
pub trait StorageTrait: Send + Sync {
    // === Idea Operations ===

    /// Insert a new idea. Fails if the id is already taken.
    fn idea_insert(&self, idea: &Idea) -> MinipadResult<()>;

    /// Get an idea by ID.
    fn idea_get(&self, id: IdeaId) -> MinipadResult<Option<Idea>>;

    /// Newest first, remixes included.
    fn idea_list(&self, limit: usize) -> MinipadResult<Vec<Idea>>;

    /// Apply a partial update and return the new record.
    fn idea_update(&self, id: IdeaId, update: IdeaUpdate) -> MinipadResult<Idea>;

    /// Delete an idea. Upvotes and claims are not touched.
    fn idea_delete(&self, id: IdeaId) -> MinipadResult<()>;

    /// Ideas (and remixes) by author, newest first.
    fn idea_list_by_author(&self, author: &str) -> MinipadResult<Vec<Idea>>;

    /// Ideas in a status, newest first.
    fn idea_list_by_status(&self, status: IdeaStatus) -> MinipadResult<Vec<Idea>>;

    /// Remixes of an idea in insertion order.
    fn idea_list_by_original(&self, original: IdeaId) -> MinipadResult<Vec<Idea>>;

    /// Highest upvote count first, ties broken by recency.
    fn idea_list_most_upvoted(&self, limit: usize) -> MinipadResult<Vec<Idea>>;

    // === Upvote Operations ===

    /// Insert the upvote and bump the idea counter in one step.
    /// Returns false, changing nothing, when the voter already upvoted.
    fn upvote_insert_if_absent(&self, upvote: &Upvote) -> MinipadResult<bool>;

    /// Remove the voter's upvote and decrement the counter (floored at 0) in
    /// one step. Returns false when there was nothing to remove.
    fn upvote_remove(&self, idea_id: IdeaId, voter: &str) -> MinipadResult<bool>;

    fn upvote_find(&self, idea_id: IdeaId, voter: &str) -> MinipadResult<Option<Upvote>>;

    fn upvote_list_by_idea(&self, idea_id: IdeaId) -> MinipadResult<Vec<Upvote>>;

    fn upvote_list_by_voter(&self, voter: &str) -> MinipadResult<Vec<Upvote>>;

    /// Delete every upvote referencing the idea; returns how many were removed.
    fn upvote_delete_by_idea(&self, idea_id: IdeaId) -> MinipadResult<usize>;

    // === Claim Operations ===

    fn claim_insert(&self, claim: &Claim) -> MinipadResult<()>;

    fn claim_get(&self, id: ClaimId) -> MinipadResult<Option<Claim>>;

    /// The claimer's open (not yet completed) claim on the idea, if any.
    fn claim_find_active(&self, idea_id: IdeaId, claimer: &str) -> MinipadResult<Option<Claim>>;

    fn claim_update(&self, id: ClaimId, update: ClaimUpdate) -> MinipadResult<Claim>;

    fn claim_delete(&self, id: ClaimId) -> MinipadResult<()>;

    /// Claims on an idea, oldest first.
    fn claim_list_by_idea(&self, idea_id: IdeaId) -> MinipadResult<Vec<Claim>>;

    /// Claims by a user, newest first.
    fn claim_list_by_claimer(&self, claimer: &str) -> MinipadResult<Vec<Claim>>;

    /// Delete every claim referencing the idea; returns how many were removed.
    fn claim_delete_by_idea(&self, idea_id: IdeaId) -> MinipadResult<usize>;
}

// ============================================================================
// IN-MEMORY STORAGE
// ============================================================================

#[derive(Debug, Default)]
struct Tables {
    ideas: HashMap<IdeaId, Idea>,
    ideas_by_author: HashMap<WalletAddress, BTreeSet<IdeaId>>,
    ideas_by_status: HashMap<IdeaStatus, BTreeSet<IdeaId>>,
    remixes_by_original: HashMap<IdeaId, BTreeSet<IdeaId>>,

    upvotes: HashMap<UpvoteId, Upvote>,
    upvote_by_pair: HashMap<(IdeaId, WalletAddress), UpvoteId>,

    claims: HashMap<ClaimId, Claim>,
    claims_by_idea: HashMap<IdeaId, BTreeSet<ClaimId>>,
}

impl Tables {
    fn collect_ideas<'a>(&self, ids: impl IntoIterator<Item = &'a IdeaId>) -> Vec<Idea> {
        ids.into_iter()
            .filter_map(|id| self.ideas.get(id))
            .cloned()
            .collect()
    }

    fn index_status(&mut self, id: IdeaId, from: Option<IdeaStatus>, to: IdeaStatus) {
        if let Some(from) = from {
            if let Some(set) = self.ideas_by_status.get_mut(&from) {
                set.remove(&id);
            }
        }
        self.ideas_by_status.entry(to).or_default().insert(id);
    }
}

fn newest_first(ideas: &mut [Idea]) {
    ideas.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.idea_id.cmp(&a.idea_id))
    });
}

fn remove_indexed<K, V>(index: &mut HashMap<K, BTreeSet<V>>, key: &K, value: &V)
where
    K: std::hash::Hash + Eq,
    V: Ord,
{
    if let Some(set) = index.get_mut(key) {
        set.remove(value);
        if set.is_empty() {
            index.remove(key);
        }
    }
}

/// In-memory storage.
///
/// All tables sit behind a single lock, so primitives that touch more than
/// one table (upvote plus counter, cascades) are atomic.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    tables: RwLock<Tables>,
}

impl InMemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> MinipadResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| MinipadError::Storage(StorageError::LockPoisoned))
    }

    fn write(&self) -> MinipadResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| MinipadError::Storage(StorageError::LockPoisoned))
    }

    /// Clear all stored data.
    pub fn clear(&self) -> MinipadResult<()> {
        *self.write()? = Tables::default();
        Ok(())
    }

    /// Number of stored ideas, remixes included.
    pub fn idea_count(&self) -> MinipadResult<usize> {
        Ok(self.read()?.ideas.len())
    }

    /// Number of stored upvote rows.
    pub fn upvote_row_count(&self) -> MinipadResult<usize> {
        Ok(self.read()?.upvotes.len())
    }

    /// Number of stored claim rows.
    pub fn claim_count(&self) -> MinipadResult<usize> {
        Ok(self.read()?.claims.len())
    }
}

impl StorageTrait for InMemoryStorage {
    // === Idea Operations ===

    fn idea_insert(&self, idea: &Idea) -> MinipadResult<()> {
        let mut tables = self.write()?;
        if tables.ideas.contains_key(&idea.idea_id) {
            return Err(MinipadError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::Idea,
                reason: "already exists".to_string(),
            }));
        }

        let id = idea.idea_id;
        tables
            .ideas_by_author
            .entry(idea.author.clone())
            .or_default()
            .insert(id);
        tables.index_status(id, None, idea.status);
        if let Some(original) = idea.original_idea_id {
            tables.remixes_by_original.entry(original).or_default().insert(id);
        }
        tables.ideas.insert(id, idea.clone());
        Ok(())
    }

    fn idea_get(&self, id: IdeaId) -> MinipadResult<Option<Idea>> {
        Ok(self.read()?.ideas.get(&id).cloned())
    }

    fn idea_list(&self, limit: usize) -> MinipadResult<Vec<Idea>> {
        let tables = self.read()?;
        let mut ideas: Vec<Idea> = tables.ideas.values().cloned().collect();
        newest_first(&mut ideas);
        ideas.truncate(limit);
        Ok(ideas)
    }

    fn idea_update(&self, id: IdeaId, update: IdeaUpdate) -> MinipadResult<Idea> {
        let mut tables = self.write()?;
        let idea = tables
            .ideas
            .get_mut(&id)
            .ok_or_else(|| MinipadError::not_found(EntityType::Idea, id))?;

        let previous_status = idea.status;
        update.apply_to(idea);
        let updated = idea.clone();

        if updated.status != previous_status {
            tables.index_status(id, Some(previous_status), updated.status);
        }
        Ok(updated)
    }

    fn idea_delete(&self, id: IdeaId) -> MinipadResult<()> {
        let mut tables = self.write()?;
        let idea = tables
            .ideas
            .remove(&id)
            .ok_or_else(|| MinipadError::not_found(EntityType::Idea, id))?;

        remove_indexed(&mut tables.ideas_by_author, &idea.author, &id);
        remove_indexed(&mut tables.ideas_by_status, &idea.status, &id);
        if let Some(original) = idea.original_idea_id {
            remove_indexed(&mut tables.remixes_by_original, &original, &id);
        }
        Ok(())
    }

    fn idea_list_by_author(&self, author: &str) -> MinipadResult<Vec<Idea>> {
        let tables = self.read()?;
        let mut ideas = match tables.ideas_by_author.get(author) {
            Some(ids) => tables.collect_ideas(ids),
            None => Vec::new(),
        };
        newest_first(&mut ideas);
        Ok(ideas)
    }

    fn idea_list_by_status(&self, status: IdeaStatus) -> MinipadResult<Vec<Idea>> {
        let tables = self.read()?;
        let mut ideas = match tables.ideas_by_status.get(&status) {
            Some(ids) => tables.collect_ideas(ids),
            None => Vec::new(),
        };
        newest_first(&mut ideas);
        Ok(ideas)
    }

    fn idea_list_by_original(&self, original: IdeaId) -> MinipadResult<Vec<Idea>> {
        let tables = self.read()?;
        let mut remixes = match tables.remixes_by_original.get(&original) {
            Some(ids) => tables.collect_ideas(ids),
            None => Vec::new(),
        };
        remixes.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.idea_id.cmp(&b.idea_id))
        });
        Ok(remixes)
    }

    fn idea_list_most_upvoted(&self, limit: usize) -> MinipadResult<Vec<Idea>> {
        let tables = self.read()?;
        let mut ideas: Vec<Idea> = tables.ideas.values().cloned().collect();
        ideas.sort_by(|a, b| {
            b.upvotes
                .cmp(&a.upvotes)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
                .then_with(|| b.idea_id.cmp(&a.idea_id))
        });
        ideas.truncate(limit);
        Ok(ideas)
    }

    // === Upvote Operations ===

    fn upvote_insert_if_absent(&self, upvote: &Upvote) -> MinipadResult<bool> {
        let mut tables = self.write()?;
        let key = (upvote.idea_id, upvote.voter.clone());
        if tables.upvote_by_pair.contains_key(&key) {
            return Ok(false);
        }
        if tables.upvotes.contains_key(&upvote.upvote_id) {
            return Err(MinipadError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::Upvote,
                reason: "already exists".to_string(),
            }));
        }

        let idea = tables
            .ideas
            .get_mut(&upvote.idea_id)
            .ok_or_else(|| MinipadError::not_found(EntityType::Idea, upvote.idea_id))?;
        idea.upvotes = idea.upvotes.saturating_add(1);

        tables.upvote_by_pair.insert(key, upvote.upvote_id);
        tables.upvotes.insert(upvote.upvote_id, upvote.clone());
        Ok(true)
    }

    fn upvote_remove(&self, idea_id: IdeaId, voter: &str) -> MinipadResult<bool> {
        let mut tables = self.write()?;
        let Some(upvote_id) = tables.upvote_by_pair.remove(&(idea_id, voter.to_string())) else {
            return Ok(false);
        };
        tables.upvotes.remove(&upvote_id);
        if let Some(idea) = tables.ideas.get_mut(&idea_id) {
            idea.upvotes = idea.upvotes.saturating_sub(1);
        }
        Ok(true)
    }

    fn upvote_find(&self, idea_id: IdeaId, voter: &str) -> MinipadResult<Option<Upvote>> {
        let tables = self.read()?;
        Ok(tables
            .upvote_by_pair
            .get(&(idea_id, voter.to_string()))
            .and_then(|id| tables.upvotes.get(id))
            .cloned())
    }

    fn upvote_list_by_idea(&self, idea_id: IdeaId) -> MinipadResult<Vec<Upvote>> {
        let tables = self.read()?;
        let mut upvotes: Vec<Upvote> = tables
            .upvotes
            .values()
            .filter(|u| u.idea_id == idea_id)
            .cloned()
            .collect();
        upvotes.sort_by_key(|u| (u.timestamp, u.upvote_id));
        Ok(upvotes)
    }

    fn upvote_list_by_voter(&self, voter: &str) -> MinipadResult<Vec<Upvote>> {
        let tables = self.read()?;
        let mut upvotes: Vec<Upvote> = tables
            .upvotes
            .values()
            .filter(|u| u.voter == voter)
            .cloned()
            .collect();
        upvotes.sort_by_key(|u| (u.timestamp, u.upvote_id));
        Ok(upvotes)
    }

    fn upvote_delete_by_idea(&self, idea_id: IdeaId) -> MinipadResult<usize> {
        let mut tables = self.write()?;
        let doomed: Vec<UpvoteId> = tables
            .upvotes
            .values()
            .filter(|u| u.idea_id == idea_id)
            .map(|u| u.upvote_id)
            .collect();

        for upvote_id in &doomed {
            if let Some(upvote) = tables.upvotes.remove(upvote_id) {
                tables.upvote_by_pair.remove(&(upvote.idea_id, upvote.voter));
            }
        }
        if let Some(idea) = tables.ideas.get_mut(&idea_id) {
            idea.upvotes = 0;
        }
        Ok(doomed.len())
    }

    // === Claim Operations ===

    fn claim_insert(&self, claim: &Claim) -> MinipadResult<()> {
        let mut tables = self.write()?;
        if tables.claims.contains_key(&claim.claim_id) {
            return Err(MinipadError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::Claim,
                reason: "already exists".to_string(),
            }));
        }
        tables
            .claims_by_idea
            .entry(claim.idea_id)
            .or_default()
            .insert(claim.claim_id);
        tables.claims.insert(claim.claim_id, claim.clone());
        Ok(())
    }

    fn claim_get(&self, id: ClaimId) -> MinipadResult<Option<Claim>> {
        Ok(self.read()?.claims.get(&id).cloned())
    }

    fn claim_find_active(&self, idea_id: IdeaId, claimer: &str) -> MinipadResult<Option<Claim>> {
        let tables = self.read()?;
        let Some(ids) = tables.claims_by_idea.get(&idea_id) else {
            return Ok(None);
        };
        Ok(ids
            .iter()
            .rev()
            .filter_map(|id| tables.claims.get(id))
            .find(|c| c.claimer == claimer && c.status == ClaimStatus::Claimed)
            .cloned())
    }

    fn claim_update(&self, id: ClaimId, update: ClaimUpdate) -> MinipadResult<Claim> {
        let mut tables = self.write()?;
        let claim = tables
            .claims
            .get_mut(&id)
            .ok_or_else(|| MinipadError::not_found(EntityType::Claim, id))?;
        update.apply_to(claim);
        Ok(claim.clone())
    }

    fn claim_delete(&self, id: ClaimId) -> MinipadResult<()> {
        let mut tables = self.write()?;
        let claim = tables
            .claims
            .remove(&id)
            .ok_or_else(|| MinipadError::not_found(EntityType::Claim, id))?;
        remove_indexed(&mut tables.claims_by_idea, &claim.idea_id, &id);
        Ok(())
    }

    fn claim_list_by_idea(&self, idea_id: IdeaId) -> MinipadResult<Vec<Claim>> {
        let tables = self.read()?;
        let mut claims: Vec<Claim> = match tables.claims_by_idea.get(&idea_id) {
            Some(ids) => ids.iter().filter_map(|id| tables.claims.get(id)).cloned().collect(),
            None => Vec::new(),
        };
        claims.sort_by_key(|c| (c.timestamp, c.claim_id));
        Ok(claims)
    }

    fn claim_list_by_claimer(&self, claimer: &str) -> MinipadResult<Vec<Claim>> {
        let tables = self.read()?;
        let mut claims: Vec<Claim> = tables
            .claims
            .values()
            .filter(|c| c.claimer == claimer)
            .cloned()
            .collect();
        claims.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.claim_id.cmp(&a.claim_id))
        });
        Ok(claims)
    }

    fn claim_delete_by_idea(&self, idea_id: IdeaId) -> MinipadResult<usize> {
        let mut tables = self.write()?;
        let Some(ids) = tables.claims_by_idea.remove(&idea_id) else {
            return Ok(0);
        };
        for id in &ids {
            tables.claims.remove(id);
        }
        Ok(ids.len())
    }
}

// ============================================================================
// TESTS
// ============================================================================
