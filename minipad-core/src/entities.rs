//! Core entity structures

use crate::{
    ClaimId, ClaimStatus, EntityIdType, Fid, IdeaId, IdeaStatus, Timestamp, UpvoteId,
    WalletAddress,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// CALLER CONTEXT
// ============================================================================

/// The user performing an operation.
///
/// Passed explicitly into every mutation instead of being read from ambient
/// connection state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Actor {
    pub address: WalletAddress,
    pub fid: Option<Fid>,
}

impl Actor {
    pub fn new(address: impl Into<WalletAddress>) -> Self {
        Self {
            address: address.into(),
            fid: None,
        }
    }

    pub fn with_fid(mut self, fid: Fid) -> Self {
        self.fid = Some(fid);
        self
    }
}

// ============================================================================
// PROFILES
// ============================================================================

/// Profile data resolved from the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Profile {
    pub fid: Fid,
    pub display_name: Option<String>,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub follower_count: u64,
    pub following_count: u64,
}

/// Author metadata denormalized onto an idea at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuthorProfile {
    pub fid: Option<Fid>,
    pub avatar: Option<String>,
    pub display_name: Option<String>,
    pub username: Option<String>,
}

impl AuthorProfile {
    /// True when none of the display fields are present.
    pub fn lacks_display_fields(&self) -> bool {
        self.avatar.is_none() && self.display_name.is_none() && self.username.is_none()
    }

    /// Fill missing display fields from a resolved profile.
    pub fn merge_from(&mut self, profile: &Profile) {
        self.fid = self.fid.or(Some(profile.fid));
        if self.avatar.is_none() {
            self.avatar = profile.avatar_url.clone();
        }
        if self.display_name.is_none() {
            self.display_name = profile.display_name.clone();
        }
        if self.username.is_none() {
            self.username = profile.username.clone();
        }
    }
}

// ============================================================================
// IDEA
// ============================================================================

/// Author-supplied fields for a new idea or remix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaDraft {
    pub title: String,
    pub description: String,
    pub author: WalletAddress,
    pub profile: AuthorProfile,
    pub attestation_uid: Option<String>,
}

/// Idea - a submitted miniapp concept. Remixes are ideas with `is_remix` set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Idea {
    pub idea_id: IdeaId,
    pub title: String,
    pub description: String,
    pub author: WalletAddress,
    pub author_fid: Option<Fid>,
    pub author_avatar: Option<String>,
    pub author_display_name: Option<String>,
    pub author_username: Option<String>,
    pub attestation_uid: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub timestamp: Timestamp,
    pub upvotes: u64,
    pub status: IdeaStatus,
    pub claimed_by: Option<WalletAddress>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = DateTime))]
    pub claimed_at: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = DateTime))]
    pub completed_at: Option<Timestamp>,
    pub github_url: Option<String>,
    pub deployment_url: Option<String>,
    pub completion_attestation_uid: Option<String>,
    pub is_remix: bool,
    pub original_idea_id: Option<IdeaId>,
    pub remix_attestation_uid: Option<String>,
}

impl Idea {
    /// Build a fresh open idea from a draft.
    pub fn from_draft(draft: IdeaDraft, now: Timestamp) -> Self {
        Self {
            idea_id: IdeaId::now_v7(),
            title: draft.title,
            description: draft.description,
            author: draft.author,
            author_fid: draft.profile.fid,
            author_avatar: draft.profile.avatar,
            author_display_name: draft.profile.display_name,
            author_username: draft.profile.username,
            attestation_uid: draft.attestation_uid,
            timestamp: now,
            upvotes: 0,
            status: IdeaStatus::Open,
            claimed_by: None,
            claimed_at: None,
            completed_at: None,
            github_url: None,
            deployment_url: None,
            completion_attestation_uid: None,
            is_remix: false,
            original_idea_id: None,
            remix_attestation_uid: None,
        }
    }

    /// Build a remix of `original`. Nothing is inherited from the original
    /// besides the back-reference.
    pub fn remix_of(original: IdeaId, draft: IdeaDraft, now: Timestamp) -> Self {
        let remix_attestation_uid = draft.attestation_uid.clone();
        Self {
            is_remix: true,
            original_idea_id: Some(original),
            remix_attestation_uid,
            ..Self::from_draft(draft, now)
        }
    }

    /// Whether `address` currently holds the claim.
    pub fn is_claimed_by(&self, address: &str) -> bool {
        self.claimed_by.as_deref() == Some(address)
    }

    /// Time used to order completed work, falling back to creation time.
    pub fn completion_sort_key(&self) -> Timestamp {
        self.completed_at.unwrap_or(self.timestamp)
    }
}

/// Partial update for an idea. `upvotes` is absent on purpose: the counter
/// only moves through the upvote ledger primitives.
///
/// For the doubly-optional fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdeaUpdate {
    pub attestation_uid: Option<String>,
    pub status: Option<IdeaStatus>,
    pub claimed_by: Option<Option<WalletAddress>>,
    pub claimed_at: Option<Option<Timestamp>>,
    pub completed_at: Option<Timestamp>,
    pub github_url: Option<String>,
    pub deployment_url: Option<String>,
    pub completion_attestation_uid: Option<String>,
    pub remix_attestation_uid: Option<String>,
}

impl IdeaUpdate {
    pub fn is_empty(&self) -> bool {
        *self == IdeaUpdate::default()
    }

    /// Apply the set fields to `idea`.
    pub fn apply_to(&self, idea: &mut Idea) {
        if let Some(uid) = &self.attestation_uid {
            idea.attestation_uid = Some(uid.clone());
        }
        if let Some(status) = self.status {
            idea.status = status;
        }
        if let Some(claimed_by) = &self.claimed_by {
            idea.claimed_by = claimed_by.clone();
        }
        if let Some(claimed_at) = self.claimed_at {
            idea.claimed_at = claimed_at;
        }
        if let Some(completed_at) = self.completed_at {
            idea.completed_at = Some(completed_at);
        }
        if let Some(url) = &self.github_url {
            idea.github_url = Some(url.clone());
        }
        if let Some(url) = &self.deployment_url {
            idea.deployment_url = Some(url.clone());
        }
        if let Some(uid) = &self.completion_attestation_uid {
            idea.completion_attestation_uid = Some(uid.clone());
        }
        if let Some(uid) = &self.remix_attestation_uid {
            idea.remix_attestation_uid = Some(uid.clone());
        }
    }
}

// ============================================================================
// CLAIM
// ============================================================================

/// Claim - a builder's commitment to an idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Claim {
    pub claim_id: ClaimId,
    pub idea_id: IdeaId,
    pub claimer: WalletAddress,
    pub claimer_fid: Option<Fid>,
    pub attestation_uid: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub timestamp: Timestamp,
    pub status: ClaimStatus,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = DateTime))]
    pub completed_at: Option<Timestamp>,
    pub miniapp_url: Option<String>,
    pub completion_attestation_uid: Option<String>,
}

impl Claim {
    pub fn new(idea_id: IdeaId, claimer: &Actor, attestation_uid: Option<String>, now: Timestamp) -> Self {
        Self {
            claim_id: ClaimId::now_v7(),
            idea_id,
            claimer: claimer.address.clone(),
            claimer_fid: claimer.fid,
            attestation_uid,
            timestamp: now,
            status: ClaimStatus::Claimed,
            completed_at: None,
            miniapp_url: None,
            completion_attestation_uid: None,
        }
    }
}

/// Partial update for a claim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimUpdate {
    pub status: Option<ClaimStatus>,
    pub attestation_uid: Option<String>,
    pub completed_at: Option<Timestamp>,
    pub miniapp_url: Option<String>,
    pub completion_attestation_uid: Option<String>,
}

impl ClaimUpdate {
    pub fn apply_to(&self, claim: &mut Claim) {
        if let Some(status) = self.status {
            claim.status = status;
        }
        if let Some(uid) = &self.attestation_uid {
            claim.attestation_uid = Some(uid.clone());
        }
        if let Some(completed_at) = self.completed_at {
            claim.completed_at = Some(completed_at);
        }
        if let Some(url) = &self.miniapp_url {
            claim.miniapp_url = Some(url.clone());
        }
        if let Some(uid) = &self.completion_attestation_uid {
            claim.completion_attestation_uid = Some(uid.clone());
        }
    }
}

// ============================================================================
// UPVOTE
// ============================================================================

/// Upvote - a user's endorsement of an idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Upvote {
    pub upvote_id: UpvoteId,
    pub idea_id: IdeaId,
    pub voter: WalletAddress,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub timestamp: Timestamp,
}

impl Upvote {
    pub fn new(idea_id: IdeaId, voter: impl Into<WalletAddress>, now: Timestamp) -> Self {
        Self {
            upvote_id: UpvoteId::now_v7(),
            idea_id,
            voter: voter.into(),
            timestamp: now,
        }
    }
}
