//! Idea-related API types

use crate::config::ApiConfig;
use minipad_core::{Actor, AuthorProfile, Fid, Idea, IdeaId, IdeaStatus};
use serde::{Deserialize, Serialize};

/// Request to submit an idea or a remix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubmitIdeaRequest {
    pub title: String,
    pub description: String,
    /// Farcaster id of the author; falls back to the `X-Farcaster-Fid` header
    #[serde(default)]
    pub author_fid: Option<Fid>,
    #[serde(default)]
    pub author_avatar: Option<String>,
    #[serde(default)]
    pub author_display_name: Option<String>,
    #[serde(default)]
    pub author_username: Option<String>,
    /// Attestation the client already obtained
    #[serde(default)]
    pub attestation_uid: Option<String>,
}

impl SubmitIdeaRequest {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Profile fields as supplied, with the caller's fid as fallback.
    pub fn author_profile(&self, actor: &Actor) -> AuthorProfile {
        AuthorProfile {
            fid: self.author_fid.or(actor.fid),
            avatar: self.author_avatar.clone(),
            display_name: self.author_display_name.clone(),
            username: self.author_username.clone(),
        }
    }
}

/// Request to record an attestation obtained after submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateAttestationRequest {
    pub attestation_uid: String,
}

/// Board ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum IdeaSort {
    #[default]
    Newest,
    /// Most upvoted first, newest breaking ties
    Popular,
}

/// Query parameters for the board listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct ListIdeasQuery {
    /// Maximum number of ideas (default 20, capped at 100)
    pub limit: Option<usize>,
    /// Include remixes in the listing (default false)
    pub include_remixes: Option<bool>,
    pub status: Option<IdeaStatus>,
    pub sort: Option<IdeaSort>,
}

impl ListIdeasQuery {
    /// Resolve defaults and clamp the limit.
    pub fn to_filter(&self, config: &ApiConfig) -> IdeaFilter {
        IdeaFilter {
            limit: config.effective_limit(self.limit),
            include_remixes: self.include_remixes.unwrap_or(false),
            status: self.status,
            sort: self.sort.unwrap_or_default(),
        }
    }
}

/// Fully resolved board query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdeaFilter {
    pub limit: usize,
    pub include_remixes: bool,
    pub status: Option<IdeaStatus>,
    pub sort: IdeaSort,
}

impl IdeaFilter {
    /// Newest first, everything included.
    pub fn newest(limit: usize) -> Self {
        Self {
            limit,
            include_remixes: true,
            status: None,
            sort: IdeaSort::Newest,
        }
    }

    /// Top-level board view: remixes hidden.
    pub fn board(limit: usize) -> Self {
        Self {
            include_remixes: false,
            ..Self::newest(limit)
        }
    }

    pub fn matches(&self, idea: &Idea) -> bool {
        (self.include_remixes || !idea.is_remix)
            && self.status.map_or(true, |status| idea.status == status)
    }
}

/// Idea with its display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct IdeaResponse {
    #[serde(flatten)]
    pub idea: Idea,
    /// "Open", "In Progress" or "Completed"
    pub status_label: String,
}

impl From<Idea> for IdeaResponse {
    fn from(idea: Idea) -> Self {
        let status_label = idea.status.label().to_string();
        Self { idea, status_label }
    }
}

/// Response containing a list of ideas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListIdeasResponse {
    pub ideas: Vec<IdeaResponse>,
    /// Number of ideas returned
    pub total: usize,
}

impl From<Vec<Idea>> for ListIdeasResponse {
    fn from(ideas: Vec<Idea>) -> Self {
        let ideas: Vec<IdeaResponse> = ideas.into_iter().map(IdeaResponse::from).collect();
        let total = ideas.len();
        Self { ideas, total }
    }
}

/// Outcome of deleting an idea or remix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeleteIdeaResponse {
    pub idea_id: IdeaId,
    pub upvotes_removed: usize,
    pub claims_removed: usize,
}
