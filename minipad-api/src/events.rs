//! Change Feed Event Types
//!
//! Every committed mutation is published as one of these events so that
//! board views can refresh without polling.

use minipad_core::{Claim, Idea, IdeaId, WalletAddress};
use serde::{Deserialize, Serialize};

/// Events broadcast over the WebSocket change feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MinipadEvent {
    // ========================================================================
    // IDEA EVENTS
    // ========================================================================
    /// A new idea was submitted.
    IdeaSubmitted {
        idea: Idea,
    },

    /// An idea changed outside the claim lifecycle (e.g. an attestation uid
    /// was recorded).
    IdeaUpdated {
        idea: Idea,
    },

    /// An idea was deleted together with its upvotes and claims.
    IdeaDeleted {
        idea_id: IdeaId,
    },

    // ========================================================================
    // CLAIM EVENTS
    // ========================================================================
    IdeaClaimed {
        idea: Idea,
        claim: Claim,
    },

    IdeaUnclaimed {
        idea: Idea,
        claimer: WalletAddress,
    },

    IdeaCompleted {
        idea: Idea,
        claim: Option<Claim>,
    },

    // ========================================================================
    // UPVOTE EVENTS
    // ========================================================================
    UpvoteAdded {
        idea_id: IdeaId,
        voter: WalletAddress,
        upvotes: u64,
    },

    UpvoteRemoved {
        idea_id: IdeaId,
        voter: WalletAddress,
        upvotes: u64,
    },

    // ========================================================================
    // REMIX EVENTS
    // ========================================================================
    RemixCreated {
        remix: Idea,
    },

    RemixDeleted {
        idea_id: IdeaId,
        original_idea_id: Option<IdeaId>,
    },

    // ========================================================================
    // CONNECTION EVENTS
    // ========================================================================
    /// Sent once when a subscriber connects.
    Connected {
        /// Idea the subscriber narrowed the feed to, if any
        idea_id: Option<IdeaId>,
    },

    Disconnected {
        reason: String,
    },

    Error {
        message: String,
    },
}

impl MinipadEvent {
    /// Get the event type name as a string.
    pub fn event_type(&self) -> &'static str {
        match self {
            MinipadEvent::IdeaSubmitted { .. } => "IdeaSubmitted",
            MinipadEvent::IdeaUpdated { .. } => "IdeaUpdated",
            MinipadEvent::IdeaDeleted { .. } => "IdeaDeleted",
            MinipadEvent::IdeaClaimed { .. } => "IdeaClaimed",
            MinipadEvent::IdeaUnclaimed { .. } => "IdeaUnclaimed",
            MinipadEvent::IdeaCompleted { .. } => "IdeaCompleted",
            MinipadEvent::UpvoteAdded { .. } => "UpvoteAdded",
            MinipadEvent::UpvoteRemoved { .. } => "UpvoteRemoved",
            MinipadEvent::RemixCreated { .. } => "RemixCreated",
            MinipadEvent::RemixDeleted { .. } => "RemixDeleted",
            MinipadEvent::Connected { .. } => "Connected",
            MinipadEvent::Disconnected { .. } => "Disconnected",
            MinipadEvent::Error { .. } => "Error",
        }
    }

    /// Whether this event reports a data change (as opposed to connection
    /// housekeeping).
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            MinipadEvent::Connected { .. }
                | MinipadEvent::Disconnected { .. }
                | MinipadEvent::Error { .. }
        )
    }

    /// Ideas this event touches. A remix event concerns both the remix and
    /// its original.
    pub fn concerns(&self, idea_id: IdeaId) -> bool {
        match self {
            MinipadEvent::IdeaSubmitted { idea }
            | MinipadEvent::IdeaUpdated { idea }
            | MinipadEvent::IdeaClaimed { idea, .. }
            | MinipadEvent::IdeaUnclaimed { idea, .. }
            | MinipadEvent::IdeaCompleted { idea, .. } => {
                idea.idea_id == idea_id || idea.original_idea_id == Some(idea_id)
            }
            MinipadEvent::RemixCreated { remix } => {
                remix.idea_id == idea_id || remix.original_idea_id == Some(idea_id)
            }
            MinipadEvent::RemixDeleted {
                idea_id: id,
                original_idea_id,
            } => *id == idea_id || *original_idea_id == Some(idea_id),
            MinipadEvent::IdeaDeleted { idea_id: id }
            | MinipadEvent::UpvoteAdded { idea_id: id, .. }
            | MinipadEvent::UpvoteRemoved { idea_id: id, .. } => *id == idea_id,
            MinipadEvent::Connected { .. }
            | MinipadEvent::Disconnected { .. }
            | MinipadEvent::Error { .. } => true,
        }
    }
}
