//! Enum types for Minipad entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ENTITY TYPE
// ============================================================================

/// Entity type discriminator for errors and change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum EntityType {
    Idea,
    Claim,
    Upvote,
    Profile,
}

// ============================================================================
// IDEA STATUS
// ============================================================================

/// Lifecycle status of an idea.
///
/// ```text
/// open ──claim──▶ claimed ──complete──▶ completed (terminal)
///   ▲                │
///   └────unclaim─────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum IdeaStatus {
    /// Available for anyone to claim
    #[default]
    Open,
    /// A builder committed to it
    Claimed,
    /// Shipped; no further transitions
    Completed,
}

impl IdeaStatus {
    /// Convert to storage string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            IdeaStatus::Open => "open",
            IdeaStatus::Claimed => "claimed",
            IdeaStatus::Completed => "completed",
        }
    }

    /// Parse from storage string representation.
    pub fn from_db_str(s: &str) -> Result<Self, IdeaStatusParseError> {
        match s.to_lowercase().as_str() {
            "open" => Ok(IdeaStatus::Open),
            "claimed" | "in_progress" | "in-progress" => Ok(IdeaStatus::Claimed),
            "completed" | "complete" => Ok(IdeaStatus::Completed),
            _ => Err(IdeaStatusParseError(s.to_string())),
        }
    }

    /// Label shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            IdeaStatus::Open => "Open",
            IdeaStatus::Claimed => "In Progress",
            IdeaStatus::Completed => "Completed",
        }
    }

    /// Check if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, IdeaStatus::Completed)
    }

    /// Whether the lifecycle graph has an edge from `self` to `next`.
    pub fn can_transition_to(&self, next: IdeaStatus) -> bool {
        matches!(
            (self, next),
            (IdeaStatus::Open, IdeaStatus::Claimed)
                | (IdeaStatus::Claimed, IdeaStatus::Open)
                | (IdeaStatus::Claimed, IdeaStatus::Completed)
        )
    }
}

impl fmt::Display for IdeaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for IdeaStatus {
    type Err = IdeaStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid idea status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaStatusParseError(pub String);

impl fmt::Display for IdeaStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid idea status: {}", self.0)
    }
}

impl std::error::Error for IdeaStatusParseError {}

// ============================================================================
// CLAIM STATUS
// ============================================================================

/// Status of a claim record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    #[default]
    Claimed,
    Completed,
}

impl ClaimStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            ClaimStatus::Claimed => "claimed",
            ClaimStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

// ============================================================================
// IDEA ACTIONS
// ============================================================================

/// Guarded actions a user can attempt on an idea.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum IdeaAction {
    Claim,
    Unclaim,
    Complete,
    Delete,
    DeleteRemix,
    Remix,
}

impl IdeaAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdeaAction::Claim => "claim",
            IdeaAction::Unclaim => "unclaim",
            IdeaAction::Complete => "complete",
            IdeaAction::Delete => "delete",
            IdeaAction::DeleteRemix => "delete_remix",
            IdeaAction::Remix => "remix",
        }
    }
}

impl fmt::Display for IdeaAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
