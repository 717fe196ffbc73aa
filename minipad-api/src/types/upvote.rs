//! Upvote-related API types

use minipad_core::IdeaId;
use serde::{Deserialize, Serialize};

/// State of the ledger for one (idea, voter) pair after an upvote call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpvoteResponse {
    pub idea_id: IdeaId,
    pub upvotes: u64,
    pub has_upvoted: bool,
    /// False when the call was a no-op
    pub changed: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct UpvoteStatusQuery {
    /// Wallet to check; omitted means only the count is reported
    pub voter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpvoteStatusResponse {
    pub idea_id: IdeaId,
    pub upvotes: u64,
    pub has_upvoted: bool,
}
