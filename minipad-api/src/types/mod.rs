//! API Request and Response Types
//!
//! Request DTOs are deserialized at the route edge and handed to the
//! services unchanged; responses wrap the core entities.

// Idea and board types
mod idea;
pub use idea::*;

// Claim lifecycle types
mod claim;
pub use claim::*;

// Upvote types
mod upvote;
pub use upvote::*;
