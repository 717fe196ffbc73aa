//! Minipad Core - Entity Types and Lifecycle Rules
//!
//! Data structures for ideas, claims and upvotes, the error taxonomy, and the
//! pure rules that decide which idea transitions are legal. All other crates
//! depend on this. Nothing in here performs I/O.

pub mod attestation;
pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod providers;
pub mod validation;

pub use attestation::{AttestationPayload, AttestationReceipt, SchemaKind};
pub use entities::{
    Actor, AuthorProfile, Claim, ClaimUpdate, Idea, IdeaDraft, IdeaUpdate, Profile, Upvote,
};
pub use enums::{ClaimStatus, EntityType, IdeaAction, IdeaStatus, IdeaStatusParseError};
pub use error::{
    ConfigError, ErrorKind, ExternalServiceError, LifecycleError, MinipadError, MinipadResult,
    StorageError, ValidationError,
};
pub use identity::{ClaimId, EntityIdType, Fid, IdeaId, Timestamp, UpvoteId, WalletAddress};
pub use lifecycle::{ClaimPlan, CompletionDetails, CompletionPlan};
pub use providers::{AttestationGateway, ProfileResolver};
