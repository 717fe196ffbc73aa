//! Error types for Minipad operations

use crate::{EntityType, IdeaAction, IdeaId, IdeaStatus, SchemaKind};
use thiserror::Error;
use uuid::Uuid;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity_type:?} with id {id}")]
    NotFound { entity_type: EntityType, id: Uuid },

    #[error("Insert failed for {entity_type:?}: {reason}")]
    InsertFailed { entity_type: EntityType, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Lifecycle rule violations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// The idea's status does not allow the action.
    #[error("{reason}")]
    InvalidTransition {
        idea_id: IdeaId,
        status: IdeaStatus,
        action: IdeaAction,
        reason: String,
    },

    /// The requester is not the author or claimer required by the action.
    #[error("{reason}")]
    NotOwner {
        idea_id: IdeaId,
        action: IdeaAction,
        requester: String,
        reason: String,
    },
}

/// Validation errors for user input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Field {field} exceeds {max} characters")]
    TooLong { field: String, max: usize },
}

/// Failures of external collaborators (attestation service, identity provider).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExternalServiceError {
    #[error("Attestation schema not configured: {kind}")]
    SchemaNotConfigured { kind: SchemaKind },

    #[error("Request to {service} failed: {reason}")]
    RequestFailed { service: String, reason: String },

    #[error("Request to {service} timed out")]
    Timeout { service: String },

    #[error("Invalid response from {service}: {reason}")]
    InvalidResponse { service: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all Minipad errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MinipadError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("External service error: {0}")]
    External(#[from] ExternalServiceError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Coarse error kinds the presentation layer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidTransition,
    NotOwner,
    Validation,
    ExternalServiceFailure,
    Internal,
}

impl MinipadError {
    /// Shorthand for a missing entity.
    pub fn not_found(entity_type: EntityType, id: impl Into<Uuid>) -> Self {
        MinipadError::Storage(StorageError::NotFound {
            entity_type,
            id: id.into(),
        })
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MinipadError::Storage(StorageError::NotFound { .. }) => ErrorKind::NotFound,
            MinipadError::Storage(_) | MinipadError::Config(_) => ErrorKind::Internal,
            MinipadError::Lifecycle(LifecycleError::InvalidTransition { .. }) => {
                ErrorKind::InvalidTransition
            }
            MinipadError::Lifecycle(LifecycleError::NotOwner { .. }) => ErrorKind::NotOwner,
            MinipadError::Validation(_) => ErrorKind::Validation,
            MinipadError::External(_) => ErrorKind::ExternalServiceFailure,
        }
    }

    /// Short message suitable for showing to the end user.
    pub fn user_message(&self) -> String {
        match self {
            MinipadError::Storage(StorageError::NotFound { entity_type, .. }) => {
                format!("{:?} not found", entity_type)
            }
            MinipadError::Lifecycle(LifecycleError::InvalidTransition { action, reason, .. }) => {
                match action {
                    IdeaAction::Claim => "This idea has already been claimed".to_string(),
                    _ => reason.clone(),
                }
            }
            MinipadError::Lifecycle(LifecycleError::NotOwner { action, reason, .. }) => {
                match action {
                    IdeaAction::Unclaim => {
                        "You can only unclaim ideas you have claimed".to_string()
                    }
                    IdeaAction::Delete => "You can only delete your own ideas".to_string(),
                    IdeaAction::DeleteRemix => "You can only delete your own remixes".to_string(),
                    _ => reason.clone(),
                }
            }
            MinipadError::Validation(err) => err.to_string(),
            MinipadError::External(ExternalServiceError::SchemaNotConfigured { .. }) => {
                "Attestations are not configured".to_string()
            }
            MinipadError::External(_) => {
                "An external service is unavailable. Please try again.".to_string()
            }
            MinipadError::Storage(_) | MinipadError::Config(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// Result type alias for Minipad operations.
pub type MinipadResult<T> = Result<T, MinipadError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntityIdType;

    #[test]
    fn test_storage_error_display_not_found() {
        let err = StorageError::NotFound {
            entity_type: EntityType::Idea,
            id: Uuid::nil(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Entity not found"));
        assert!(msg.contains("Idea"));
        assert!(msg.contains("00000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn test_kinds_are_distinguishable() {
        let not_found = MinipadError::not_found(EntityType::Idea, IdeaId::nil());
        assert_eq!(not_found.kind(), ErrorKind::NotFound);

        let transition = MinipadError::from(LifecycleError::InvalidTransition {
            idea_id: IdeaId::nil(),
            status: IdeaStatus::Claimed,
            action: IdeaAction::Claim,
            reason: "Idea is not available for claiming".to_string(),
        });
        assert_eq!(transition.kind(), ErrorKind::InvalidTransition);
        assert_eq!(transition.user_message(), "This idea has already been claimed");

        let owner = MinipadError::from(LifecycleError::NotOwner {
            idea_id: IdeaId::nil(),
            action: IdeaAction::Delete,
            requester: "0xabc".to_string(),
            reason: "Only the author can delete their idea".to_string(),
        });
        assert_eq!(owner.kind(), ErrorKind::NotOwner);
        assert_eq!(owner.user_message(), "You can only delete your own ideas");

        let external = MinipadError::from(ExternalServiceError::SchemaNotConfigured {
            kind: SchemaKind::Claim,
        });
        assert_eq!(external.kind(), ErrorKind::ExternalServiceFailure);

        let poisoned = MinipadError::from(StorageError::LockPoisoned);
        assert_eq!(poisoned.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_lifecycle_error_displays_reason() {
        let err = LifecycleError::NotOwner {
            idea_id: IdeaId::nil(),
            action: IdeaAction::Complete,
            requester: "0xdef".to_string(),
            reason: "Only the claimer can complete this idea".to_string(),
        };
        assert_eq!(err.to_string(), "Only the claimer can complete this idea");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::TooLong {
            field: "title".to_string(),
            max: 120,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("title"));
        assert!(msg.contains("120"));
    }
}
