//! Error Types for Minipad API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use minipad_core::{EntityType, LifecycleError, MinipadError, StorageError, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code and represents
/// a category of error that can occur during API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Identity Errors (401, 403)
    // ========================================================================
    /// No wallet address accompanied a mutation
    NotConnected,

    /// Caller is not the author or claimer the action requires
    Forbidden,

    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Request contains invalid input data
    InvalidInput,

    /// Field format is incorrect
    InvalidFormat,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested entity does not exist
    EntityNotFound,

    /// Requested idea or remix does not exist
    IdeaNotFound,

    /// Requested claim does not exist
    ClaimNotFound,

    /// Identity provider has no profile for the fid
    ProfileNotFound,

    // ========================================================================
    // Conflict Errors (409)
    // ========================================================================
    /// Entity with the same identifier already exists
    EntityAlreadyExists,

    /// Operation conflicts with the idea's current status
    StateConflict,

    // ========================================================================
    // Server Errors (500, 502)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Attestation service or identity provider failed
    UpstreamFailure,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::NotConnected => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,

            ErrorCode::ValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,

            ErrorCode::EntityNotFound
            | ErrorCode::IdeaNotFound
            | ErrorCode::ClaimNotFound
            | ErrorCode::ProfileNotFound => StatusCode::NOT_FOUND,

            ErrorCode::EntityAlreadyExists | ErrorCode::StateConflict => StatusCode::CONFLICT,

            ErrorCode::UpstreamFailure => StatusCode::BAD_GATEWAY,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::NotConnected => "Please connect your wallet first",
            ErrorCode::Forbidden => "Access forbidden",

            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::InvalidFormat => "Invalid format",

            ErrorCode::EntityNotFound => "Entity not found",
            ErrorCode::IdeaNotFound => "Idea not found",
            ErrorCode::ClaimNotFound => "Claim not found",
            ErrorCode::ProfileNotFound => "Profile not found",

            ErrorCode::EntityAlreadyExists => "Entity already exists",
            ErrorCode::StateConflict => "Operation conflicts with current state",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::UpstreamFailure => "An external service is unavailable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (rule that fired, offending field, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn not_connected() -> Self {
        Self::from_code(ErrorCode::NotConnected)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn invalid_format(field: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("Field '{}' has invalid format, expected {}", field, expected),
        )
    }

    pub fn idea_not_found(idea_id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::IdeaNotFound, "Idea not found")
            .with_details(serde_json::json!({ "idea_id": idea_id.to_string() }))
    }

    pub fn profile_not_found(fid: u64) -> Self {
        Self::new(ErrorCode::ProfileNotFound, format!("No profile for fid {}", fid))
    }

    pub fn state_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StateConflict, message)
    }

    pub fn upstream_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamFailure, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

/// Map domain errors onto API codes. The message is the short user-facing
/// text; the underlying rule goes into `details`.
impl From<MinipadError> for ApiError {
    fn from(err: MinipadError) -> Self {
        let message = err.user_message();
        match &err {
            MinipadError::Storage(StorageError::NotFound { entity_type, id }) => {
                let code = match entity_type {
                    EntityType::Idea => ErrorCode::IdeaNotFound,
                    EntityType::Claim => ErrorCode::ClaimNotFound,
                    EntityType::Profile => ErrorCode::ProfileNotFound,
                    EntityType::Upvote => ErrorCode::EntityNotFound,
                };
                ApiError::new(code, message).with_details(serde_json::json!({ "id": id }))
            }
            MinipadError::Storage(StorageError::InsertFailed { entity_type, reason }) => {
                ApiError::new(
                    ErrorCode::EntityAlreadyExists,
                    format!("{:?} {}", entity_type, reason),
                )
            }
            MinipadError::Storage(StorageError::LockPoisoned) | MinipadError::Config(_) => {
                tracing::error!(error = %err, "Internal failure");
                ApiError::internal_error(message)
            }
            MinipadError::Lifecycle(LifecycleError::InvalidTransition {
                idea_id,
                status,
                action,
                reason,
            }) => ApiError::state_conflict(message).with_details(serde_json::json!({
                "idea_id": idea_id,
                "status": status,
                "action": action,
                "reason": reason,
            })),
            MinipadError::Lifecycle(LifecycleError::NotOwner {
                idea_id,
                action,
                reason,
                ..
            }) => ApiError::forbidden(message).with_details(serde_json::json!({
                "idea_id": idea_id,
                "action": action,
                "reason": reason,
            })),
            MinipadError::Validation(validation) => {
                let field = match validation {
                    ValidationError::RequiredFieldMissing { field }
                    | ValidationError::InvalidValue { field, .. }
                    | ValidationError::TooLong { field, .. } => field.clone(),
                };
                ApiError::validation_failed(message)
                    .with_details(serde_json::json!({ "field": field }))
            }
            MinipadError::External(external) => {
                tracing::warn!(error = %external, "Upstream failure surfaced to caller");
                ApiError::upstream_failure(message)
            }
        }
    }
}

/// Convert from serde_json::Error to ApiError.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

/// Convert from uuid::Error to ApiError.
impl From<uuid::Error> for ApiError {
    fn from(err: uuid::Error) -> Self {
        ApiError::invalid_format("id", &format!("valid UUID: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use minipad_core::{EntityIdType, ExternalServiceError, IdeaAction, IdeaId, IdeaStatus, SchemaKind};

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::NotConnected.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::ValidationFailed.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::IdeaNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::StateConflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::UpstreamFailure.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(ErrorCode::InternalError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_malformed_input_codes() {
        let bad_id = ApiError::invalid_format("idea id", "UUID");
        assert_eq!(bad_id.code, ErrorCode::InvalidFormat);
        assert_eq!(bad_id.code.status_code(), StatusCode::BAD_REQUEST);

        let bad_log_format = ApiError::invalid_input("Unknown log format");
        assert_eq!(bad_log_format.code, ErrorCode::InvalidInput);
        assert_eq!(bad_log_format.code.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_domain_errors_map_to_distinct_codes() {
        let not_found: ApiError = MinipadError::not_found(EntityType::Idea, IdeaId::nil()).into();
        assert_eq!(not_found.code, ErrorCode::IdeaNotFound);
        assert_eq!(not_found.message, "Idea not found");

        let conflict: ApiError = MinipadError::from(LifecycleError::InvalidTransition {
            idea_id: IdeaId::nil(),
            status: IdeaStatus::Claimed,
            action: IdeaAction::Claim,
            reason: "Idea is not available for claiming".to_string(),
        })
        .into();
        assert_eq!(conflict.code, ErrorCode::StateConflict);
        assert_eq!(conflict.message, "This idea has already been claimed");
        let details = conflict.details.unwrap();
        assert_eq!(details["reason"], "Idea is not available for claiming");
        assert_eq!(details["status"], "claimed");

        let forbidden: ApiError = MinipadError::from(LifecycleError::NotOwner {
            idea_id: IdeaId::nil(),
            action: IdeaAction::Unclaim,
            requester: "0xd".to_string(),
            reason: "Idea is not claimed by this user".to_string(),
        })
        .into();
        assert_eq!(forbidden.code, ErrorCode::Forbidden);
        assert_eq!(forbidden.message, "You can only unclaim ideas you have claimed");

        let invalid: ApiError = MinipadError::from(ValidationError::RequiredFieldMissing {
            field: "title".to_string(),
        })
        .into();
        assert_eq!(invalid.code, ErrorCode::ValidationFailed);

        let upstream: ApiError = MinipadError::from(ExternalServiceError::SchemaNotConfigured {
            kind: SchemaKind::Idea,
        })
        .into();
        assert_eq!(upstream.code, ErrorCode::UpstreamFailure);
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::not_connected();
        let json = serde_json::to_string(&err)?;

        assert!(json.contains("NOT_CONNECTED"));
        assert!(json.contains("connect your wallet"));

        let deserialized: ApiError = serde_json::from_str(&json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::upstream_failure("identity provider down");
        let display = format!("{}", err);

        assert!(display.contains("UpstreamFailure"));
        assert!(display.contains("identity provider down"));
    }
}
