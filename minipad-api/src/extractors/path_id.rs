//! Path extractor for type-safe entity IDs.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use minipad_core::EntityIdType;
use uuid::Uuid;

use crate::error::ApiError;

/// Extracts a single UUID path parameter into an entity id newtype.
///
/// ```rust,ignore
/// async fn get_idea(PathId(idea_id): PathId<IdeaId>) -> ApiResult<Json<IdeaResponse>> {
///     // idea_id is IdeaId, not Uuid
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PathId<T: EntityIdType>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathId<T>
where
    S: Send + Sync,
    T: EntityIdType,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(uuid): Path<Uuid> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                ApiError::invalid_format(
                    &format!("{} id", T::ENTITY_NAME.to_lowercase()),
                    "UUID",
                )
                .with_details(serde_json::json!({
                    "path": parts.uri.path(),
                    "reason": e.body_text(),
                }))
            })?;

        Ok(PathId(T::new(uuid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use axum::{body::Body, http::Request, routing::get, Router};
    use minipad_core::IdeaId;
    use tower::ServiceExt;

    async fn echo(PathId(idea_id): PathId<IdeaId>) -> String {
        idea_id.to_string()
    }

    #[tokio::test]
    async fn test_valid_uuid_extracts() {
        let app = Router::new().route("/ideas/:id", get(echo));
        let id = IdeaId::now_v7();
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/ideas/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_invalid_uuid_rejected_as_bad_request() {
        let app = Router::new().route("/ideas/:id", get(echo));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/ideas/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), ErrorCode::InvalidFormat.status_code());
    }
}
