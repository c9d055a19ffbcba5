//! Request extractors.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Request, rejection::JsonRejection},
    http::{header::AUTHORIZATION, request::Parts},
};
use satya_common::AppError;
use satya_core::Identity;

use crate::middleware::AppState;

/// Caller holding a bearer token that the authorizer accepts.
///
/// Missing or invalid tokens are rejected with 401, valid tokens of
/// non-admins with 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Identity);

/// Extract the token from an `Authorization: Bearer <token>` header.
#[must_use]
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

        let authorization = state.authorizer.authorize(token).await?;
        if !authorization.authorized {
            tracing::info!(
                user_id = %authorization.identity.user_id,
                "Rejected non-admin caller"
            );
            return Err(AppError::Forbidden("admin only".to_string()));
        }

        Ok(Self(authorization.identity))
    }
}

/// JSON body extractor whose rejections use the API error envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|e| AppError::BadRequest(e.body_text()))
    }
}
