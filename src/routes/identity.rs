use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;

/// Header carrying the caller's user id, as returned by `/login`.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Caller identity taken from the `X-User-Id` header.
///
/// The header is trusted as-is; authenticating it is left to whatever sits in
/// front of this service.
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub Uuid);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| {
                AppError::Unauthorized(
                    "Authentication required (missing X-User-Id header).".into(),
                )
            })?
            .to_str()
            .map_err(|_| AppError::Unauthorized("malformed X-User-Id header".into()))?;

        Uuid::parse_str(raw.trim())
            .map(Actor)
            .map_err(|_| AppError::Unauthorized("Invalid user.".into()))
    }
}
