use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dto::validation::validate_username;

/// Credentials submitted to `/register`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterRequest {
    /// 1 to 32 characters without surrounding whitespace.
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    /// 1 to 128 characters.
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Credentials submitted to `/login`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    /// 1 to 32 characters without surrounding whitespace.
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    /// 1 to 128 characters.
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: String,
}

impl MessageResponse {
    /// Wrap `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Returned on successful login; `user_id` is the value to send as `X-User-Id`.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// Caller id for subsequent requests.
    pub user_id: Uuid,
}
