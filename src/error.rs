use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use axum_valid::ValidRejection;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::{dao::storage::StorageError, services::ledger_service::LedgerError, state::game::MoveError};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Caller identity missing or unknown.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Resource already exists or was concurrently modified.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Move rejected by the game rules.
    #[error(transparent)]
    Move(#[from] MoveError),
    /// The game was settled but some player aggregates could not be updated.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict { .. } | StorageError::AlreadyExists { .. } => {
                ServiceError::Conflict(err.to_string())
            }
            StorageError::NotFound { .. } => ServiceError::NotFound(err.to_string()),
            StorageError::Unavailable { .. } => ServiceError::Unavailable(err),
        }
    }
}

impl ServiceError {
    pub(crate) fn game_not_found(id: Uuid) -> Self {
        ServiceError::NotFound(format!("game `{id}` not found"))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl<E> From<ValidRejection<E>> for AppError
where
    E: Into<AppError>,
{
    fn from(rejection: ValidRejection<E>) -> Self {
        match rejection {
            ValidRejection::Valid(errors) => errors.into(),
            ValidRejection::Inner(inner) => inner.into(),
        }
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Authenticated caller is not allowed to perform this action.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Conflict(message) => AppError::Conflict(message),
            ServiceError::Move(err) => err.into(),
            ServiceError::Ledger(err) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<MoveError> for AppError {
    fn from(err: MoveError) -> Self {
        match err {
            MoveError::GameFinished
            | MoveError::OutOfBounds { .. }
            | MoveError::CellOccupied { .. } => AppError::BadRequest(err.to_string()),
            MoveError::NotAParticipant
            | MoveError::WrongSymbol { .. }
            | MoveError::NotYourTurn => AppError::Forbidden(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn move_errors_map_to_client_statuses() {
        assert_eq!(status_of(MoveError::GameFinished), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(MoveError::CellOccupied { row: 0, col: 0 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(MoveError::NotYourTurn), StatusCode::FORBIDDEN);
        assert_eq!(status_of(MoveError::NotAParticipant), StatusCode::FORBIDDEN);
    }

    #[test]
    fn storage_errors_map_through_the_service_layer() {
        let conflict = StorageError::Conflict {
            id: Uuid::new_v4(),
            expected_version: 3,
        };
        assert_eq!(status_of(ServiceError::from(conflict)), StatusCode::CONFLICT);

        let missing = StorageError::NotFound {
            entity: "game",
            id: Uuid::new_v4(),
        };
        assert_eq!(status_of(ServiceError::from(missing)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(ServiceError::Degraded),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn ledger_inconsistency_is_an_internal_error() {
        let err = LedgerError::Inconsistent {
            game_id: Uuid::new_v4(),
            pending: vec![Uuid::new_v4()],
        };
        assert_eq!(
            status_of(ServiceError::from(err)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
