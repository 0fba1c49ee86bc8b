use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/health` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
}

impl HealthResponse {
    /// Storage is installed and answering.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    /// No usable storage backend; game routes answer 503.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
        }
    }
}
