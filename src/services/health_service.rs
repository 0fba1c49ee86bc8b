use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report `ok` only when a store is installed, the supervisor has not flagged
/// degraded mode, and the store answers a ping.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    if state.is_degraded().await {
        return HealthResponse::degraded();
    }

    let Some(store) = state.game_store().await else {
        return HealthResponse::degraded();
    };

    match store.health_check().await {
        Ok(()) => HealthResponse::ok(),
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            HealthResponse::degraded()
        }
    }
}
