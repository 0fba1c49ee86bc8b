use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{game_store::GameStore, storage::StorageError},
    retry::Backoff,
    state::SharedState,
};

/// Pacing of the initial connection loop; attempts are unbounded.
const CONNECT_DELAYS: Backoff = Backoff {
    max_attempts: u32::MAX,
    initial_delay: Duration::from_secs(1),
    max_delay: Duration::from_secs(10),
};
/// Budget for reconnecting an installed store after a failed ping.
const RECONNECT_BACKOFF: Backoff = Backoff {
    max_attempts: 3,
    initial_delay: Duration::from_secs(1),
    max_delay: Duration::from_secs(10),
};
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Connect to the storage backend, install it, and keep watching it.
///
/// While the backend is unreachable the shared state stays in degraded mode
/// and game routes answer 503. Runs until the process exits.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn GameStore>, StorageError>> + Send,
{
    let mut delay = CONNECT_DELAYS.initial_delay;

    loop {
        match connect().await {
            Ok(store) => {
                state.set_game_store(store.clone()).await;
                info!("storage connection established; leaving degraded mode");
                delay = CONNECT_DELAYS.initial_delay;

                watch(&state, store.as_ref()).await;
                warn!("exhausted storage reconnect attempts; connecting from scratch");
            }
            Err(err) => warn!(error = %err, "storage connection attempt failed"),
        }

        sleep(delay).await;
        delay = CONNECT_DELAYS.next_delay(delay);
    }
}

/// Poll `store` until it fails and cannot be reconnected within
/// [`RECONNECT_BACKOFF`].
async fn watch(state: &SharedState, store: &dyn GameStore) {
    loop {
        if store.health_check().await.is_ok() {
            if state.is_degraded().await {
                info!("storage healthy again; leaving degraded mode");
                state.update_degraded(false).await;
            }
            sleep(HEALTH_POLL_INTERVAL).await;
            continue;
        }

        if !reconnect(state, store).await {
            return;
        }
        state.update_degraded(false).await;
        sleep(HEALTH_POLL_INTERVAL).await;
    }
}

async fn reconnect(state: &SharedState, store: &dyn GameStore) -> bool {
    let mut delay = RECONNECT_BACKOFF.initial_delay;

    for attempt in 1..=RECONNECT_BACKOFF.max_attempts {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "storage reconnection succeeded after health check failure");
                return true;
            }
            Err(err) => {
                if attempt == 1 {
                    warn!(attempt, error = %err, "storage reconnect failed; entering degraded mode");
                    state.update_degraded(true).await;
                } else {
                    warn!(attempt, error = %err, "storage reconnect attempt failed");
                }
                sleep(delay).await;
                delay = RECONNECT_BACKOFF.next_delay(delay);
            }
        }
    }

    false
}
