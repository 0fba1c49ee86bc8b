use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tokio::time::sleep;
use tracing::{debug, warn};

use super::error::{MongoDaoError, MongoResult};
use crate::retry::Backoff;

const CONNECT_BACKOFF: Backoff = Backoff {
    max_attempts: 10,
    initial_delay: Duration::from_millis(250),
    max_delay: Duration::from_secs(5),
};

/// Build a client for `database_name` and wait until the server answers a ping.
pub async fn establish_connection(
    options: &ClientOptions,
    database_name: &str,
) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    let mut attempt = 0;
    let mut delay = CONNECT_BACKOFF.initial_delay;

    loop {
        attempt += 1;
        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => {
                debug!(database = database_name, attempt, "MongoDB answered ping");
                return Ok((client, database));
            }
            Err(source) if attempt >= CONNECT_BACKOFF.max_attempts => {
                return Err(MongoDaoError::InitialPing {
                    attempts: attempt,
                    source,
                });
            }
            Err(err) => {
                warn!(database = database_name, attempt, error = %err, "MongoDB ping failed; retrying");
                sleep(delay).await;
                delay = CONNECT_BACKOFF.next_delay(delay);
            }
        }
    }
}
