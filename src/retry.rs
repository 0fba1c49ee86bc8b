//! Bounded exponential backoff shared by connection setup and the result ledger.

use std::time::Duration;

use serde::Deserialize;

/// Attempt budget and delay bounds for a retried operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Backoff {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay after the first failure.
    #[serde(rename = "initial_delay_ms", with = "millis")]
    pub initial_delay: Duration,
    /// Ceiling for the doubled delay.
    #[serde(rename = "max_delay_ms", with = "millis")]
    pub max_delay: Duration,
}

impl Backoff {
    /// Delay to wait after a failure that followed a wait of `current`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        (current * 2).min(self.max_delay)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    /// Read a whole number of milliseconds.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
