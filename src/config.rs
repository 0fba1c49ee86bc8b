//! Application-level configuration loading: leaderboard size and the retry
//! budget of the result ledger.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{retry::Backoff, state::leaderboard::DEFAULT_LEADERBOARD_LIMIT};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TICTACTOE_BACK_CONFIG_PATH";
/// Ledger retry budget used when the file does not provide one.
const DEFAULT_LEDGER_BACKOFF: Backoff = Backoff {
    max_attempts: 5,
    initial_delay: Duration::from_millis(50),
    max_delay: Duration::from_secs(1),
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    leaderboard_limit: usize,
    ledger: Backoff,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        leaderboard_limit = app_config.leaderboard_limit,
                        ledger_attempts = app_config.ledger.max_attempts,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document; omitted keys keep their defaults.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Build a configuration with explicit values.
    pub fn new(leaderboard_limit: usize, ledger: Backoff) -> Self {
        Self {
            leaderboard_limit,
            ledger,
        }
    }

    /// Number of leaderboard entries returned when the caller gives no limit.
    pub fn leaderboard_limit(&self) -> usize {
        self.leaderboard_limit
    }

    /// Retry budget for each player's aggregate update.
    pub fn ledger_backoff(&self) -> Backoff {
        self.ledger
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
            ledger: DEFAULT_LEDGER_BACKOFF,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    leaderboard_limit: Option<usize>,
    ledger: Option<Backoff>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            leaderboard_limit: value
                .leaderboard_limit
                .filter(|limit| *limit > 0)
                .unwrap_or(defaults.leaderboard_limit),
            ledger: value
                .ledger
                .filter(|backoff| backoff.max_attempts > 0)
                .unwrap_or(defaults.ledger),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
