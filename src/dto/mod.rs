//! Request and response bodies of the HTTP API.

use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Registration and login payloads.
pub mod auth;
/// Game payloads.
pub mod game;
/// Health payload.
pub mod health;
/// Leaderboard query and entries.
pub mod leaderboard;
/// Per-user history entries.
pub mod user;
/// Custom `validator` rules.
pub mod validation;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
