/// OpenAPI documentation generation.
pub mod documentation;
/// Game lifecycle: creation, moves, snapshots and settlement replay.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Player ranking.
pub mod leaderboard_service;
/// Projection of finished games onto the players' outcome sets.
pub mod ledger_service;
/// Storage connection supervisor driving degraded mode.
pub mod storage_supervisor;
/// Registration, login and per-user history.
pub mod user_service;
