/// Game and user storage backends.
pub mod game_store;
/// Storage-agnostic entity definitions.
pub mod models;
/// Storage error taxonomy shared by every backend.
pub mod storage;
