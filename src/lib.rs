//! Library crate for tictactoe-back, exposing modules for binaries and tests.

mod config;
/// Storage abstraction and its in-memory and MongoDB backends.
pub mod dao;
mod dto;
mod error;
mod retry;
/// HTTP routers, extractors and OpenAPI annotations.
pub mod routes;
/// Business operations invoked by the routes.
pub mod services;
/// Shared application state and the game domain model.
pub mod state;
