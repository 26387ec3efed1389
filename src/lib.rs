//! Chirpy: short-message backend with password accounts, JWT access tokens
//! and revocable refresh tokens.
//!
//! The binary in `main.rs` is a thin CLI over this library; integration tests
//! in `tests/` drive [`api::router`] directly.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod state;
pub mod store;

pub use state::AppState;
