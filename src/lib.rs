//! Chatdesk Backend Library
//!
//! Exposes the auth core, document and chat services and the HTTP router
//! for use by the server binary and integration tests.

pub mod api;
pub mod auth;
pub mod chat;
pub mod config;
pub mod db;
pub mod documents;
pub mod middleware;

pub use api::{build_router, AppState};
pub use config::Config;
