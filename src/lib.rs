//! Token Gate - a minimal token-authenticated HTTP API
//!
//! Users register with a username and password, exchange those credentials
//! for a signed, time-bounded bearer token, and present the token to reach
//! protected routes.

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod security;
pub mod storage;

// Re-export main components
pub use config::ServerConfig;
pub use constants::*;
pub use error::{Result, TokenGateError};
pub use routes::routes;
