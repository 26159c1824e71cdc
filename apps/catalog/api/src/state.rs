//! Application state management.
//!
//! Shared state handed to the app-level routers. Domain routers build their
//! own `Arc`ed services from it and apply that state themselves.

use database::postgres::DatabaseConnection;

/// Shared application state.
///
/// Cloning is cheap: the connection is a pooled handle.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// PostgreSQL database connection pool
    pub db: DatabaseConnection,
}
