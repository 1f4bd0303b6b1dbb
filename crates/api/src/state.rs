use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (the pool is reference-counted and the config
/// is behind an `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, created once at startup.
    pub pool: bookclub_db::DbPool,
    /// Server configuration (JWT settings are read by the auth extractor).
    pub config: Arc<ServerConfig>,
}
