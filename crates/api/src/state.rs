use std::sync::Arc;

use steady_notify::{NotificationScheduler, ReplyNotificationListener};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: steady_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Ordered notification dispatch front-end.
    pub scheduler: NotificationScheduler,
    /// Event-gated reply notification listener.
    pub reply_listener: Arc<ReplyNotificationListener>,
}
