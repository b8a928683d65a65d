//! Route definitions for the `/notifications` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// POST   /daily-check-in/schedule   -> schedule_daily_check_in
/// POST   /replies/event             -> reply_event
///
/// GET    /settings                  -> get_settings
/// PUT    /settings                  -> update_settings
///
/// GET    /dispatch-log              -> get_dispatch_log
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/daily-check-in/schedule",
            post(notification::schedule_daily_check_in),
        )
        .route("/replies/event", post(notification::reply_event))
        .route(
            "/settings",
            get(notification::get_settings).put(notification::update_settings),
        )
        .route("/dispatch-log", get(notification::get_dispatch_log))
}
