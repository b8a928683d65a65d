pub mod health;
pub mod notification;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /notifications/daily-check-in/schedule   schedule (and optionally
///                                          dispatch) the daily reminder
/// /notifications/replies/event             reply-created event intake
/// /notifications/settings                  get / update preferences
/// /notifications/dispatch-log              audit trail
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/notifications", notification::router())
}
