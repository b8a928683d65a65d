//! Notification settings and dispatch-log entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use steady_core::types::{Timestamp, UserId};

/// A row from the `user_notification_settings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNotificationSettings {
    pub id: i64,
    pub user_id: UserId,
    pub daily_check_in_reminder: bool,
    pub weekly_reflection: bool,
    pub community_replies: bool,
    pub timezone: String,
    pub daily_reminder_hour_local: i16,
    pub weekly_reflection_day_local: i16,
    pub weekly_reflection_hour_local: i16,
    pub community_reply_cooldown_minutes: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the append-only `notification_dispatch_log` table.
///
/// This table is both the audit trail for every scheduling decision and
/// the source of truth for the reply rate limiter, so it must survive
/// restarts and stay visible across backend instances.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDispatchLog {
    pub id: i64,
    pub user_id: UserId,
    pub notification_type: String,
    pub status: String,
    pub channel: String,
    pub scheduled_at_utc: Timestamp,
    pub dispatched_at_utc: Timestamp,
    pub dedupe_key: String,
    pub payload: serde_json::Value,
    pub reason: Option<String>,
    pub created_at: Timestamp,
}

/// Delivery status values stored in `notification_dispatch_log.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    Sent,
    Skipped,
    Failed,
}

impl DispatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DispatchStatus::Sent => "SENT",
            DispatchStatus::Skipped => "SKIPPED",
            DispatchStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for DispatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Insert payload for a new dispatch-log entry.
#[derive(Debug, Clone)]
pub struct NewDispatchLogEntry {
    pub user_id: UserId,
    pub notification_type: String,
    pub status: DispatchStatus,
    pub channel: String,
    pub scheduled_at_utc: Timestamp,
    pub dispatched_at_utc: Timestamp,
    pub dedupe_key: String,
    pub payload: serde_json::Value,
    pub reason: Option<String>,
}

/// DTO for upserting user notification settings.
///
/// `None` fields keep their stored (or default) value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertNotificationSettings {
    pub daily_check_in_reminder: Option<bool>,
    pub weekly_reflection: Option<bool>,
    pub community_replies: Option<bool>,
    pub timezone: Option<String>,
    pub daily_reminder_hour_local: Option<i16>,
    pub weekly_reflection_day_local: Option<i16>,
    pub weekly_reflection_hour_local: Option<i16>,
    pub community_reply_cooldown_minutes: Option<i32>,
}
