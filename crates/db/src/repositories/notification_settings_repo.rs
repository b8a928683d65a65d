//! Repository for the `user_notification_settings` table.

use sqlx::PgPool;

use crate::models::notification::{UpsertNotificationSettings, UserNotificationSettings};

/// Column list for `user_notification_settings` queries.
const COLUMNS: &str = "id, user_id, daily_check_in_reminder, weekly_reflection, \
    community_replies, timezone, daily_reminder_hour_local, weekly_reflection_day_local, \
    weekly_reflection_hour_local, community_reply_cooldown_minutes, created_at, updated_at";

/// Provides CRUD operations for per-user notification settings.
pub struct NotificationSettingsRepo;

impl NotificationSettingsRepo {
    /// Get the settings row for a user, if one exists.
    pub async fn get_for_user(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Option<UserNotificationSettings>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM user_notification_settings WHERE user_id = $1");
        sqlx::query_as::<_, UserNotificationSettings>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or update a user's notification settings.
    ///
    /// Uses `COALESCE` so only fields that are `Some` in the input
    /// overwrite stored values; first-time inserts fall back to defaults
    /// (opted out of reminders, replies on, UTC, 09:00 daily, Sunday
    /// 18:00 weekly, 30-minute reply cooldown).
    pub async fn upsert(
        pool: &PgPool,
        user_id: &str,
        settings: &UpsertNotificationSettings,
    ) -> Result<UserNotificationSettings, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_notification_settings \
                (user_id, daily_check_in_reminder, weekly_reflection, community_replies, \
                 timezone, daily_reminder_hour_local, weekly_reflection_day_local, \
                 weekly_reflection_hour_local, community_reply_cooldown_minutes) \
             VALUES ($1, COALESCE($2, false), COALESCE($3, false), COALESCE($4, true), \
                     COALESCE($5, 'UTC'), COALESCE($6, 9), COALESCE($7, 0), \
                     COALESCE($8, 18), COALESCE($9, 30)) \
             ON CONFLICT (user_id) DO UPDATE SET \
                daily_check_in_reminder = COALESCE($2, user_notification_settings.daily_check_in_reminder), \
                weekly_reflection = COALESCE($3, user_notification_settings.weekly_reflection), \
                community_replies = COALESCE($4, user_notification_settings.community_replies), \
                timezone = COALESCE($5, user_notification_settings.timezone), \
                daily_reminder_hour_local = COALESCE($6, user_notification_settings.daily_reminder_hour_local), \
                weekly_reflection_day_local = COALESCE($7, user_notification_settings.weekly_reflection_day_local), \
                weekly_reflection_hour_local = COALESCE($8, user_notification_settings.weekly_reflection_hour_local), \
                community_reply_cooldown_minutes = COALESCE($9, user_notification_settings.community_reply_cooldown_minutes), \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserNotificationSettings>(&query)
            .bind(user_id)
            .bind(settings.daily_check_in_reminder)
            .bind(settings.weekly_reflection)
            .bind(settings.community_replies)
            .bind(&settings.timezone)
            .bind(settings.daily_reminder_hour_local)
            .bind(settings.weekly_reflection_day_local)
            .bind(settings.weekly_reflection_hour_local)
            .bind(settings.community_reply_cooldown_minutes)
            .fetch_one(pool)
            .await
    }
}
