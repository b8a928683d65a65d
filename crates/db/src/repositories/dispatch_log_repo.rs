//! Repository for the append-only `notification_dispatch_log` table.
//!
//! Rows are created once per scheduling decision (including skips) and
//! never updated. The SENT rows double as the reply rate limiter's
//! persisted history.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::notification::{NewDispatchLogEntry, NotificationDispatchLog};

/// Column list for `notification_dispatch_log` queries.
const COLUMNS: &str = "id, user_id, notification_type, status, channel, \
    scheduled_at_utc, dispatched_at_utc, dedupe_key, payload, reason, created_at";

/// Provides append and query operations for dispatch-log entries.
pub struct DispatchLogRepo;

impl DispatchLogRepo {
    /// Append a dispatch-log entry, returning the generated ID.
    pub async fn create(pool: &PgPool, entry: &NewDispatchLogEntry) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO notification_dispatch_log \
                (user_id, notification_type, status, channel, scheduled_at_utc, \
                 dispatched_at_utc, dedupe_key, payload, reason) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id",
        )
        .bind(&entry.user_id)
        .bind(&entry.notification_type)
        .bind(entry.status.as_str())
        .bind(&entry.channel)
        .bind(entry.scheduled_at_utc)
        .bind(entry.dispatched_at_utc)
        .bind(&entry.dedupe_key)
        .bind(&entry.payload)
        .bind(&entry.reason)
        .fetch_one(pool)
        .await
    }

    /// The most recent SENT entry for a user and notification type.
    pub async fn find_most_recent_sent(
        pool: &PgPool,
        user_id: &str,
        notification_type: &str,
    ) -> Result<Option<NotificationDispatchLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_dispatch_log \
             WHERE user_id = $1 AND notification_type = $2 AND status = 'SENT' \
             ORDER BY dispatched_at_utc DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, NotificationDispatchLog>(&query)
            .bind(user_id)
            .bind(notification_type)
            .fetch_optional(pool)
            .await
    }

    /// Count SENT entries for a user and type dispatched at or after
    /// `since`.
    pub async fn count_sent_since(
        pool: &PgPool,
        user_id: &str,
        notification_type: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notification_dispatch_log \
             WHERE user_id = $1 AND notification_type = $2 \
               AND status = 'SENT' AND dispatched_at_utc >= $3",
        )
        .bind(user_id)
        .bind(notification_type)
        .bind(since)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }

    /// List the most recent entries for a user, newest first.
    pub async fn list_recent_for_user(
        pool: &PgPool,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<NotificationDispatchLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_dispatch_log \
             WHERE user_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, NotificationDispatchLog>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
