//! Persistence seams consumed by the event-gated reply listener.
//!
//! The listener only needs three queries against the dispatch log and one
//! settings lookup, so those are expressed as traits here with PostgreSQL
//! implementations delegating to the `steady-db` repositories. Tests
//! substitute in-memory doubles.

use async_trait::async_trait;

use steady_core::types::Timestamp;
use steady_db::models::notification::NewDispatchLogEntry;
use steady_db::repositories::{DispatchLogRepo, NotificationSettingsRepo};
use steady_db::DbPool;

/// Storage failure surfaced by a collaborator store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The subset of a user's settings that governs reply notifications.
#[derive(Debug, Clone)]
pub struct ReplySettings {
    pub community_replies: bool,
    /// IANA timezone name as stored; may be stale or invalid.
    pub timezone: String,
    /// Minimum minutes between successful reply notifications.
    pub cooldown_minutes: i64,
}

/// Read access to per-user notification settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Settings governing reply notifications, or `None` when the user
    /// has never stored preferences.
    async fn reply_settings(&self, user_id: &str) -> Result<Option<ReplySettings>, StoreError>;
}

/// Append/query access to the persisted dispatch log.
#[async_trait]
pub trait DispatchLogStore: Send + Sync {
    /// Append one entry (sent, skipped, or failed).
    async fn record(&self, entry: NewDispatchLogEntry) -> Result<(), StoreError>;

    /// Dispatch instant of the most recent SENT entry for the user/type.
    async fn most_recent_sent_at(
        &self,
        user_id: &str,
        notification_type: &str,
    ) -> Result<Option<Timestamp>, StoreError>;

    /// Number of SENT entries for the user/type dispatched at or after
    /// `since`.
    async fn sent_count_since(
        &self,
        user_id: &str,
        notification_type: &str,
        since: Timestamp,
    ) -> Result<i64, StoreError>;
}

// ---------------------------------------------------------------------------
// PostgreSQL implementations
// ---------------------------------------------------------------------------

/// Settings store backed by the `user_notification_settings` table.
pub struct PgSettingsStore {
    pool: DbPool,
}

impl PgSettingsStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for PgSettingsStore {
    async fn reply_settings(&self, user_id: &str) -> Result<Option<ReplySettings>, StoreError> {
        let row = NotificationSettingsRepo::get_for_user(&self.pool, user_id).await?;
        Ok(row.map(|settings| ReplySettings {
            community_replies: settings.community_replies,
            timezone: settings.timezone,
            cooldown_minutes: i64::from(settings.community_reply_cooldown_minutes),
        }))
    }
}

/// Dispatch-log store backed by the `notification_dispatch_log` table.
pub struct PgDispatchLogStore {
    pool: DbPool,
}

impl PgDispatchLogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DispatchLogStore for PgDispatchLogStore {
    async fn record(&self, entry: NewDispatchLogEntry) -> Result<(), StoreError> {
        DispatchLogRepo::create(&self.pool, &entry).await?;
        Ok(())
    }

    async fn most_recent_sent_at(
        &self,
        user_id: &str,
        notification_type: &str,
    ) -> Result<Option<Timestamp>, StoreError> {
        let entry =
            DispatchLogRepo::find_most_recent_sent(&self.pool, user_id, notification_type)
                .await?;
        Ok(entry.map(|e| e.dispatched_at_utc))
    }

    async fn sent_count_since(
        &self,
        user_id: &str,
        notification_type: &str,
        since: Timestamp,
    ) -> Result<i64, StoreError> {
        Ok(
            DispatchLogRepo::count_sent_since(&self.pool, user_id, notification_type, since)
                .await?,
        )
    }
}
