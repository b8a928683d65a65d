//! Notification scheduling domain logic.
//!
//! Converts user-local wall-clock preferences ("daily at 9am in my
//! timezone") into UTC dispatch instants and builds deterministic
//! notification jobs from them. Everything here is pure, synchronous
//! computation: periodic re-invocation is owned by an external trigger
//! (cron, a queue consumer, or an HTTP caller).

pub mod jobs;
pub mod localtime;
pub mod recurrence;

pub use jobs::{
    build_community_reply_jobs, build_daily_check_in_job, build_scheduled_jobs, job_id,
    CommunityReplySignal, JobPayload, NotificationDispatchResult, NotificationJob,
    NotificationOptIn, NotificationType, SchedulePreferences, UserNotificationProfile,
};
pub use localtime::{local_time_to_utc, resolve_timezone, utc_to_local_fields, LocalFields};
pub use recurrence::{next_daily_utc, next_weekly_utc};

/// Validation errors raised before any job is built or any log entry is
/// written. These indicate caller-input bugs and are never retried.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("{field} must be an integer between 0 and 23, got {value}")]
    InvalidHour { field: &'static str, value: u32 },

    #[error("Weekday must be between 0 (Sunday) and 6 (Saturday), got {0}")]
    InvalidWeekday(u32),
}

/// Check that an hour-of-day field is within `0..=23`.
pub(crate) fn ensure_hour(field: &'static str, value: u32) -> Result<(), ScheduleError> {
    if value > 23 {
        return Err(ScheduleError::InvalidHour { field, value });
    }
    Ok(())
}

/// Check that a weekday field is within `0..=6` (0 = Sunday).
pub(crate) fn ensure_weekday(value: u32) -> Result<(), ScheduleError> {
    if value > 6 {
        return Err(ScheduleError::InvalidWeekday(value));
    }
    Ok(())
}
