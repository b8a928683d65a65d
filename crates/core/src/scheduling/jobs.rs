//! Notification job building.
//!
//! Jobs carry a deterministic identity: the id is a pure function of
//! `(type, user, scheduled instant)`, so recomputing the schedule for the
//! same due instant yields the same id and downstream consumers can
//! dedupe on it.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Timestamp, UserId};

use super::localtime::resolve_timezone;
use super::recurrence::{next_daily_utc, next_weekly_utc};
use super::{ensure_hour, ensure_weekday, ScheduleError};

/// Reply jobs are scheduled this many minutes out rather than immediately,
/// so rapid-fire replies can batch upstream before the send.
pub const REPLY_DEBOUNCE_MINUTES: i64 = 2;

// ---------------------------------------------------------------------------
// Data model
// ---------------------------------------------------------------------------

/// The closed set of notification kinds this backend produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    DailyCheckInReminder,
    WeeklyReflection,
    CommunityReplies,
}

impl NotificationType {
    /// Wire/database form, e.g. `"DAILY_CHECK_IN_REMINDER"`.
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationType::DailyCheckInReminder => "DAILY_CHECK_IN_REMINDER",
            NotificationType::WeeklyReflection => "WEEKLY_REFLECTION",
            NotificationType::CommunityReplies => "COMMUNITY_REPLIES",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-type opt-in flags from the user's notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptIn {
    pub daily_check_in_reminder: bool,
    pub weekly_reflection: bool,
    pub community_replies: bool,
}

/// Schedule preferences expressed in the user's local wall-clock time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePreferences {
    /// IANA timezone name, e.g. `"America/New_York"`.
    pub timezone: String,
    /// Hour of day (0-23) for the daily check-in reminder.
    pub daily_reminder_hour_local: u32,
    /// Weekday (0 = Sunday through 6 = Saturday) for the weekly reflection.
    pub weekly_reflection_day_local: u32,
    /// Hour of day (0-23) for the weekly reflection.
    pub weekly_reflection_hour_local: u32,
}

/// A user's notification profile: opt-ins plus schedule preferences.
/// Owned by the settings store; read-only input here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNotificationProfile {
    pub user_id: UserId,
    pub opt_in: NotificationOptIn,
    pub schedule: SchedulePreferences,
}

/// Type-specific payload carried by a job. The `kind` discriminator keeps
/// the wire shape compatible with the mobile and web clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum JobPayload {
    #[serde(rename = "daily-check-in", rename_all = "camelCase")]
    DailyCheckIn { supportive_tone: bool },

    #[serde(rename = "weekly-reflection", rename_all = "camelCase")]
    WeeklyReflection { supportive_tone: bool },

    #[serde(rename = "community-replies", rename_all = "camelCase")]
    CommunityReplies {
        reply_count: u32,
        latest_reply_at_utc: Option<Timestamp>,
        supportive_tone: bool,
    },
}

/// A single, uniquely-identified, time-stamped unit of notification work.
/// Immutable once built; consumed exactly once by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationJob {
    pub job_id: String,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub scheduled_at_utc: Timestamp,
    pub timezone: String,
    pub payload: JobPayload,
}

/// Outcome of one dispatch attempt. Never mutated after creation; a
/// failed delivery is data (`delivered = false`), not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDispatchResult {
    pub job_id: String,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub dispatched_at_utc: Timestamp,
    pub delivered: bool,
    pub message: String,
}

/// "User X got N replies" signal produced by the community feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityReplySignal {
    pub user_id: UserId,
    pub reply_count: u32,
    pub latest_reply_at_utc: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Job building
// ---------------------------------------------------------------------------

/// Deterministic job identity: `{TYPE}:{userId}:{compactUtcTimestamp}`,
/// where the compact timestamp is the scheduled instant at second
/// granularity with all separators stripped.
pub fn job_id(
    notification_type: NotificationType,
    user_id: &str,
    scheduled_at_utc: DateTime<Utc>,
) -> String {
    format!(
        "{}:{}:{}",
        notification_type.as_str(),
        user_id,
        scheduled_at_utc.format("%Y%m%d%H%M%S")
    )
}

/// Build the next-occurrence jobs for every recurring type the user has
/// opted in to, sorted ascending by scheduled instant.
///
/// Fails fast on an unresolvable timezone or out-of-range schedule fields
/// before any job is built.
pub fn build_scheduled_jobs(
    profile: &UserNotificationProfile,
    now_utc: DateTime<Utc>,
) -> Result<Vec<NotificationJob>, ScheduleError> {
    let tz = resolve_timezone(&profile.schedule.timezone)?;
    ensure_hour(
        "dailyReminderHourLocal",
        profile.schedule.daily_reminder_hour_local,
    )?;
    ensure_hour(
        "weeklyReflectionHourLocal",
        profile.schedule.weekly_reflection_hour_local,
    )?;
    ensure_weekday(profile.schedule.weekly_reflection_day_local)?;

    let mut jobs = Vec::new();

    if profile.opt_in.daily_check_in_reminder {
        let at = next_daily_utc(now_utc, tz, profile.schedule.daily_reminder_hour_local)?;
        jobs.push(NotificationJob {
            job_id: job_id(NotificationType::DailyCheckInReminder, &profile.user_id, at),
            user_id: profile.user_id.clone(),
            notification_type: NotificationType::DailyCheckInReminder,
            scheduled_at_utc: at,
            timezone: profile.schedule.timezone.clone(),
            payload: JobPayload::DailyCheckIn {
                supportive_tone: true,
            },
        });
    }

    if profile.opt_in.weekly_reflection {
        let at = next_weekly_utc(
            now_utc,
            tz,
            profile.schedule.weekly_reflection_day_local,
            profile.schedule.weekly_reflection_hour_local,
        )?;
        jobs.push(NotificationJob {
            job_id: job_id(NotificationType::WeeklyReflection, &profile.user_id, at),
            user_id: profile.user_id.clone(),
            notification_type: NotificationType::WeeklyReflection,
            scheduled_at_utc: at,
            timezone: profile.schedule.timezone.clone(),
            payload: JobPayload::WeeklyReflection {
                supportive_tone: true,
            },
        });
    }

    jobs.sort_by_key(|job| job.scheduled_at_utc);
    Ok(jobs)
}

/// Build only the daily check-in job, or `None` when the user is not
/// opted in. Convenience for the schedule endpoint.
pub fn build_daily_check_in_job(
    profile: &UserNotificationProfile,
    now_utc: DateTime<Utc>,
) -> Result<Option<NotificationJob>, ScheduleError> {
    let jobs = build_scheduled_jobs(profile, now_utc)?;
    Ok(jobs
        .into_iter()
        .find(|job| job.notification_type == NotificationType::DailyCheckInReminder))
}

/// Build reply-notification jobs from a batch of community reply signals.
///
/// Signals with a zero reply count are skipped, unknown users default to
/// UTC, and signals whose stored timezone cannot be resolved are skipped
/// silently. Jobs are scheduled [`REPLY_DEBOUNCE_MINUTES`] from `now_utc`.
pub fn build_community_reply_jobs(
    signals: &[CommunityReplySignal],
    timezone_by_user: &HashMap<UserId, String>,
    now_utc: DateTime<Utc>,
) -> Vec<NotificationJob> {
    let mut jobs = Vec::new();

    for signal in signals {
        if signal.reply_count == 0 {
            continue;
        }

        let timezone = timezone_by_user
            .get(&signal.user_id)
            .map(String::as_str)
            .unwrap_or("UTC");
        if resolve_timezone(timezone).is_err() {
            continue;
        }

        let at = now_utc + Duration::minutes(REPLY_DEBOUNCE_MINUTES);
        jobs.push(NotificationJob {
            job_id: job_id(NotificationType::CommunityReplies, &signal.user_id, at),
            user_id: signal.user_id.clone(),
            notification_type: NotificationType::CommunityReplies,
            scheduled_at_utc: at,
            timezone: timezone.to_string(),
            payload: JobPayload::CommunityReplies {
                reply_count: signal.reply_count,
                latest_reply_at_utc: signal.latest_reply_at_utc,
                supportive_tone: true,
            },
        });
    }

    jobs
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
