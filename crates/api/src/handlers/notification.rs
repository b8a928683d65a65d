//! Handlers for the `/notifications` resource.
//!
//! All endpoints require authentication via [`AuthUser`].

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use steady_core::channels::CHANNEL_IN_APP;
use steady_core::error::CoreError;
use steady_core::scheduling::{
    build_daily_check_in_job, resolve_timezone, NotificationOptIn, SchedulePreferences,
    UserNotificationProfile,
};
use steady_core::types::{Timestamp, UserId};
use steady_db::models::notification::{
    DispatchStatus, NewDispatchLogEntry, UpsertNotificationSettings,
};
use steady_db::repositories::{DispatchLogRepo, NotificationSettingsRepo};
use steady_notify::ReplyCreatedEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / query types
// ---------------------------------------------------------------------------

/// Body for `POST /notifications/daily-check-in/schedule`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDailyCheckInBody {
    pub opt_in: NotificationOptIn,
    pub schedule: SchedulePreferences,
    /// When `true`, dispatch the job immediately instead of leaving it
    /// for the trigger collaborator.
    #[serde(default)]
    pub dispatch_now: bool,
}

/// Body for `POST /notifications/replies/event`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyEventBody {
    /// Defaults to the authenticated user; a mismatching explicit value
    /// is rejected.
    pub actor_user_id: Option<UserId>,
    pub target_user_id: UserId,
    pub reply_count: Option<u32>,
    pub occurred_at_utc: Option<Timestamp>,
}

/// Query parameters for `GET /notifications/dispatch-log`.
#[derive(Debug, Deserialize)]
pub struct DispatchLogQuery {
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
}

/// Maximum page size for dispatch-log listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for dispatch-log listing.
const DEFAULT_LIMIT: i64 = 50;

// ---------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------

/// POST /api/v1/notifications/daily-check-in/schedule
///
/// Store the caller's notification preferences and compute the next
/// daily check-in reminder job. With `dispatchNow` the job is handed to
/// the dispatcher immediately and the outcome is recorded in the
/// dispatch log.
pub async fn schedule_daily_check_in(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<ScheduleDailyCheckInBody>,
) -> AppResult<Json<serde_json::Value>> {
    let profile = UserNotificationProfile {
        user_id: auth.user_id.clone(),
        opt_in: body.opt_in.clone(),
        schedule: body.schedule.clone(),
    };

    // Validation happens here, before anything is stored.
    let job = build_daily_check_in_job(&profile, Utc::now())?;

    let settings = UpsertNotificationSettings {
        daily_check_in_reminder: Some(body.opt_in.daily_check_in_reminder),
        weekly_reflection: Some(body.opt_in.weekly_reflection),
        community_replies: Some(body.opt_in.community_replies),
        timezone: Some(body.schedule.timezone.clone()),
        daily_reminder_hour_local: Some(body.schedule.daily_reminder_hour_local as i16),
        weekly_reflection_day_local: Some(body.schedule.weekly_reflection_day_local as i16),
        weekly_reflection_hour_local: Some(body.schedule.weekly_reflection_hour_local as i16),
        community_reply_cooldown_minutes: None,
    };
    NotificationSettingsRepo::upsert(&state.pool, &auth.user_id, &settings).await?;

    let Some(job) = job else {
        return Ok(Json(serde_json::json!({
            "scheduled": false,
            "reason": "User is not opted in to daily check-in reminders.",
        })));
    };

    if !body.dispatch_now {
        return Ok(Json(serde_json::json!({
            "scheduled": true,
            "job": job,
            "dispatched": null,
        })));
    }

    let mut results = state.scheduler.dispatch_jobs(vec![job.clone()]).await;
    let dispatched = results.pop().ok_or_else(|| {
        AppError::InternalError("Dispatcher returned no result for the job".into())
    })?;

    let status = if dispatched.delivered {
        DispatchStatus::Sent
    } else {
        DispatchStatus::Failed
    };
    DispatchLogRepo::create(
        &state.pool,
        &NewDispatchLogEntry {
            user_id: auth.user_id.clone(),
            notification_type: job.notification_type.as_str().to_string(),
            status,
            channel: CHANNEL_IN_APP.to_string(),
            scheduled_at_utc: job.scheduled_at_utc,
            dispatched_at_utc: dispatched.dispatched_at_utc,
            // The job id is already a pure function of (type, user,
            // instant), so it doubles as the dedupe key here.
            dedupe_key: job.job_id.clone(),
            payload: serde_json::to_value(&job.payload).unwrap_or(serde_json::Value::Null),
            reason: if dispatched.delivered {
                None
            } else {
                Some(dispatched.message.clone())
            },
        },
    )
    .await?;

    Ok(Json(serde_json::json!({
        "scheduled": true,
        "job": job,
        "dispatched": dispatched,
    })))
}

// ---------------------------------------------------------------------------
// Reply events
// ---------------------------------------------------------------------------

/// POST /api/v1/notifications/replies/event
///
/// Invoked by the community feature right after a reply is persisted.
/// Returns the listener outcome verbatim (allow / cooldown / rate-limit).
pub async fn reply_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<ReplyEventBody>,
) -> AppResult<Json<steady_notify::ReplyNotificationOutcome>> {
    if let Some(actor) = &body.actor_user_id {
        if actor != &auth.user_id {
            return Err(AppError::Core(CoreError::Forbidden(
                "actorUserId does not match authenticated user".into(),
            )));
        }
    }

    let event = ReplyCreatedEvent {
        actor_user_id: auth.user_id.clone(),
        target_user_id: body.target_user_id,
        reply_count: body.reply_count,
        occurred_at_utc: body.occurred_at_utc,
    };

    let outcome = state.reply_listener.on_reply_created(&event).await?;
    Ok(Json(outcome))
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications/settings
///
/// Get the authenticated user's notification settings (opt-ins plus
/// schedule preferences), or `null` if none are stored yet.
pub async fn get_settings(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let settings = NotificationSettingsRepo::get_for_user(&state.pool, &auth.user_id).await?;

    Ok(Json(serde_json::json!({ "data": settings })))
}

/// PUT /api/v1/notifications/settings
///
/// Partially update the authenticated user's notification settings.
/// Schedule fields are validated before anything is written.
pub async fn update_settings(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpsertNotificationSettings>,
) -> AppResult<Json<serde_json::Value>> {
    if let Some(timezone) = &input.timezone {
        resolve_timezone(timezone)?;
    }
    for (field, value) in [
        ("dailyReminderHourLocal", input.daily_reminder_hour_local),
        (
            "weeklyReflectionHourLocal",
            input.weekly_reflection_hour_local,
        ),
    ] {
        if let Some(hour) = value {
            if !(0..=23).contains(&hour) {
                return Err(AppError::BadRequest(format!(
                    "{field} must be an integer between 0 and 23, got {hour}"
                )));
            }
        }
    }
    if let Some(day) = input.weekly_reflection_day_local {
        if !(0..=6).contains(&day) {
            return Err(AppError::BadRequest(format!(
                "weeklyReflectionDayLocal must be between 0 (Sunday) and 6 (Saturday), got {day}"
            )));
        }
    }
    if let Some(cooldown) = input.community_reply_cooldown_minutes {
        if cooldown < 1 {
            return Err(AppError::BadRequest(
                "communityReplyCooldownMinutes must be a positive integer".into(),
            ));
        }
    }

    let settings = NotificationSettingsRepo::upsert(&state.pool, &auth.user_id, &input).await?;

    Ok(Json(serde_json::json!({ "data": settings })))
}

// ---------------------------------------------------------------------------
// Dispatch log (audit)
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications/dispatch-log
///
/// Recent scheduling decisions for the authenticated user, newest first.
/// Every decision -- sent, skipped, or failed -- has an entry here.
pub async fn get_dispatch_log(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DispatchLogQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let entries = DispatchLogRepo::list_recent_for_user(&state.pool, &auth.user_id, limit).await?;

    Ok(Json(serde_json::json!({ "data": entries })))
}
