//! Event-gated reply notification listener.
//!
//! For every "reply created" event the listener decides allow, cooldown,
//! or rate-limit, and dispatches at most one notification. The decision
//! is derived entirely from the persisted dispatch log -- not process
//! memory -- so the cooldown and hourly cap hold across restarts and
//! across concurrently running backend instances.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use steady_core::channels::CHANNEL_IN_APP;
use steady_core::scheduling::{
    build_community_reply_jobs, resolve_timezone, CommunityReplySignal,
    NotificationDispatchResult, NotificationJob, NotificationType,
};
use steady_core::types::{Timestamp, UserId};
use steady_db::models::notification::{DispatchStatus, NewDispatchLogEntry};

use crate::scheduler::NotificationScheduler;
use crate::stores::{DispatchLogStore, SettingsStore, StoreError};

/// Minimum minutes between successful reply notifications when the user
/// has no stored cooldown preference.
pub const DEFAULT_COOLDOWN_MINUTES: i64 = 30;

/// Width of the sliding rate-limit window.
pub const RATE_WINDOW_MINUTES: i64 = 60;

/// Maximum successful sends per user within one window.
pub const MAX_SENT_PER_WINDOW: i64 = 3;

/// A reply was persisted against one of the target user's posts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyCreatedEvent {
    pub actor_user_id: UserId,
    pub target_user_id: UserId,
    #[serde(default)]
    pub reply_count: Option<u32>,
    #[serde(default)]
    pub occurred_at_utc: Option<Timestamp>,
}

/// Outcome of one listener decision, surfaced verbatim to callers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyNotificationOutcome {
    pub notified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<NotificationJob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<NotificationDispatchResult>,
}

impl ReplyNotificationOutcome {
    fn rejected(reason: impl Into<String>) -> Self {
        Self {
            notified: false,
            reason: Some(reason.into()),
            job: None,
            dispatch: None,
        }
    }
}

/// Decides and performs reply notifications.
///
/// Holds only capabilities: the two store seams and the dispatcher (via
/// the scheduler). No mutable state lives here.
pub struct ReplyNotificationListener {
    settings: Arc<dyn SettingsStore>,
    dispatch_log: Arc<dyn DispatchLogStore>,
    scheduler: NotificationScheduler,
}

impl ReplyNotificationListener {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        dispatch_log: Arc<dyn DispatchLogStore>,
        scheduler: NotificationScheduler,
    ) -> Self {
        Self {
            settings,
            dispatch_log,
            scheduler,
        }
    }

    /// Handle a reply-created event against the current clock.
    pub async fn on_reply_created(
        &self,
        event: &ReplyCreatedEvent,
    ) -> Result<ReplyNotificationOutcome, StoreError> {
        self.handle_at(event, Utc::now()).await
    }

    /// Handle a reply-created event as of `now`.
    ///
    /// The read-then-decide-then-write sequence below is not
    /// transactionally atomic: concurrent events for the same target can
    /// pass the window check before either log row lands, briefly
    /// exceeding the cap under heavy concurrent load.
    pub async fn handle_at(
        &self,
        event: &ReplyCreatedEvent,
        now: Timestamp,
    ) -> Result<ReplyNotificationOutcome, StoreError> {
        let actor = event.actor_user_id.trim();
        let target = event.target_user_id.trim();

        // Malformed input and self-replies indicate caller bugs; they
        // short-circuit before touching the log since there is nothing
        // meaningful to rate-limit or audit.
        if actor.is_empty() || target.is_empty() {
            return Ok(ReplyNotificationOutcome::rejected(
                "actorUserId and targetUserId are required",
            ));
        }
        if actor == target {
            return Ok(ReplyNotificationOutcome::rejected(
                "Self-replies do not trigger notifications",
            ));
        }

        let settings = self.settings.reply_settings(target).await?;
        let (opted_in, stored_timezone, cooldown_minutes) = match settings {
            Some(s) => (s.community_replies, s.timezone, s.cooldown_minutes),
            // Notifications are opt-in: no settings row means no sends.
            None => (false, String::new(), DEFAULT_COOLDOWN_MINUTES),
        };

        if !opted_in {
            let reason = "Target user is not opted in for reply notifications";
            self.record_skip(target, now, reason).await?;
            return Ok(ReplyNotificationOutcome::rejected(reason));
        }

        let type_str = NotificationType::CommunityReplies.as_str();

        if let Some(last_sent_at) = self.dispatch_log.most_recent_sent_at(target, type_str).await?
        {
            if now - last_sent_at < Duration::minutes(cooldown_minutes) {
                let reason = "Cooldown active to prevent notification spam";
                self.record_skip(target, now, reason).await?;
                return Ok(ReplyNotificationOutcome::rejected(reason));
            }
        }

        let window_start = now - Duration::minutes(RATE_WINDOW_MINUTES);
        let sent_in_window = self
            .dispatch_log
            .sent_count_since(target, type_str, window_start)
            .await?;
        if sent_in_window >= MAX_SENT_PER_WINDOW {
            let reason = "Hourly notification limit reached for target user";
            self.record_skip(target, now, reason).await?;
            return Ok(ReplyNotificationOutcome::rejected(reason));
        }

        // Allowed: build exactly one reply job and dispatch it.
        let timezone = if resolve_timezone(&stored_timezone).is_ok() {
            stored_timezone
        } else {
            tracing::warn!(
                user_id = %target,
                timezone = %stored_timezone,
                "Stored timezone is not resolvable, falling back to UTC"
            );
            "UTC".to_string()
        };

        let signal = CommunityReplySignal {
            user_id: target.to_string(),
            reply_count: event.reply_count.unwrap_or(1).max(1),
            latest_reply_at_utc: event.occurred_at_utc,
        };
        let timezone_by_user = HashMap::from([(target.to_string(), timezone)]);
        let jobs = build_community_reply_jobs(&[signal], &timezone_by_user, now);

        let Some(job) = jobs.into_iter().next() else {
            return Ok(ReplyNotificationOutcome::rejected(
                "Unable to build notification job",
            ));
        };

        let mut results = self.scheduler.dispatch_jobs(vec![job.clone()]).await;
        let Some(dispatch) = results.pop() else {
            return Ok(ReplyNotificationOutcome::rejected(
                "Unable to build notification job",
            ));
        };

        let status = if dispatch.delivered {
            DispatchStatus::Sent
        } else {
            DispatchStatus::Failed
        };
        let entry = NewDispatchLogEntry {
            user_id: target.to_string(),
            notification_type: type_str.to_string(),
            status,
            channel: CHANNEL_IN_APP.to_string(),
            scheduled_at_utc: job.scheduled_at_utc,
            dispatched_at_utc: dispatch.dispatched_at_utc,
            dedupe_key: format!("{}:{}:{}", job.job_id, actor, now.timestamp_millis()),
            payload: serde_json::to_value(&job.payload).unwrap_or(serde_json::Value::Null),
            reason: if dispatch.delivered {
                None
            } else {
                Some(dispatch.message.clone())
            },
        };
        self.dispatch_log.record(entry).await?;

        tracing::info!(
            target_user_id = %target,
            actor_user_id = %actor,
            job_id = %job.job_id,
            status = %status,
            "Reply notification decision recorded"
        );

        if dispatch.delivered {
            Ok(ReplyNotificationOutcome {
                notified: true,
                reason: None,
                job: Some(job),
                dispatch: Some(dispatch),
            })
        } else {
            let reason = dispatch.message.clone();
            Ok(ReplyNotificationOutcome {
                notified: false,
                reason: Some(reason),
                job: Some(job),
                dispatch: Some(dispatch),
            })
        }
    }

    /// Record a SKIPPED audit entry for a rejected-but-valid event.
    async fn record_skip(
        &self,
        user_id: &str,
        now: Timestamp,
        reason: &str,
    ) -> Result<(), StoreError> {
        let type_str = NotificationType::CommunityReplies.as_str();
        self.dispatch_log
            .record(NewDispatchLogEntry {
                user_id: user_id.to_string(),
                notification_type: type_str.to_string(),
                status: DispatchStatus::Skipped,
                channel: CHANNEL_IN_APP.to_string(),
                scheduled_at_utc: now,
                dispatched_at_utc: now,
                dedupe_key: format!("{}:{}:skip:{}", type_str, user_id, now.timestamp_millis()),
                payload: serde_json::Value::Object(Default::default()),
                reason: Some(reason.to_string()),
            })
            .await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
