//! The delivery seam.
//!
//! [`NotificationDispatcher`] is the single-method boundary between job
//! scheduling and the actual transport. The reference implementation
//! below synthesizes an in-app message; production deployments swap in a
//! push/email/in-app transport behind the same trait.

use async_trait::async_trait;
use chrono::Utc;

use steady_core::scheduling::{NotificationDispatchResult, NotificationJob, NotificationType};

/// Delivers a single notification job.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Attempt delivery of `job`.
    ///
    /// Must not fail: transport problems are reported as
    /// `delivered = false` with an explanatory `message`, so one bad send
    /// never aborts the rest of a batch.
    async fn dispatch(&self, job: &NotificationJob) -> NotificationDispatchResult;
}

/// Reference dispatcher that renders a supportive, type-specific message
/// and always reports successful delivery.
pub struct SupportiveDispatcher;

#[async_trait]
impl NotificationDispatcher for SupportiveDispatcher {
    async fn dispatch(&self, job: &NotificationJob) -> NotificationDispatchResult {
        tracing::debug!(
            job_id = %job.job_id,
            user_id = %job.user_id,
            notification_type = %job.notification_type,
            "Dispatching notification"
        );

        NotificationDispatchResult {
            job_id: job.job_id.clone(),
            user_id: job.user_id.clone(),
            notification_type: job.notification_type,
            dispatched_at_utc: Utc::now(),
            delivered: true,
            message: supportive_message(job.notification_type),
        }
    }
}

/// The user-facing copy for each notification type.
fn supportive_message(notification_type: NotificationType) -> String {
    match notification_type {
        NotificationType::DailyCheckInReminder => {
            "Small progress counts. When you are ready, take a minute for today's check-in."
        }
        NotificationType::WeeklyReflection => {
            "Your weekly reflection is ready. Use it as a light guide for your next steps."
        }
        NotificationType::CommunityReplies => {
            "You have new community replies. Check in when it fits your schedule."
        }
    }
    .to_string()
}
