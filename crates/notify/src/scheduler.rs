//! Ordered, sequential dispatch of notification job batches.

use std::sync::Arc;

use steady_core::scheduling::{NotificationDispatchResult, NotificationJob};

use crate::dispatcher::{NotificationDispatcher, SupportiveDispatcher};

/// Stateless dispatch front-end holding only the dispatcher capability.
///
/// Cheap to clone; construct one per request or share a single instance
/// for the process lifetime.
#[derive(Clone)]
pub struct NotificationScheduler {
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl NotificationScheduler {
    pub fn new(dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Dispatch a batch of jobs, earliest due first.
    ///
    /// The input is always re-sorted ascending by scheduled instant (job
    /// id as tie-break), each dispatch is awaited sequentially, and the
    /// results come back in that same order. Callers can rely on the
    /// ordering regardless of how the batch was assembled.
    pub async fn dispatch_jobs(
        &self,
        jobs: Vec<NotificationJob>,
    ) -> Vec<NotificationDispatchResult> {
        let mut ordered = jobs;
        ordered.sort_by(|a, b| {
            a.scheduled_at_utc
                .cmp(&b.scheduled_at_utc)
                .then_with(|| a.job_id.cmp(&b.job_id))
        });

        let mut results = Vec::with_capacity(ordered.len());
        for job in &ordered {
            results.push(self.dispatcher.dispatch(job).await);
        }
        results
    }
}

impl Default for NotificationScheduler {
    fn default() -> Self {
        Self::new(Arc::new(SupportiveDispatcher))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use steady_core::scheduling::{job_id, JobPayload, NotificationType};

    /// Test dispatcher that reports delivery in call order.
    struct RecordingDispatcher;

    #[async_trait]
    impl NotificationDispatcher for RecordingDispatcher {
        async fn dispatch(&self, job: &NotificationJob) -> NotificationDispatchResult {
            NotificationDispatchResult {
                job_id: job.job_id.clone(),
                user_id: job.user_id.clone(),
                notification_type: job.notification_type,
                dispatched_at_utc: Utc::now(),
                delivered: true,
                message: String::new(),
            }
        }
    }

    fn job_at(hours_from_base: i64) -> NotificationJob {
        let at = Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap()
            + Duration::hours(hours_from_base);
        NotificationJob {
            job_id: job_id(NotificationType::DailyCheckInReminder, "user-1", at),
            user_id: "user-1".to_string(),
            notification_type: NotificationType::DailyCheckInReminder,
            scheduled_at_utc: at,
            timezone: "UTC".to_string(),
            payload: JobPayload::DailyCheckIn {
                supportive_tone: true,
            },
        }
    }

    #[tokio::test]
    async fn results_are_ordered_by_scheduled_instant() {
        let scheduler = NotificationScheduler::new(Arc::new(RecordingDispatcher));

        // Deliberately shuffled input.
        let jobs = vec![job_at(5), job_at(1), job_at(3), job_at(0)];
        let results = scheduler.dispatch_jobs(jobs).await;

        assert_eq!(results.len(), 4);
        let expected: Vec<String> = [0, 1, 3, 5]
            .iter()
            .map(|h| job_at(*h).job_id)
            .collect();
        let actual: Vec<String> = results.iter().map(|r| r.job_id.clone()).collect();
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn empty_batch_yields_no_results() {
        let scheduler = NotificationScheduler::default();
        let results = scheduler.dispatch_jobs(Vec::new()).await;
        assert!(results.is_empty());
    }
}
