//! Steady notification services.
//!
//! This crate provides the delivery side of notification scheduling:
//!
//! - [`NotificationDispatcher`] — the swappable delivery seam, with
//!   [`SupportiveDispatcher`] as the reference implementation.
//! - [`NotificationScheduler`] — ascending-time-ordered, sequential
//!   dispatch of job batches.
//! - [`ReplyNotificationListener`] — the event-gated listener that
//!   decides, per reply-created event, whether to notify the target user
//!   based on opt-in settings and the persisted dispatch log.
//! - [`stores`] — the settings-store and dispatch-log-store seams plus
//!   their PostgreSQL implementations.

pub mod dispatcher;
pub mod listener;
pub mod scheduler;
pub mod stores;

pub use dispatcher::{NotificationDispatcher, SupportiveDispatcher};
pub use listener::{ReplyCreatedEvent, ReplyNotificationListener, ReplyNotificationOutcome};
pub use scheduler::NotificationScheduler;
pub use stores::{
    DispatchLogStore, PgDispatchLogStore, PgSettingsStore, ReplySettings, SettingsStore,
    StoreError,
};
