//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod dispatch_log_repo;
pub mod notification_settings_repo;

pub use dispatch_log_repo::DispatchLogRepo;
pub use notification_settings_repo::NotificationSettingsRepo;
