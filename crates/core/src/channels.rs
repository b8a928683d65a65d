//! Well-known notification channel name constants.
//!
//! These must match the channel values stored in the
//! `notification_dispatch_log.channel` column and referenced by the
//! dispatcher, the reply listener, and the API handlers.

/// In-app notification surfaced inside the mobile and web clients.
pub const CHANNEL_IN_APP: &str = "in_app";

/// Mobile push notification delivered through a push gateway.
pub const CHANNEL_PUSH: &str = "push";

/// Email notification delivered via SMTP.
pub const CHANNEL_EMAIL: &str = "email";
