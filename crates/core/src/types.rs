/// User identifiers are opaque strings (the identity provider issues UUIDs).
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
