//! Entity models (one module per table group).

pub mod notification;
