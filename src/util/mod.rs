//! Small shared helpers that do not belong to a single layer.

pub mod encoding;
pub mod locale;
pub mod relative_time;
pub mod timezone;
