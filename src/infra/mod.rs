//! Infrastructure adapters and runtime bootstrap.

pub mod error;
pub mod output;
pub mod scrapbox;
pub mod telemetry;
