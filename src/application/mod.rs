//! Aggregation, artifact emission and the build pipelines that tie them together.

pub mod aggregate;
pub mod embed;
pub mod error;
pub mod listing;
pub mod pipeline;
pub mod redirects;
pub mod sitemap;
pub mod source;
