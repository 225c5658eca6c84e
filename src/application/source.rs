//! Source trait describing the remote page listing adapter.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::documents::RawPage;
use crate::domain::types::SortKey;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("remote responded with HTTP status {0}")]
    HttpStatus(u16),
    #[error("response body is not valid JSON: {0}")]
    MalformedBody(String),
    #[error("response does not match the expected schema: {0}")]
    InvalidSchema(String),
    #[error("network failure: {0}")]
    NetworkFailure(String),
}

impl FetchError {
    pub fn invalid_schema(reason: impl Into<String>) -> Self {
        Self::InvalidSchema(reason.into())
    }

    pub fn network(err: impl std::fmt::Display) -> Self {
        Self::NetworkFailure(err.to_string())
    }
}

/// Fetches one page of remote documents. Implementations never retry.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(
        &self,
        source_name: &str,
        sort: SortKey,
        skip: u64,
        limit: u32,
    ) -> Result<RawPage, FetchError>;
}
