use std::error::Error as StdError;

use thiserror::Error;

use crate::{
    application::{aggregate::AggregationError, pipeline::PipelineError},
    config::LoadError,
    domain::error::DomainError,
    infra::error::InfraError,
};

/// Flattened error chain, outermost message first.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }

    /// Messages joined as `outer: inner: root`.
    pub fn chain(&self) -> String {
        self.messages.join(": ")
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("failed to load configuration")]
    Config(#[from] LoadError),
    #[error("feed aggregation failed")]
    Aggregation(#[from] AggregationError),
    #[error("artifact generation failed")]
    Pipeline(#[from] PipelineError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::from_error("application::error::AppError", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::source::FetchError;

    #[test]
    fn report_walks_the_source_chain() {
        let error = AppError::from(AggregationError::SubsequentPageFailed {
            skip: 5,
            source: FetchError::HttpStatus(500),
        });
        let report = error.report();
        assert_eq!(report.source, "application::error::AppError");
        assert_eq!(
            report.messages,
            vec![
                "feed aggregation failed".to_string(),
                "page request at skip=5 failed".to_string(),
                "remote responded with HTTP status 500".to_string(),
            ]
        );
        assert_eq!(
            report.chain(),
            "feed aggregation failed: page request at skip=5 failed: remote responded with HTTP status 500"
        );
    }
}
