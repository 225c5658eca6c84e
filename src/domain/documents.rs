//! Remote notes and the windows used to synchronize them.

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::types::{SortKey, WindowSpan};

/// Upper bound the remote listing endpoint accepts for `limit`.
pub const MAX_PAGE_LIMIT: u32 = 1000;

/// One remote note as returned by the listing endpoint.
///
/// Field names on the wire follow the remote (`views`, `linked`, `updated`) so the
/// same shape can be embedded into the page for client-side hydration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub descriptions: Vec<String>,
    #[serde(rename = "views", default)]
    pub view_count: u64,
    #[serde(rename = "linked", default)]
    pub link_count: u64,
    /// UNIX seconds on the remote clock.
    #[serde(rename = "updated")]
    pub updated_at: i64,
}

impl Document {
    pub fn summary(&self) -> Option<&str> {
        self.descriptions.first().map(String::as_str)
    }
}

/// Request parameters for one aggregation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedWindow {
    sort: SortKey,
    skip: u64,
    limit: u32,
    span: WindowSpan,
}

impl FeedWindow {
    pub fn new(sort: SortKey, skip: u64, limit: u32, span: WindowSpan) -> Result<Self, DomainError> {
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(DomainError::validation(format!(
                "page limit must be within 1..={MAX_PAGE_LIMIT}, got {limit}"
            )));
        }
        Ok(Self {
            sort,
            skip,
            limit,
            span,
        })
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    /// Offset of the first requested document. Never reset between pages.
    pub fn skip(&self) -> u64 {
        self.skip
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn span(&self) -> WindowSpan {
        self.span
    }
}

/// One page as reported by the remote, after shape validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    pub source_name: String,
    pub total_count: u64,
    pub skip: u64,
    pub limit: u32,
    pub documents: Vec<Document>,
}

/// Result of one aggregation pass. Built once, then only read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedCollection {
    #[serde(rename = "projectName")]
    pub source_name: String,
    pub skip: u64,
    pub limit: u32,
    /// Total reported by the remote on the first response.
    #[serde(rename = "count")]
    pub total_count: u64,
    #[serde(rename = "pages")]
    pub documents: Vec<Document>,
}

impl FeedCollection {
    pub fn empty(source_name: impl Into<String>, window: &FeedWindow, total_count: u64) -> Self {
        Self {
            source_name: source_name.into(),
            skip: window.skip(),
            limit: window.limit(),
            total_count,
            documents: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }
}
