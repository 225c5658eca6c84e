//! Paginated aggregation of remote documents into one collection.
//!
//! Pages are fetched strictly in sequence with a pacing delay between them. The pass
//! is all-or-nothing: any failure after the first page discards what was gathered.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::source::{FetchError, PageSource};
use crate::domain::documents::{Document, FeedCollection, FeedWindow};
use crate::domain::types::WindowSpan;

/// Delay between successive page requests.
pub const DEFAULT_PACING: Duration = Duration::from_secs(1);

/// Consecutive pages without new documents before the pass is declared stalled.
const STALL_LIMIT: u32 = 2;

#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("first page request failed")]
    FirstPageFailed(#[source] FetchError),
    #[error("page request at skip={skip} failed")]
    SubsequentPageFailed {
        skip: u64,
        #[source]
        source: FetchError,
    },
    #[error("remote stopped returning documents at skip={skip} ({accumulated}/{expected} fetched)")]
    NoProgress {
        skip: u64,
        accumulated: usize,
        expected: u64,
    },
}

/// Loop decision after each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Done,
    Stalled,
}

#[derive(Debug, Clone, Copy)]
struct Progress {
    target: u64,
    page_budget: u64,
    pages_fetched: u64,
    empty_streak: u32,
}

impl Progress {
    fn new(target: u64, limit: u32) -> Self {
        // Enough pages to cover the target plus the stall allowance.
        let page_budget = target.div_ceil(u64::from(limit)) + u64::from(STALL_LIMIT);
        Self {
            target,
            page_budget,
            pages_fetched: 0,
            empty_streak: 0,
        }
    }

    /// Count a fetched page by how many previously unseen documents it added.
    fn record(&mut self, added: usize) {
        self.pages_fetched += 1;
        if added == 0 {
            self.empty_streak += 1;
        } else {
            self.empty_streak = 0;
        }
    }

    fn step(&self, accumulated: usize) -> Step {
        if accumulated as u64 >= self.target {
            Step::Done
        } else if self.empty_streak >= STALL_LIMIT || self.pages_fetched >= self.page_budget {
            Step::Stalled
        } else {
            Step::Continue
        }
    }
}

#[derive(Clone)]
pub struct FeedAggregator {
    source: Arc<dyn PageSource>,
    pacing: Duration,
}

impl FeedAggregator {
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self::with_pacing(source, DEFAULT_PACING)
    }

    pub fn with_pacing(source: Arc<dyn PageSource>, pacing: Duration) -> Self {
        Self { source, pacing }
    }

    /// Run one aggregation pass over `window`.
    pub async fn aggregate(
        &self,
        source_name: &str,
        window: &FeedWindow,
    ) -> Result<FeedCollection, AggregationError> {
        let first = self
            .source
            .fetch_page(source_name, window.sort(), window.skip(), window.limit())
            .await
            .map_err(AggregationError::FirstPageFailed)?;

        let total_count = first.total_count;
        let target = total_count.saturating_sub(window.skip());
        let mut seen = SeenDocuments::default();
        let mut documents = Vec::with_capacity(first.documents.len());
        let added = seen.extend_unique(source_name, window.skip(), &mut documents, first.documents);

        info!(
            target = "application::aggregate",
            source = source_name,
            total_count,
            fetched = documents.len(),
            "fetched first page"
        );

        if window.span() == WindowSpan::FirstPage || target == 0 {
            return Ok(self.finish(source_name, window, total_count, documents));
        }

        let mut progress = Progress::new(target, window.limit());
        progress.record(added);
        let mut skip = window.skip();

        loop {
            match progress.step(documents.len()) {
                Step::Done => break,
                Step::Stalled => {
                    warn!(
                        target = "application::aggregate",
                        source = source_name,
                        skip,
                        accumulated = documents.len(),
                        expected = target,
                        "remote stopped making progress"
                    );
                    return Err(AggregationError::NoProgress {
                        skip,
                        accumulated: documents.len(),
                        expected: target,
                    });
                }
                Step::Continue => {}
            }

            skip += u64::from(window.limit());
            tokio::time::sleep(self.pacing).await;

            let page = self
                .source
                .fetch_page(source_name, window.sort(), skip, window.limit())
                .await
                .map_err(|source| AggregationError::SubsequentPageFailed { skip, source })?;

            let added = seen.extend_unique(source_name, skip, &mut documents, page.documents);
            progress.record(added);

            debug!(
                target = "application::aggregate",
                source = source_name,
                skip,
                accumulated = documents.len(),
                expected = target,
                "fetched page"
            );
        }

        Ok(self.finish(source_name, window, total_count, documents))
    }

    fn finish(
        &self,
        source_name: &str,
        window: &FeedWindow,
        total_count: u64,
        documents: Vec<Document>,
    ) -> FeedCollection {
        metrics::counter!("folio_feed_documents_total").increment(documents.len() as u64);
        let mut collection = FeedCollection::empty(source_name, window, total_count);
        collection.documents = documents;
        info!(
            target = "application::aggregate",
            source = source_name,
            documents = collection.len(),
            total_count,
            "aggregation complete"
        );
        collection
    }
}

/// Ids and titles already collected in this pass.
///
/// The remote list is ordered by a mutable field, so an edit between two requests
/// shifts the window and repeats a document on the next page.
#[derive(Debug, Default)]
struct SeenDocuments {
    ids: HashSet<String>,
    titles: HashSet<String>,
}

impl SeenDocuments {
    /// Append the unseen documents of `page` to `documents`, returning how many were added.
    fn extend_unique(
        &mut self,
        source_name: &str,
        skip: u64,
        documents: &mut Vec<Document>,
        page: Vec<Document>,
    ) -> usize {
        let before = documents.len();
        for document in page {
            if self.ids.contains(&document.id) || self.titles.contains(&document.title) {
                debug!(
                    target = "application::aggregate",
                    source = source_name,
                    skip,
                    id = %document.id,
                    title = %document.title,
                    "dropped repeated document"
                );
                continue;
            }
            self.ids.insert(document.id.clone());
            self.titles.insert(document.title.clone());
            documents.push(document);
        }
        documents.len() - before
    }
}
