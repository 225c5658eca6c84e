#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use folio::application::aggregate::FeedAggregator;
use folio::application::source::{FetchError, PageSource};
use folio::domain::documents::{Document, RawPage};
use folio::domain::types::SortKey;

/// Page source that replays scripted responses and records every request.
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<RawPage, FetchError>>>,
    calls: Mutex<Vec<(u64, u32)>>,
}

impl ScriptedSource {
    pub fn new(responses: Vec<Result<RawPage, FetchError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// `(skip, limit)` of every request, in order.
    pub fn calls(&self) -> Vec<(u64, u32)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn fetch_page(
        &self,
        _source_name: &str,
        _sort: SortKey,
        skip: u64,
        limit: u32,
    ) -> Result<RawPage, FetchError> {
        self.calls.lock().expect("calls lock").push((skip, limit));
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::NetworkFailure("script exhausted".to_string())))
    }
}

pub fn aggregator(source: &Arc<ScriptedSource>) -> FeedAggregator {
    FeedAggregator::new(source.clone())
}

pub fn document(index: u64) -> Document {
    Document {
        id: format!("id-{index}"),
        title: format!("Note {index}"),
        descriptions: vec![format!("summary {index}")],
        view_count: index * 10,
        link_count: index,
        updated_at: 1_704_898_200 - (index as i64) * 86_400,
    }
}

/// A page holding documents `start..start + len` of a feed with `total` documents.
pub fn page(total: u64, skip: u64, limit: u32, start: u64, len: u64) -> Result<RawPage, FetchError> {
    Ok(RawPage {
        source_name: "notes".to_string(),
        total_count: total,
        skip,
        limit,
        documents: (start..start + len).map(document).collect(),
    })
}
