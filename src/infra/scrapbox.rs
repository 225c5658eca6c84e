//! HTTP adapter for the Scrapbox page listing API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url, header};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::application::source::{FetchError, PageSource};
use crate::domain::documents::{Document, RawPage};
use crate::domain::types::SortKey;

use super::error::InfraError;

const ERROR_BODY_PREVIEW_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct ScrapboxSource {
    client: Client,
    api_base: Url,
}

impl ScrapboxSource {
    pub fn new(api_base: Url, timeout: Duration) -> Result<Self, InfraError> {
        if api_base.cannot_be_a_base() {
            return Err(InfraError::configuration(format!(
                "`{api_base}` cannot be used as an endpoint base"
            )));
        }
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()
            .map_err(|err| InfraError::http(err.to_string()))?;
        Ok(Self { client, api_base })
    }

    pub fn user_agent() -> &'static str {
        concat!("folio/", env!("CARGO_PKG_VERSION"))
    }

    /// `<base>/<source>?sort=..&skip=..&limit=..`
    pub fn page_url(&self, source_name: &str, sort: SortKey, skip: u64, limit: u32) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(source_name);
        }
        url.set_query(None);
        url.query_pairs_mut()
            .append_pair("sort", sort.as_str())
            .append_pair("skip", &skip.to_string())
            .append_pair("limit", &limit.to_string());
        url
    }
}

#[async_trait]
impl PageSource for ScrapboxSource {
    async fn fetch_page(
        &self,
        source_name: &str,
        sort: SortKey,
        skip: u64,
        limit: u32,
    ) -> Result<RawPage, FetchError> {
        let url = self.page_url(source_name, sort, skip, limit);
        debug!(
            target = "infra::scrapbox",
            url = %url,
            "requesting page"
        );

        let started = Instant::now();
        let result = request(&self.client, url, skip, limit).await;
        metrics::histogram!("folio_remote_request_ms")
            .record(started.elapsed().as_secs_f64() * 1_000.0);
        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!("folio_remote_requests_total", "outcome" => outcome).increment(1);

        result
    }
}

async fn request(client: &Client, url: Url, skip: u64, limit: u32) -> Result<RawPage, FetchError> {
    let response = client
        .get(url)
        .header(header::ACCEPT, "application/json")
        .send()
        .await
        .map_err(FetchError::network)?;

    let status = response.status();
    let body = response.text().await.map_err(FetchError::network)?;

    if !status.is_success() {
        log_error_body(status, &body);
        return Err(FetchError::HttpStatus(status.as_u16()));
    }

    parse_page(&body, skip, limit)
}

fn log_error_body(status: StatusCode, body: &str) {
    let preview: String = body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect();
    warn!(
        target = "infra::scrapbox",
        status = status.as_u16(),
        body = %preview,
        "remote returned an error status"
    );
}

/// Validate the listing response shape and decode it.
///
/// `skip` and `limit` fall back to the requested values when the remote omits them.
pub fn parse_page(body: &str, skip: u64, limit: u32) -> Result<RawPage, FetchError> {
    let value: Value =
        serde_json::from_str(body).map_err(|err| FetchError::MalformedBody(err.to_string()))?;

    let Value::Object(mut object) = value else {
        return Err(FetchError::invalid_schema("response is not an object"));
    };

    let source_name = match object.get("projectName") {
        Some(Value::String(name)) if !name.trim().is_empty() => name.clone(),
        Some(Value::String(_)) => {
            return Err(FetchError::invalid_schema("`projectName` is empty"));
        }
        Some(_) => {
            return Err(FetchError::invalid_schema("`projectName` is not a string"));
        }
        None => return Err(FetchError::invalid_schema("`projectName` is missing")),
    };

    let pages = match object.remove("pages") {
        Some(Value::Array(pages)) => pages,
        Some(_) => return Err(FetchError::invalid_schema("`pages` is not an array")),
        None => return Err(FetchError::invalid_schema("`pages` is missing")),
    };

    let total_count = object
        .get("count")
        .and_then(Value::as_u64)
        .ok_or_else(|| FetchError::invalid_schema("`count` is missing or not a count"))?;

    let documents = pages
        .into_iter()
        .enumerate()
        .map(|(index, page)| {
            serde_json::from_value::<Document>(page)
                .map_err(|err| FetchError::invalid_schema(format!("pages[{index}]: {err}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RawPage {
        source_name,
        total_count,
        skip: number_or(&object, "skip", skip),
        limit: number_or(&object, "limit", u64::from(limit))
            .try_into()
            .unwrap_or(limit),
        documents,
    })
}

fn number_or(object: &Map<String, Value>, key: &str, fallback: u64) -> u64 {
    object.get(key).and_then(Value::as_u64).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(base: &str) -> ScrapboxSource {
        ScrapboxSource::new(Url::parse(base).expect("url"), Duration::from_secs(5)).expect("source")
    }

    #[test]
    fn page_url_interpolates_source_and_query() {
        let url = source("https://scrapbox.io/api/pages").page_url("my notes", SortKey::UpdatedByMe, 10, 5);
        assert_eq!(
            url.as_str(),
            "https://scrapbox.io/api/pages/my%20notes?sort=updatedbyMe&skip=10&limit=5"
        );
    }

    #[test]
    fn page_url_tolerates_trailing_slash() {
        let url = source("https://scrapbox.io/api/pages/").page_url("notes", SortKey::Updated, 0, 1);
        assert_eq!(
            url.as_str(),
            "https://scrapbox.io/api/pages/notes?sort=updated&skip=0&limit=1"
        );
    }

    #[test]
    fn parse_page_decodes_documents_with_defaults() {
        let body = r#"{
            "projectName": "notes", "skip": 0, "limit": 2, "count": 9,
            "pages": [
                {"id": "a", "title": "A", "descriptions": ["x"], "views": 3, "linked": 1, "updated": 100},
                {"id": "b", "title": "B", "updated": 200, "pin": 0}
            ]
        }"#;
        let page = parse_page(body, 0, 2).expect("page");
        assert_eq!(page.source_name, "notes");
        assert_eq!(page.total_count, 9);
        assert_eq!(page.documents.len(), 2);
        assert_eq!(page.documents[1].view_count, 0);
        assert!(page.documents[1].descriptions.is_empty());
    }

    #[test]
    fn parse_page_rejects_non_json() {
        assert!(matches!(
            parse_page("<html>", 0, 5),
            Err(FetchError::MalformedBody(_))
        ));
    }

    #[test]
    fn parse_page_checks_shape_in_order() {
        let cases = [
            ("[]", "not an object"),
            (r#"{"pages": []}"#, "`projectName` is missing"),
            (r#"{"projectName": "", "pages": []}"#, "`projectName` is empty"),
            (r#"{"projectName": "n", "pages": {}}"#, "`pages` is not an array"),
            (r#"{"projectName": "n", "pages": []}"#, "`count`"),
            (
                r#"{"projectName": "n", "count": 1, "pages": [{"id": "a"}]}"#,
                "pages[0]",
            ),
        ];
        for (body, expected) in cases {
            match parse_page(body, 0, 5) {
                Err(FetchError::InvalidSchema(reason)) => {
                    assert!(reason.contains(expected), "{body}: {reason}");
                }
                other => panic!("{body}: unexpected {other:?}"),
            }
        }
    }
}
