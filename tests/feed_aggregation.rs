mod common;

use std::time::Duration;

use folio::application::aggregate::AggregationError;
use folio::application::redirects::redirect_rules;
use folio::application::source::FetchError;
use folio::domain::documents::FeedWindow;
use folio::domain::types::{SortKey, WindowSpan};
use tokio::time::Instant;

use common::{ScriptedSource, aggregator, page};

fn window(skip: u64, limit: u32) -> FeedWindow {
    FeedWindow::new(SortKey::Updated, skip, limit, WindowSpan::All).expect("window")
}

#[tokio::test(start_paused = true)]
async fn first_page_satisfying_the_window_stops_early() {
    let source = ScriptedSource::new(vec![page(7, 3, 5, 3, 4)]);
    let started = Instant::now();

    let collection = aggregator(&source)
        .aggregate("notes", &window(3, 5))
        .await
        .expect("aggregate");

    assert_eq!(collection.len(), 4);
    assert_eq!(collection.total_count, 7);
    assert_eq!(collection.skip, 3);
    assert_eq!(source.calls(), vec![(3, 5)]);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn pages_are_fetched_in_sequence_with_pacing() {
    let source = ScriptedSource::new(vec![
        page(12, 0, 5, 0, 5),
        page(12, 5, 5, 5, 5),
        page(12, 10, 5, 10, 2),
    ]);
    let started = Instant::now();

    let collection = aggregator(&source)
        .aggregate("notes", &window(0, 5))
        .await
        .expect("aggregate");

    assert_eq!(collection.len(), 12);
    assert_eq!(source.calls(), vec![(0, 5), (5, 5), (10, 5)]);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(2), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "{elapsed:?}");

    let titles: Vec<_> = collection.documents.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles.first(), Some(&"Note 0"));
    assert_eq!(titles.last(), Some(&"Note 11"));
}

#[tokio::test(start_paused = true)]
async fn failure_after_first_page_discards_everything() {
    let source = ScriptedSource::new(vec![
        page(12, 0, 5, 0, 5),
        Err(FetchError::HttpStatus(500)),
    ]);

    let err = aggregator(&source)
        .aggregate("notes", &window(0, 5))
        .await
        .expect_err("second page fails");

    match err {
        AggregationError::SubsequentPageFailed { skip, source } => {
            assert_eq!(skip, 5);
            assert!(matches!(source, FetchError::HttpStatus(500)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(source.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn first_page_failure_is_reported_as_such() {
    let source = ScriptedSource::new(vec![Err(FetchError::MalformedBody("eof".to_string()))]);

    let err = aggregator(&source)
        .aggregate("notes", &window(0, 5))
        .await
        .expect_err("first page fails");

    assert!(matches!(
        err,
        AggregationError::FirstPageFailed(FetchError::MalformedBody(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn skip_beyond_total_yields_empty_collection() {
    let source = ScriptedSource::new(vec![page(3, 5, 5, 0, 0)]);

    let collection = aggregator(&source)
        .aggregate("notes", &window(5, 5))
        .await
        .expect("aggregate");

    assert!(collection.is_empty());
    assert_eq!(collection.total_count, 3);
    assert_eq!(source.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn empty_remote_yields_empty_collection() {
    let source = ScriptedSource::new(vec![page(0, 0, 5, 0, 0)]);

    let collection = aggregator(&source)
        .aggregate("notes", &window(0, 5))
        .await
        .expect("aggregate");

    assert!(collection.is_empty());
}

#[tokio::test(start_paused = true)]
async fn remote_without_progress_is_stalled() {
    let source = ScriptedSource::new(vec![
        page(20, 0, 5, 0, 5),
        page(20, 5, 5, 5, 0),
        page(20, 10, 5, 10, 0),
        page(20, 15, 5, 15, 5),
    ]);

    let err = aggregator(&source)
        .aggregate("notes", &window(0, 5))
        .await
        .expect_err("stalled");

    match err {
        AggregationError::NoProgress {
            skip,
            accumulated,
            expected,
        } => {
            assert_eq!(skip, 10);
            assert_eq!(accumulated, 5);
            assert_eq!(expected, 20);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(source.calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn terminal_page_may_overshoot_the_total() {
    let source = ScriptedSource::new(vec![
        page(11, 0, 5, 0, 5),
        page(11, 5, 5, 5, 5),
        page(11, 10, 5, 10, 5),
    ]);

    let collection = aggregator(&source)
        .aggregate("notes", &window(0, 5))
        .await
        .expect("aggregate");

    assert!(collection.len() >= 11);
    assert!(collection.len() < 11 + 5);
}

#[tokio::test(start_paused = true)]
async fn first_page_span_never_paginates() {
    let source = ScriptedSource::new(vec![page(100, 0, 5, 0, 5)]);
    let listing = FeedWindow::new(SortKey::Updated, 0, 5, WindowSpan::FirstPage).expect("window");
    let started = Instant::now();

    let collection = aggregator(&source)
        .aggregate("notes", &listing)
        .await
        .expect("aggregate");

    assert_eq!(collection.len(), 5);
    assert_eq!(collection.total_count, 100);
    assert_eq!(source.calls(), vec![(0, 5)]);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn documents_repeated_across_pages_are_kept_once() {
    // An edit between requests shifts the list, so `Note 4` comes back on page two.
    let source = ScriptedSource::new(vec![
        page(10, 0, 5, 0, 5),
        page(10, 5, 5, 4, 5),
        page(10, 10, 5, 9, 1),
    ]);

    let collection = aggregator(&source)
        .aggregate("notes", &window(0, 5))
        .await
        .expect("aggregate");

    let ids: Vec<_> = collection.documents.iter().map(|d| d.id.clone()).collect();
    let expected: Vec<_> = (0..10).map(|i| format!("id-{i}")).collect();
    assert_eq!(ids, expected);
    assert_eq!(source.calls(), vec![(0, 5), (5, 5), (10, 5)]);

    let rules = redirect_rules("scrapbox", "https://scrapbox.io", "notes", &collection.documents);
    let note_four = rules
        .iter()
        .filter(|rule| rule.starts_with("/scrapbox/Note 4 "))
        .count();
    assert_eq!(note_four, 1);
}
