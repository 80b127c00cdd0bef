//! Feed fetcher tests against a local HTTP server.

mod common;

use std::time::{Duration, Instant};

use common::{StubResponse, StubServer, SAMPLE_RSS};
use gator::config::FetcherConfig;
use gator::{FeedFetcher, FetchFeed, GatorError};

fn fetcher(timeout_ms: u64) -> FeedFetcher {
    FeedFetcher::new(&FetcherConfig {
        request_timeout_ms: timeout_ms,
        ..FetcherConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_fetch_rss_document() {
    let server = StubServer::start(StubResponse::ok(SAMPLE_RSS)).await;

    let doc = fetcher(1000).fetch(&server.url("/rss")).await.unwrap();

    assert_eq!(doc.title, "Test & Feed");
    assert_eq!(doc.entries.len(), 1);
    assert_eq!(doc.entries[0].link, "https://example.com/hello");
    assert_eq!(doc.entries[0].pub_date, "Mon, 02 Jan 2006 15:04:05 -0700");
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn test_fetch_non_success_status() {
    let server = StubServer::start(StubResponse::status(404)).await;

    let err = fetcher(1000).fetch(&server.url("/missing")).await.unwrap_err();
    assert!(matches!(err, GatorError::Fetch(_)));
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_fetch_malformed_body() {
    let server = StubServer::start(StubResponse::ok("<html><body>nope</body></html>")).await;

    let result = fetcher(1000).fetch(&server.url("/rss")).await;
    assert!(matches!(result, Err(GatorError::Fetch(_))));
}

#[tokio::test]
async fn test_fetch_times_out() {
    let server = StubServer::start(
        StubResponse::ok(SAMPLE_RSS).delayed(Duration::from_millis(1500)),
    )
    .await;

    let started = Instant::now();
    let err = fetcher(200).fetch(&server.url("/slow")).await.unwrap_err();

    assert!(matches!(err, GatorError::Fetch(_)));
    assert!(started.elapsed() < Duration::from_millis(1500));
}

#[tokio::test]
async fn test_fetch_rejects_invalid_url() {
    let result = fetcher(1000).fetch("not a url").await;
    assert!(matches!(result, Err(GatorError::Fetch(_))));
}

#[tokio::test]
async fn test_fetch_rejects_oversized_feed() {
    let server = StubServer::start(StubResponse::ok(SAMPLE_RSS)).await;
    let fetcher = FeedFetcher::new(&FetcherConfig {
        max_feed_size_bytes: 16,
        ..FetcherConfig::default()
    })
    .unwrap();

    let err = fetcher.fetch(&server.url("/rss")).await.unwrap_err();
    assert!(err.to_string().contains("too large"));
}
