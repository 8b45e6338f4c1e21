//! Integration tests for the global rate limit across real requests.

mod support;

use std::sync::Arc;
use std::time::{Duration, Instant};

use asset_preview::pipeline::{PipelineConfig, run_pipeline};
use asset_preview::transport::{HttpClient, RateLimiter};
use asset_preview::RunProgress;
use support::mock_store::MockStore;
use tempfile::TempDir;
use tokio::task::JoinSet;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_concurrent_requests_respect_window_ceiling() {
    let store = MockStore::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&store.server)
        .await;

    let limiter = Arc::new(RateLimiter::new(3, Duration::from_millis(300)));
    let client = HttpClient::new(limiter).expect("client should build");
    let url = format!("{}/ping", store.base_url());

    let start = Instant::now();
    let mut tasks = JoinSet::new();
    for _ in 0..9 {
        let client = client.clone();
        let url = url.clone();
        tasks.spawn(async move { client.get(&url).await.map(|r| r.status().as_u16()) });
    }
    while let Some(joined) = tasks.join_next().await {
        assert_eq!(joined.expect("task").expect("request"), 200);
    }

    // Nine requests at three per window need at least two full windows.
    assert!(
        start.elapsed() >= Duration::from_millis(600),
        "finished too fast: {:?}",
        start.elapsed()
    );
}

#[tokio::test]
async fn test_disabled_limiter_does_not_delay() {
    let store = MockStore::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&store.server)
        .await;

    let client = HttpClient::new(Arc::new(RateLimiter::disabled())).expect("client");
    let url = format!("{}/ping", store.base_url());

    for _ in 0..20 {
        client.get(&url).await.expect("request");
    }
    assert_eq!(client.rate_limiter().cumulative_delay(), Duration::ZERO);
}

#[tokio::test]
async fn test_pipeline_shares_one_limit_across_all_request_kinds() {
    let store = MockStore::start().await;
    store.mount_session().await;
    store
        .mount_catalog(&[("g1", "a.png", "file"), ("g2", "b.png", "file")])
        .await;
    store.mount_thumbnails(&[]).await;
    store.mount_image("g1", 200, b"1").await;
    store.mount_image("g2", 200, b"2").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let mut config = PipelineConfig::new("7");
    config.base_url = store.base_url();
    config.output_root = temp_dir.path().to_path_buf();
    config.thumbnail_scheme = "http".to_string();
    config.requests_per_second = 4;

    let start = Instant::now();
    let report = run_pipeline(&config, Arc::new(RunProgress::new()))
        .await
        .expect("run");

    // Six requests (bootstrap, catalog, two thumbnails, two images) at four per second.
    assert_eq!(report.completed(), 2);
    assert!(
        start.elapsed() >= Duration::from_secs(1),
        "finished too fast: {:?}",
        start.elapsed()
    );
}
