//! Integration tests for the GraphQL batch client.

mod support;

use std::sync::Arc;

use asset_preview::graphql::{ApiError, AssetKind, GraphqlClient};
use asset_preview::session::{CSRF_COOKIE_NAME, SessionContext};
use asset_preview::transport::{HttpClient, RateLimiter, TransportError};
use serde_json::{Value, json};
use support::mock_store::{MockStore, OperationMatcher, TOKEN};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn api(store: &MockStore) -> GraphqlClient {
    let http = HttpClient::new(Arc::new(RateLimiter::disabled())).expect("client should build");
    let session = SessionContext::from_token(TOKEN, CSRF_COOKIE_NAME).expect("token is header-safe");
    GraphqlClient::new(
        http,
        format!("{}/api/graphql/batch", store.base_url()),
        Arc::new(session),
    )
}

#[tokio::test]
async fn test_fetch_catalog_parses_entries() {
    let store = MockStore::start().await;
    store
        .mount_catalog(&[
            ("g1", "Textures/a.png", "file"),
            ("g2", "Textures", "folder"),
            ("g3", "readme.txt", "file"),
        ])
        .await;

    let entries = api(&store).fetch_catalog("123").await.expect("catalog");

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].guid, "g1");
    assert_eq!(entries[0].label, "Textures/a.png");
    assert_eq!(entries[0].kind, AssetKind::File);
    assert_eq!(entries[0].level, Some(1));
    assert_eq!(entries[0].asset_id.as_deref(), Some("asset-g1"));
    assert_eq!(entries[1].kind, AssetKind::Folder);
}

#[tokio::test]
async fn test_fetch_catalog_sends_session_headers_and_single_element_batch() {
    let store = MockStore::start().await;
    Mock::given(method("POST"))
        .and(path("/api/graphql/batch"))
        .and(header("x-requested-with", "XMLHttpRequest"))
        .and(header("x-csrf-token", TOKEN))
        .and(header("cookie", format!("_csrf={TOKEN}").as_str()))
        .and(OperationMatcher("PreviewAssets"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "data": { "product": { "assets": [] } } }])),
        )
        .expect(1)
        .mount(&store.server)
        .await;

    let entries = api(&store).fetch_catalog("123").await.expect("catalog");
    assert!(entries.is_empty());

    let requests = store.server.received_requests().await.unwrap_or_default();
    let body: Value = serde_json::from_slice(&requests[0].body).expect("json body");
    let batch = body.as_array().expect("batch array");
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0]["operationName"], "PreviewAssets");
    assert_eq!(batch[0]["variables"], json!({ "id": "123" }));
    assert!(
        batch[0]["query"]
            .as_str()
            .is_some_and(|q| q.contains("assets"))
    );
}

#[tokio::test]
async fn test_fetch_catalog_tolerates_unknown_entry_type() {
    let store = MockStore::start().await;
    store.mount_catalog(&[("g1", "a.png", "symlink")]).await;

    let entries = api(&store).fetch_catalog("123").await.expect("catalog");
    assert_eq!(entries[0].kind, AssetKind::Other);
}

#[tokio::test]
async fn test_fetch_catalog_missing_product_is_error() {
    let store = MockStore::start().await;
    store
        .mount_catalog_response(
            ResponseTemplate::new(200).set_body_json(json!([{ "data": { "product": null } }])),
        )
        .await;

    let result = api(&store).fetch_catalog("123").await;
    assert!(
        matches!(result, Err(ApiError::MissingField { field: "data.product", .. })),
        "got: {result:?}"
    );
}

#[tokio::test]
async fn test_fetch_catalog_graphql_errors_are_reported() {
    let store = MockStore::start().await;
    store
        .mount_catalog_response(ResponseTemplate::new(200).set_body_json(json!([{
            "data": null,
            "errors": [{ "message": "Product not found" }]
        }])))
        .await;

    let err = api(&store).fetch_catalog("123").await.unwrap_err();
    assert!(matches!(err, ApiError::GraphQl { .. }), "got: {err:?}");
    assert!(err.to_string().contains("Product not found"));
}

#[tokio::test]
async fn test_fetch_catalog_empty_batch() {
    let store = MockStore::start().await;
    store
        .mount_catalog_response(ResponseTemplate::new(200).set_body_json(json!([])))
        .await;

    let result = api(&store).fetch_catalog("123").await;
    assert!(matches!(result, Err(ApiError::EmptyBatch { .. })), "got: {result:?}");
}

#[tokio::test]
async fn test_fetch_catalog_non_json_is_decode_error() {
    let store = MockStore::start().await;
    store
        .mount_catalog_response(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .await;

    let result = api(&store).fetch_catalog("123").await;
    assert!(matches!(result, Err(ApiError::Decode { .. })), "got: {result:?}");
}

#[tokio::test]
async fn test_fetch_catalog_http_error_status() {
    let store = MockStore::start().await;
    store
        .mount_catalog_response(ResponseTemplate::new(403))
        .await;

    let result = api(&store).fetch_catalog("123").await;
    match result {
        Err(ApiError::Transport {
            source: TransportError::HttpStatus { status, .. },
            ..
        }) => assert_eq!(status, 403),
        other => panic!("Expected HttpStatus 403, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_resolve_thumbnail_returns_scheme_relative_url() {
    let store = MockStore::start().await;
    store.mount_thumbnails(&[]).await;

    let thumb = api(&store)
        .resolve_thumbnail("123", "g1")
        .await
        .expect("thumbnail");

    assert_eq!(thumb.product_id, "123");
    assert_eq!(
        thumb.asset_thumbnail,
        format!("//{}/thumbs/g1.png?sig=abc", store.host())
    );
    assert_eq!(
        thumb.absolute_url("http"),
        format!("http://{}/thumbs/g1.png?sig=abc", store.host())
    );

    let requests = store.server.received_requests().await.unwrap_or_default();
    let body: Value = serde_json::from_slice(&requests[0].body).expect("json body");
    assert_eq!(body[0]["variables"], json!({ "id": "123", "guid": "g1" }));
}

#[tokio::test]
async fn test_resolve_thumbnail_missing_is_error() {
    let store = MockStore::start().await;
    store.mount_thumbnails(&["g1"]).await;

    let result = api(&store).resolve_thumbnail("123", "g1").await;
    assert!(
        matches!(
            result,
            Err(ApiError::MissingField {
                field: "data.product.assetThumbnail",
                ..
            })
        ),
        "got: {result:?}"
    );
}
