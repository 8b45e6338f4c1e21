//! A wiremock stand-in for the asset store: bootstrap page, GraphQL batch
//! endpoint and thumbnail CDN on one server.

use std::collections::HashSet;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, Respond, ResponseTemplate};

/// A 32-character token, as the store issues them.
pub const TOKEN: &str = "0123456789abcdef0123456789abcdef";

pub const CATALOG_OPERATION: &str = "PreviewAssets";
pub const THUMBNAIL_OPERATION: &str = "PreviewAssetThumbnail";

/// Matches batch requests whose first element has the given `operationName`.
pub struct OperationMatcher(pub &'static str);

impl Match for OperationMatcher {
    fn matches(&self, request: &Request) -> bool {
        operation_name(request).as_deref() == Some(self.0)
    }
}

fn first_element(request: &Request) -> Option<Value> {
    let body: Value = serde_json::from_slice(&request.body).ok()?;
    body.as_array()?.first().cloned()
}

fn operation_name(request: &Request) -> Option<String> {
    first_element(request)?
        .get("operationName")?
        .as_str()
        .map(str::to_string)
}

fn variable(request: &Request, name: &str) -> Option<String> {
    first_element(request)?
        .get("variables")?
        .get(name)?
        .as_str()
        .map(str::to_string)
}

/// Answers `PreviewAssetThumbnail` with a scheme-relative URL pointing back
/// at the mock server, or with a null thumbnail for guids in `missing`.
pub struct ThumbnailResponder {
    host: String,
    missing: HashSet<String>,
}

impl Respond for ThumbnailResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let product_id = variable(request, "id").unwrap_or_default();
        let guid = variable(request, "guid").unwrap_or_default();
        let thumbnail = if self.missing.contains(&guid) {
            Value::Null
        } else {
            Value::String(format!("//{}/thumbs/{guid}.png?sig=abc", self.host))
        };
        ResponseTemplate::new(200).set_body_json(json!([
            { "data": { "product": { "id": product_id, "assetThumbnail": thumbnail } } }
        ]))
    }
}

/// One catalog entry: `(guid, label, type)`.
pub type Entry<'a> = (&'a str, &'a str, &'a str);

pub struct MockStore {
    pub server: MockServer,
}

impl MockStore {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    pub fn host(&self) -> String {
        self.server.address().to_string()
    }

    /// `GET /` answering with the anti-forgery cookie.
    pub async fn mount_session(&self) {
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", format!("_csrf={TOKEN}; Path=/; HttpOnly"))
                    .set_body_string("<html></html>"),
            )
            .mount(&self.server)
            .await;
    }

    /// `PreviewAssets` answering with `entries`.
    pub async fn mount_catalog(&self, entries: &[Entry<'_>]) {
        let assets: Vec<Value> = entries
            .iter()
            .map(|(guid, label, kind)| {
                json!({
                    "guid": guid,
                    "assetId": format!("asset-{guid}"),
                    "label": label,
                    "level": 1,
                    "type": kind,
                    "__typename": "PreviewAsset"
                })
            })
            .collect();

        self.mount_catalog_response(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "data": { "product": { "assets": assets } } }])),
        )
        .await;
    }

    pub async fn mount_catalog_response(&self, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/api/graphql/batch"))
            .and(OperationMatcher(CATALOG_OPERATION))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }

    /// `PreviewAssetThumbnail` for every guid, null for those in `missing`.
    pub async fn mount_thumbnails(&self, missing: &[&str]) {
        Mock::given(method("POST"))
            .and(path("/api/graphql/batch"))
            .and(OperationMatcher(THUMBNAIL_OPERATION))
            .respond_with(ThumbnailResponder {
                host: self.host(),
                missing: missing.iter().map(|guid| (*guid).to_string()).collect(),
            })
            .mount(&self.server)
            .await;
    }

    /// `GET /thumbs/<guid>.png` answering with `status` and `body`.
    pub async fn mount_image(&self, guid: &str, status: u16, body: &[u8]) {
        Mock::given(method("GET"))
            .and(path(format!("/thumbs/{guid}.png")))
            .respond_with(ResponseTemplate::new(status).set_body_bytes(body.to_vec()))
            .mount(&self.server)
            .await;
    }

    /// Number of batch requests received for `operation` so far.
    pub async fn operation_count(&self, operation: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| operation_name(request).as_deref() == Some(operation))
            .count()
    }

    /// Number of image GETs received so far.
    pub async fn image_request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path().starts_with("/thumbs/"))
            .count()
    }
}
