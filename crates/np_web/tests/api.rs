//! HTTP API tests driven through the router with `tower::ServiceExt::oneshot`.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use np_core::{Article, Error, KeyValueStore};
use np_sources::{SourceManager, StaticSource};
use np_storage::MemoryStorage;
use np_web::{create_app, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn article(author: Option<&str>, source: &str, title: &str) -> Article {
    Article {
        title: title.to_string(),
        author: author.map(str::to_string),
        published_at: None,
        source_name: source.to_string(),
        url: format!("https://example.com/{}", title),
    }
}

fn articles() -> Vec<Article> {
    vec![
        article(Some("A"), "Daily", "one"),
        article(Some("A"), "Tech Blog", "two"),
        article(Some("B"), "Daily", "three"),
        article(None, "Wire", "four"),
    ]
}

async fn app_with(source: StaticSource, storage: Arc<dyn KeyValueStore>) -> Router {
    let state = AppState::load(SourceManager::new(Arc::new(source)), storage).await;
    create_app(state)
}

/// Memory storage that refuses to write the rates key.
struct ReadOnlyRates(MemoryStorage);

#[async_trait]
impl KeyValueStore for ReadOnlyRates {
    async fn get(&self, key: &str) -> np_core::Result<Option<String>> {
        self.0.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> np_core::Result<()> {
        if key == "payout_rates" {
            return Err(Error::Storage("disk full".to_string()));
        }
        self.0.set(key, value).await
    }

    async fn remove(&self, key: &str) -> np_core::Result<()> {
        self.0.remove(key).await
    }
}

async fn app() -> Router {
    app_with(StaticSource::new(articles()), Arc::new(MemoryStorage::new())).await
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

async fn login(app: &Router) {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/session",
        Some(json!({"name": "Ann", "email": "ann@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authenticated"], true);
}

async fn search(app: &Router, patch: Value) -> Value {
    let (status, body) = send_json(app, "POST", "/api/dashboard/search", Some(patch)).await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn test_news_proxy_filters_by_author_and_type() {
    let app = app().await;

    let (status, body) = send_json(&app, "GET", "/api/news?author=a&type=blog", None).await;
    assert_eq!(status, StatusCode::OK);
    let articles = body["articles"].as_array().unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0]["title"], "two");
    assert_eq!(articles[0]["sourceName"], "Tech Blog");

    let (_, body) = send_json(&app, "GET", "/api/news?type=all", None).await;
    assert_eq!(body["articles"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_news_proxy_rejects_bad_params() {
    let app = app().await;
    let (status, body) = send_json(&app, "GET", "/api/news?type=video", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, _) = send_json(&app, "GET", "/api/news?pageSize=many", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_news_proxy_upstream_failure_is_empty_with_error() {
    let app = app_with(StaticSource::failing("upstream down"), Arc::new(MemoryStorage::new())).await;
    let (status, body) = send_json(&app, "GET", "/api/news", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["articles"], json!([]));
    assert!(body["error"].as_str().unwrap().contains("upstream down"));
}

#[tokio::test]
async fn test_dashboard_requires_login() {
    let app = app().await;
    for uri in ["/api/dashboard", "/api/payouts", "/api/rates", "/api/analytics/authors", "/api/export/csv"] {
        let (status, _) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
    }
    let (status, body) = send_json(&app, "GET", "/api/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authenticated"], false);
}

#[tokio::test]
async fn test_login_is_persisted_and_logout_clears_it() {
    let storage = Arc::new(MemoryStorage::new());
    let app = app_with(StaticSource::new(articles()), storage.clone()).await;
    login(&app).await;
    assert!(storage.get("user").await.unwrap().is_some());

    // A fresh app over the same storage starts logged in.
    let restarted = app_with(StaticSource::new(articles()), storage.clone()).await;
    let (_, body) = send_json(&restarted, "GET", "/api/session", None).await;
    assert_eq!(body["displayName"], "Ann");

    let (status, body) = send_json(&restarted, "DELETE", "/api/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authenticated"], false);
    assert!(storage.get("user").await.unwrap().is_none());
}

#[tokio::test]
async fn test_login_requires_email() {
    let app = app().await;
    let (status, _) = send_json(&app, "POST", "/api/session", Some(json!({"name": "Ann", "email": " "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_then_payouts() {
    let app = app().await;
    login(&app).await;

    let dashboard = search(&app, json!({"searchQuery": "rust"})).await;
    assert_eq!(dashboard["articles"].as_array().unwrap().len(), 4);
    assert_eq!(dashboard["filters"]["searchQuery"], "rust");
    assert_eq!(dashboard["error"], Value::Null);

    let (status, payouts) = send_json(&app, "GET", "/api/payouts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        payouts.as_array().unwrap().iter().map(|p| p["author"].clone()).collect::<Vec<_>>(),
        vec![json!("A"), json!("B"), json!("Unknown")]
    );
    assert_eq!(payouts[0]["articleCount"], 2);
    assert_eq!(payouts[0]["totalPayout"], 125.0);
    assert_eq!(payouts[0]["articles"][1]["category"], "blog");
    assert_eq!(payouts[1]["totalPayout"], 50.0);

    let (_, counts) = send_json(&app, "GET", "/api/analytics/authors", None).await;
    assert_eq!(counts[0], json!({"author": "A", "count": 2}));
}

#[tokio::test]
async fn test_search_filters_are_merged() {
    let app = app().await;
    login(&app).await;

    search(&app, json!({"author": "a"})).await;
    let dashboard = search(&app, json!({"typeFilter": "news"})).await;
    let articles = dashboard["articles"].as_array().unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0]["title"], "one");
}

#[tokio::test]
async fn test_failed_search_surfaces_error() {
    let app = app_with(StaticSource::failing("quota exceeded"), Arc::new(MemoryStorage::new())).await;
    login(&app).await;

    let dashboard = search(&app, json!({})).await;
    assert_eq!(dashboard["articles"], json!([]));
    assert!(dashboard["error"].as_str().unwrap().contains("quota exceeded"));

    let (status, payouts) = send_json(&app, "GET", "/api/payouts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payouts, json!([]));
}

#[tokio::test]
async fn test_rate_update_changes_only_that_category() {
    let storage = Arc::new(MemoryStorage::new());
    let app = app_with(StaticSource::new(articles()), storage.clone()).await;
    login(&app).await;
    search(&app, json!({})).await;

    let (status, rates) = send_json(&app, "PUT", "/api/rates/news", Some(json!({"rate": 100}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rates, json!([{"category": "news", "rate": 100.0}, {"category": "blog", "rate": 75.0}]));
    assert!(storage.get("payout_rates").await.unwrap().is_some());

    let (_, payouts) = send_json(&app, "GET", "/api/payouts", None).await;
    assert_eq!(payouts[0]["totalPayout"], 175.0);
    assert_eq!(payouts[0]["articles"][1]["payout"], 75.0);

    let restarted = app_with(StaticSource::new(articles()), storage).await;
    let (_, rates) = send_json(&restarted, "GET", "/api/rates", None).await;
    assert_eq!(rates[0]["rate"], 100.0);
}

#[tokio::test]
async fn test_rate_update_validation() {
    let app = app().await;
    login(&app).await;

    let (status, _) = send_json(&app, "PUT", "/api/rates/news", Some(json!({"rate": -1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send_json(&app, "PUT", "/api/rates/video", Some(json!({"rate": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_export_downloads() {
    let app = app().await;
    login(&app).await;

    let (status, csv) = send(&app, "GET", "/api/export/csv", None).await;
    assert_eq!(status, StatusCode::OK);
    let csv = String::from_utf8(csv).unwrap();
    assert_eq!(csv.lines().collect::<Vec<_>>(), vec!["Author,Article Count,Total Payout"]);

    search(&app, json!({})).await;
    let request = Request::builder().uri("/api/export/pdf").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"payout_report.pdf\""
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let (status, body) = send_json(&app, "GET", "/api/export/sheets", None).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["error"]["code"], "NOT_IMPLEMENTED");
}

#[tokio::test]
async fn test_rate_update_keeps_old_rate_when_save_fails() {
    let app = app_with(StaticSource::new(articles()), Arc::new(ReadOnlyRates(MemoryStorage::new()))).await;
    login(&app).await;

    let (status, body) = send_json(&app, "PUT", "/api/rates/news", Some(json!({"rate": 100}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]["message"].as_str().unwrap().contains("disk full"));

    let (status, rates) = send_json(&app, "GET", "/api/rates", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rates, json!([{"category": "news", "rate": 50.0}, {"category": "blog", "rate": 75.0}]));
}

#[tokio::test]
async fn test_rate_update_checks_login_first() {
    let app = app().await;
    let (status, _) = send_json(&app, "PUT", "/api/rates/video", Some(json!({"rate": -1}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, "PUT", "/api/rates/news", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_gets_error_envelope() {
    let app = app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/session")
        .header("content-type", "application/json")
        .body(Body::from("{\"email\":"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    login(&app).await;
    let (status, body) = send_json(&app, "PUT", "/api/rates/news", Some(json!({"rate": "lots"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}
