use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use super::{UnreachableStore, attributes, make_bookmarks_array};
use crate::config::AuthConfig;
use crate::logging::TRACE_ID_HEADER;
use crate::schema::NewBookmark;
use crate::server::{AppState, create_router};
use crate::services::{BookmarkStore, InMemoryBookmarkStore};

const API_TOKEN: &str = "test-api-token";

struct TestApp {
    store: Arc<InMemoryBookmarkStore>,
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(InMemoryBookmarkStore::new());
        let router = create_router(AppState::new(store.clone(), AuthConfig::new(API_TOKEN)));
        Self { store, router }
    }

    async fn seeded() -> Self {
        let app = Self::new();
        app.store.insert_many(make_bookmarks_array()).await.unwrap();
        app
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(uri, Some(&format!("Bearer {API_TOKEN}"))).await
    }

    async fn send(&self, uri: &str, authorization: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().uri(uri);
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }
        let response = self
            .router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }
}

fn fixture_json() -> Value {
    serde_json::to_value(make_bookmarks_array()).unwrap()
}

fn not_found_body() -> Value {
    json!({ "error": { "message": "Bookmark doesn't exist" } })
}

#[tokio::test]
async fn test_list_empty_store_returns_empty_array() {
    let app = TestApp::new();

    let (status, body) = app.get("/bookmarks").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_list_returns_all_bookmarks_in_order() {
    let app = TestApp::seeded().await;

    let (status, body) = app.get("/bookmarks").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, fixture_json());
}

#[tokio::test]
async fn test_list_follows_insertion_order_not_ids() {
    let app = TestApp::new();
    app.store
        .insert_many(vec![
            NewBookmark::new(attributes(json!({"title": "late"}))).with_id(9),
            NewBookmark::new(attributes(json!({"title": "early"}))).with_id(2),
        ])
        .await
        .unwrap();

    let (_, body) = app.get("/bookmarks").await;

    assert_eq!(body, json!([{"id": 9, "title": "late"}, {"id": 2, "title": "early"}]));
}

#[tokio::test]
async fn test_get_missing_bookmark_on_empty_store() {
    let app = TestApp::new();

    let (status, body) = app.get("/bookmarks/123456").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, not_found_body());
}

#[tokio::test]
async fn test_get_returns_the_matching_bookmark() {
    let app = TestApp::seeded().await;

    let (status, body) = app.get("/bookmarks/2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, fixture_json()[1]);
}

#[tokio::test]
async fn test_get_out_of_range_or_malformed_ids_are_not_found() {
    let app = TestApp::seeded().await;

    for uri in ["/bookmarks/5", "/bookmarks/0", "/bookmarks/-2", "/bookmarks/two"] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body, not_found_body(), "{uri}");
    }
}

#[tokio::test]
async fn test_reads_are_idempotent() {
    let app = TestApp::seeded().await;

    let first_list = app.get("/bookmarks").await;
    let second_list = app.get("/bookmarks").await;
    assert_eq!(first_list, second_list);

    let first_get = app.get("/bookmarks/3").await;
    let second_get = app.get("/bookmarks/3").await;
    assert_eq!(first_get, second_get);
}

#[tokio::test]
async fn test_truncate_between_cases_empties_the_collection() {
    let app = TestApp::seeded().await;
    app.store.truncate().await.unwrap();

    assert_eq!(app.get("/bookmarks").await, (StatusCode::OK, json!([])));
    assert_eq!(app.get("/bookmarks/1").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bookmark_routes_require_bearer_token() {
    let app = TestApp::seeded().await;
    let unauthorized = json!({ "error": { "message": "Unauthorized request" } });

    for authorization in [None, Some("Bearer wrong-token"), Some(API_TOKEN)] {
        for uri in ["/bookmarks", "/bookmarks/1"] {
            let (status, body) = app.send(uri, authorization).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri} with {authorization:?}");
            assert_eq!(body, unauthorized);
        }
    }
}

#[tokio::test]
async fn test_health_routes_are_open() {
    let app = TestApp::new();

    let (status, body) = app.send("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("OK"));

    let (status, body) = app.send("/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["services"]["database"]["status"], "healthy");
}

#[tokio::test]
async fn test_responses_carry_trace_id() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/bookmarks/1")
                .header(header::AUTHORIZATION, format!("Bearer {API_TOKEN}"))
                .header(TRACE_ID_HEADER, "trace-abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[TRACE_ID_HEADER], "trace-abc");
}

#[tokio::test]
async fn test_store_outage_maps_to_service_unavailable() {
    let router = create_router(AppState::new(
        Arc::new(UnreachableStore),
        AuthConfig::new(API_TOKEN),
    ));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/bookmarks/1")
                .header(header::AUTHORIZATION, format!("Bearer {API_TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
