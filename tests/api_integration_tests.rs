//! Integration Tests for API Endpoints
//!
//! Drives the full router over an in-memory SQLite store.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use library_cache::{
    api::create_router, config::CacheConfig, store::SqliteStore, AppState, Library,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let library = Library::new(store, &CacheConfig::default()).unwrap();
    create_router(AppState::new(library))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

fn gatsby() -> Value {
    json!({
        "title": "The Great Gatsby",
        "author": "F. Scott Fitzgerald",
        "copies_available": 5,
        "isbn": "9780743273565"
    })
}

fn john() -> Value {
    json!({
        "name": "John Doe",
        "email": "john@example.com",
        "membership_status": "ACTIVE"
    })
}

// == Book Endpoint Tests ==

#[tokio::test]
async fn test_add_and_get_book() {
    let app = create_test_app();

    let (status, created) = post_json(&app, "/books", gatsby()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["id"].as_i64().unwrap() > 0);

    let (status, book) = get_json(&app, "/books/9780743273565").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["title"], "The Great Gatsby");
    assert_eq!(book["copies_available"], 5);
}

#[tokio::test]
async fn test_duplicate_book_conflict() {
    let app = create_test_app();

    post_json(&app, "/books", gatsby()).await;
    let (status, body) = post_json(&app, "/books", gatsby()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("9780743273565"));
}

#[tokio::test]
async fn test_invalid_book_rejected() {
    let app = create_test_app();

    let mut book = gatsby();
    book["copies_available"] = json!(-1);
    let (status, body) = post_json(&app, "/books", book).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn test_search_books() {
    let app = create_test_app();
    post_json(&app, "/books", gatsby()).await;

    let (status, body) = get_json(&app, "/books/search?q=gatsby").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["books"][0]["isbn"], "9780743273565");

    // Second identical search is a cache hit
    get_json(&app, "/books/search?q=GATSBY").await;
    let (_, stats) = get_json(&app, "/stats").await;
    assert_eq!(stats["searches"]["hits"], 1);
    assert_eq!(stats["searches"]["misses"], 1);
}

#[tokio::test]
async fn test_get_missing_book() {
    let app = create_test_app();

    let (status, _) = get_json(&app, "/books/0000000000").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == User Endpoint Tests ==

#[tokio::test]
async fn test_add_and_get_user() {
    let app = create_test_app();

    let (status, _) = post_json(&app, "/users", john()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, user) = get_json(&app, "/users/john@example.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["name"], "John Doe");

    // Served from the cache populated by the insert
    let (_, stats) = get_json(&app, "/stats").await;
    assert_eq!(stats["users"]["hits"], 1);
    assert_eq!(stats["users"]["misses"], 0);
}

// == Loan Endpoint Tests ==

#[tokio::test]
async fn test_borrow_and_return_flow() {
    let app = create_test_app();
    let (_, book) = post_json(&app, "/books", gatsby()).await;
    let (_, user) = post_json(&app, "/users", john()).await;
    let loan = json!({ "user_id": user["id"], "book_id": book["id"] });

    // Warm the search cache
    let (_, before) = get_json(&app, "/books/search?q=gatsby").await;
    assert_eq!(before["books"][0]["copies_available"], 5);

    let (status, borrowed) = post_json(&app, "/loans/borrow", loan.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(borrowed["copies_available"], 4);

    // Both the point lookup and the listing reflect the loan
    let (_, cached) = get_json(&app, "/books/9780743273565").await;
    assert_eq!(cached["copies_available"], 4);
    let (_, after) = get_json(&app, "/books/search?q=gatsby").await;
    assert_eq!(after["books"][0]["copies_available"], 4);

    let (status, returned) = post_json(&app, "/loans/return", loan.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["copies_available"], 5);

    let (status, _) = post_json(&app, "/loans/return", loan).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_borrow_exhausted_book() {
    let app = create_test_app();
    let mut book = gatsby();
    book["copies_available"] = json!(0);
    let (_, book) = post_json(&app, "/books", book).await;
    let (_, user) = post_json(&app, "/users", john()).await;

    let (status, body) = post_json(
        &app,
        "/loans/borrow",
        json!({ "user_id": user["id"], "book_id": book["id"] }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("not available"));
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, json) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
    assert!(json.get("timestamp").is_some());
}
