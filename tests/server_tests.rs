//! HTTP transport tests using `tower::ServiceExt::oneshot` against the
//! real router with an in-memory SQLite store.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use warden::server::handlers::AppState;
use warden::server::routes::build_router;
use warden::server::store::{License, Store};
use warden::server::updates::UpdateManifest;

async fn memory_store() -> Arc<Store> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite connect failed");

    let store = Arc::new(Store::SQLite(pool));
    store.migrate().await.expect("migration failed");
    store
}

fn sample_manifest() -> UpdateManifest {
    serde_json::from_value(json!({
        "version": "1.0.0",
        "build": "20260219.1",
        "download_url": "https://example.com/releases/tool.exe",
        "release_notes": "Initial release",
        "mandatory": false,
        "min_version_required": "1.0.0",
        "files": []
    }))
    .unwrap()
}

/// Router over a store seeded with the worked example: acct1 holds one
/// license for (alice, HW1) expiring tomorrow.
async fn seeded_app(manifest: Option<UpdateManifest>) -> axum::Router {
    let store = memory_store().await;
    store
        .insert_license(
            "acct1",
            &License {
                username: "alice".to_string(),
                hardware_id: "HW1".to_string(),
                expiration: Some(Utc::now().naive_utc() + Duration::days(1)),
            },
        )
        .await
        .unwrap();

    build_router(AppState::new(store, manifest))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn validate_allowed() {
    let app = seeded_app(None).await;

    let response = app
        .oneshot(post_json(
            "/validate",
            json!({"username": "alice", "hardware_id": "HW1", "app_user": "acct1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "allowed");
}

#[tokio::test]
async fn validate_denied_for_wrong_hardware() {
    let app = seeded_app(None).await;

    let response = app
        .oneshot(post_json(
            "/validate",
            json!({"username": "alice", "hardware_id": "HW2", "app_user": "acct1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "denied");
}

#[tokio::test]
async fn validate_expired_license() {
    let store = memory_store().await;
    store
        .insert_license(
            "acct1",
            &License {
                username: "alice".to_string(),
                hardware_id: "HW1".to_string(),
                expiration: Some(Utc::now().naive_utc() - Duration::days(1)),
            },
        )
        .await
        .unwrap();
    let app = build_router(AppState::new(store, None));

    let response = app
        .oneshot(post_json(
            "/validate",
            json!({"username": "alice", "hardware_id": "HW1", "app_user": "acct1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "expired");
}

#[tokio::test]
async fn validate_missing_field_is_bad_request() {
    let app = seeded_app(None).await;

    // app_user omitted entirely; serde defaults it to empty.
    let response = app
        .oneshot(post_json(
            "/validate",
            json!({"username": "alice", "hardware_id": "HW1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "missing username, hardware_id, or app_user");
}

#[tokio::test]
async fn validate_store_failure_is_server_error_class() {
    let store = memory_store().await;
    store.close().await;
    let app = build_router(AppState::new(store, None));

    let response = app
        .oneshot(post_json(
            "/validate",
            json!({"username": "alice", "hardware_id": "HW1", "app_user": "acct1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    // Generic message only; no internal error detail.
    assert_eq!(body["message"], "internal server error");
}

#[tokio::test]
async fn check_update_serves_manifest() {
    let app = seeded_app(Some(sample_manifest())).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/check-update")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["version"], "1.0.0");
    assert_eq!(body["mandatory"], false);
}

#[tokio::test]
async fn check_update_without_manifest_is_not_found() {
    let app = seeded_app(None).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/check-update")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_version_stores_a_release() {
    let app = seeded_app(None).await;

    let response = app
        .oneshot(post_json(
            "/api/update-version",
            json!({
                "version": "1.0.1",
                "build": "20260828.1",
                "download_url": "https://example.com/tool.exe",
                "release_notes": "Bug fixes",
                "mandatory": true
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert!(uuid::Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn update_version_requires_version() {
    let app = seeded_app(None).await;

    let response = app
        .oneshot(post_json("/api/update-version", json!({"mandatory": false})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_store_backend() {
    let app = seeded_app(None).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "warden");
    assert_eq!(body["store"]["backend"], "sqlite");
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = seeded_app(None).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let header = response
        .headers()
        .get("X-Request-Id")
        .expect("missing X-Request-Id header");
    assert!(uuid::Uuid::parse_str(header.to_str().unwrap()).is_ok());
}
