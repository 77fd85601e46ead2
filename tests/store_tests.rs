use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::sqlite::SqlitePoolOptions;

use warden::errors::WardenError;
use warden::server::store::{License, NewRelease, Store};

/// Helper: create an in-memory SQLite store with the schema applied.
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

fn license(username: &str, hardware_id: &str, days_from_now: Option<i64>) -> License {
    License {
        username: username.to_string(),
        hardware_id: hardware_id.to_string(),
        expiration: days_from_now.map(|d| Utc::now().naive_utc() + Duration::days(d)),
    }
}

#[tokio::test]
async fn unknown_account_is_none() {
    let store = memory_store().await;

    let account = store.find_account("acct-missing").await.unwrap();
    assert!(account.is_none());
}

#[tokio::test]
async fn inserted_licenses_come_back_in_stored_order() {
    let store = memory_store().await;

    store
        .insert_license("acct1", &license("alice", "HW1", Some(-1)))
        .await
        .unwrap();
    store
        .insert_license("acct1", &license("alice", "HW1", Some(30)))
        .await
        .unwrap();
    store
        .insert_license("acct1", &license("bob", "HW2", None))
        .await
        .unwrap();

    let account = store.find_account("acct1").await.unwrap().unwrap();
    assert_eq!(account.app_user, "acct1");
    assert_eq!(account.licenses.len(), 3);

    // Row order is insertion order; the duplicate pair keeps the expired
    // row first.
    assert_eq!(account.licenses[0].username, "alice");
    assert!(account.licenses[0].expiration.unwrap() < Utc::now().naive_utc());
    assert!(account.licenses[1].expiration.unwrap() > Utc::now().naive_utc());
    assert_eq!(account.licenses[2].username, "bob");
    assert!(account.licenses[2].expiration.is_none());
}

#[tokio::test]
async fn accounts_are_isolated_from_each_other() {
    let store = memory_store().await;

    store
        .insert_license("acct1", &license("alice", "HW1", Some(30)))
        .await
        .unwrap();
    store
        .insert_license("acct2", &license("carol", "HW9", Some(30)))
        .await
        .unwrap();

    let account = store.find_account("acct1").await.unwrap().unwrap();
    assert_eq!(account.licenses.len(), 1);
    assert_eq!(account.licenses[0].username, "alice");
}

#[tokio::test]
async fn expiration_round_trips_through_storage() {
    let store = memory_store().await;

    let original = license("alice", "HW1", Some(7));
    store.insert_license("acct1", &original).await.unwrap();

    let account = store.find_account("acct1").await.unwrap().unwrap();
    assert_eq!(account.licenses[0], original);
}

#[tokio::test]
async fn release_insert_returns_generated_id() {
    let store = memory_store().await;

    let release = NewRelease {
        version: "1.0.1".to_string(),
        build: Some("20260828.1".to_string()),
        download_url: Some("https://example.com/tool.exe".to_string()),
        release_notes: Some("Bug fixes".to_string()),
        mandatory: false,
    };

    let id = store.insert_release(&release).await.unwrap();
    assert!(uuid::Uuid::parse_str(&id).is_ok());

    // A second insert gets a distinct id.
    let other = store.insert_release(&release).await.unwrap();
    assert_ne!(id, other);
}

#[tokio::test]
async fn closed_pool_surfaces_store_unavailable() {
    let store = memory_store().await;
    store.close().await;

    let result = store.find_account("acct1").await;
    assert!(matches!(result, Err(WardenError::StoreUnavailable(_))));
}

#[tokio::test]
async fn ping_reflects_connectivity() {
    let store = memory_store().await;
    assert!(store.ping().await);

    store.close().await;
    assert!(!store.ping().await);
}
