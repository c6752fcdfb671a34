//! End to end with in-process delivery: producers publish, the channel dispatches
//! to the consumers in this process.

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use helpers::fixtures::{catalog_csv, grocery, png, APPLE_ROW};
use helpers::record_store::AddFaults;
use helpers::{setup_in_process_app, setup_in_process_app_with, TestApp};
use pantry_core::constants::{AUDIT_LOG_COLLECTION, BULK_DATA_COLLECTION, GROCERIES_COLLECTION};
use pantry_worker::InProcessChannelConfig;
use serde_json::json;
use std::time::Duration;

/// Poll until `check` holds, or give up after two seconds.
async fn eventually<F, Fut>(check: F) -> bool
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

async fn count(app: &TestApp, collection: &str) -> usize {
    app.records.count(collection).await
}

#[tokio::test]
async fn bulk_upload_lands_in_the_record_store() {
    let app = setup_in_process_app().await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(catalog_csv(&[APPLE_ROW]).into_bytes())
            .file_name("apple.csv")
            .mime_type("text/csv"),
    );
    app.client()
        .post("/api/BulkCreate")
        .multipart(form)
        .await
        .assert_status(StatusCode::CREATED);

    assert!(eventually(|| async { count(&app, BULK_DATA_COLLECTION).await == 1 }).await);
    let docs = app.records.documents(BULK_DATA_COLLECTION).await;
    assert_eq!(docs[0].data["price"], "1.50");
}

#[tokio::test]
async fn consumer_outliving_the_ack_deadline_finishes_its_batch() {
    let channel_config = InProcessChannelConfig {
        max_retries: 0,
        ack_deadline: Duration::from_millis(50),
        backoff_unit: Duration::from_millis(1),
        ..InProcessChannelConfig::default()
    };
    let faults = AddFaults {
        delay: Duration::from_millis(30),
        ..AddFaults::default()
    };
    let app = setup_in_process_app_with(channel_config, faults).await;

    let batch: Vec<_> = ["Apple", "Banana", "Cherry", "Date", "Elderberry"]
        .iter()
        .map(|name| grocery(name, json!("1.00")))
        .collect();
    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(json!(batch).to_string().into_bytes())
            .file_name("batch.json")
            .mime_type("application/json"),
    );
    app.client()
        .post("/api/BulkCreate")
        .multipart(form)
        .await
        .assert_status(StatusCode::CREATED);

    assert!(eventually(|| async { count(&app, BULK_DATA_COLLECTION).await == 5 }).await);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(count(&app, BULK_DATA_COLLECTION).await, 5);
    assert_eq!(app.pushes.pushes().await.len(), 1);
}

#[tokio::test]
async fn created_grocery_gains_a_thumbnail_and_deletes_are_audited() {
    let app = setup_in_process_app().await;

    let form = MultipartForm::new()
        .add_text("json-data", grocery("Apple", json!("1.50")).to_string())
        .add_part(
            "image",
            Part::bytes(png(300, 300))
                .file_name("apple.png")
                .mime_type("image/png"),
        );
    app.client()
        .post("/api/CreateGrocery")
        .multipart(form)
        .await
        .assert_status(StatusCode::CREATED);

    let has_thumbnail = eventually(|| async {
        app.records
            .documents(GROCERIES_COLLECTION)
            .await
            .first()
            .is_some_and(|doc| doc.data.contains_key("thumbnailURL"))
    })
    .await;
    assert!(has_thumbnail);

    let doc = app.records.documents(GROCERIES_COLLECTION).await.remove(0);
    assert_eq!(doc.data["productname"], "Apple");
    let thumbnail_url = doc.data["thumbnailURL"].as_str().unwrap();
    let thumbnail = image::load_from_memory(&app.staged(thumbnail_url).await).unwrap();
    assert_eq!((thumbnail.width(), thumbnail.height()), (200, 200));

    app.client()
        .delete(&format!("/api/DeleteGrocery?id={}", doc.key))
        .await
        .assert_status_ok();

    assert!(eventually(|| async { count(&app, AUDIT_LOG_COLLECTION).await == 1 }).await);
    let audit = app.records.documents(AUDIT_LOG_COLLECTION).await.remove(0);
    assert_eq!(audit.data["action"], "Delete");
    assert_eq!(audit.data["id"], doc.key.as_str());
}
