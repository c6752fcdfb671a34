//! Catalog CRUD routes.

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use helpers::fixtures::{grocery, png};
use helpers::{setup_test_app, TestApp};
use pantry_core::constants::GROCERIES_COLLECTION;
use pantry_db::RecordStore;
use pantry_storage::Storage;
use serde_json::{json, Value};

fn catalog_form(data: &Value, image: Option<Vec<u8>>) -> MultipartForm {
    let form = MultipartForm::new().add_text("json-data", data.to_string());
    match image {
        Some(bytes) => form.add_part(
            "image",
            Part::bytes(bytes).file_name("green apple.png").mime_type("image/png"),
        ),
        None => form,
    }
}

/// Create a grocery through the API and return its stored document.
async fn create(app: &TestApp, name: &str) -> serde_json::Map<String, Value> {
    app.client()
        .post("/api/CreateGrocery")
        .multipart(catalog_form(&grocery(name, json!("1.50")), Some(png(4, 4))))
        .await
        .assert_status(StatusCode::CREATED);

    let docs = app.records.documents(GROCERIES_COLLECTION).await;
    docs.into_iter()
        .map(|doc| doc.data)
        .find(|data| data["productname"] == name)
        .expect("created document")
}

async fn seed(app: &TestApp, id: i64, name: &str, price: f64, category: &str) {
    let mut doc = grocery(name, json!(price)).as_object().cloned().unwrap();
    doc.insert("id".to_string(), json!(id));
    doc.insert("category".to_string(), json!(category));
    app.records
        .set(GROCERIES_COLLECTION, &id.to_string(), doc)
        .await
        .unwrap();
}

#[tokio::test]
async fn create_stores_document_and_requests_thumbnail() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/CreateGrocery")
        .multipart(catalog_form(&grocery("Apple", json!("1.50")), Some(png(4, 4))))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["message"], "File uploaded successfully");
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("memory://pantry/images/"));
    assert!(url.ends_with("_green_apple.png"));

    let docs = app.records.documents(GROCERIES_COLLECTION).await;
    assert_eq!(docs.len(), 1);
    let data = &docs[0].data;
    let id = data["id"].as_i64().unwrap();
    assert_eq!(docs[0].key, id.to_string());
    assert!((0..=999_999).contains(&id));
    assert_eq!(data["price"], json!(1.5));
    assert_eq!(data["itempackagequantity"], json!(6));
    assert_eq!(data["image"], url);

    let pushes = app.pushes.wait_for(1).await;
    assert!(pushes[0].0.ends_with("/api/thumbnail"));
    assert_eq!(pushes[0].1.payload, json!({ "fileURL": url, "ID": id }));
}

#[tokio::test]
async fn create_reports_every_missing_field() {
    let app = setup_test_app().await;
    let mut data = grocery("Apple", json!("1.50"));
    let fields = data.as_object_mut().unwrap();
    fields.remove("price");
    fields.remove("brand");

    let response = app
        .client()
        .post("/api/CreateGrocery")
        .multipart(catalog_form(&data, Some(png(4, 4))))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Fields ['price', 'brand'] are required");
}

#[tokio::test]
async fn create_rejects_bad_forms() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/CreateGrocery")
        .multipart(MultipartForm::new().add_text("other", "x"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "No 'json-data' field provided in the form");

    let response = app
        .client()
        .post("/api/CreateGrocery")
        .multipart(MultipartForm::new().add_text("json-data", "{not json"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Invalid JSON payload");

    let response = app
        .client()
        .post("/api/CreateGrocery")
        .multipart(catalog_form(&grocery("Apple", json!(1)), None))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Image is required");

    let response = app
        .client()
        .post("/api/CreateGrocery")
        .multipart(catalog_form(
            &grocery("Apple", json!(1)),
            Some(b"GIF89a not really".to_vec()),
        ))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.text(),
        "Unsupported file format. Only JPG or PNG files are allowed"
    );

    assert_eq!(app.records.count(GROCERIES_COLLECTION).await, 0);
    assert!(app.pushes.pushes().await.is_empty());
}

#[tokio::test]
async fn create_validates_price_and_quantity() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/CreateGrocery")
        .multipart(catalog_form(&grocery("Apple", json!("-2")), Some(png(4, 4))))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Price should not be a non-negative value");

    let response = app
        .client()
        .post("/api/CreateGrocery")
        .multipart(catalog_form(&grocery("Apple", json!("cheap")), Some(png(4, 4))))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.text(),
        "Price cannot be a character value. Please enter a valid value"
    );

    let mut data = grocery("Apple", json!("2"));
    data["itempackagequantity"] = json!("many");
    let response = app
        .client()
        .post("/api/CreateGrocery")
        .multipart(catalog_form(&data, Some(png(4, 4))))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.text(),
        "ItemPackageQuantity Cannot be Character value, Please Enter Valid value"
    );
}

#[tokio::test]
async fn duplicate_product_name_is_rejected() {
    let app = setup_test_app().await;
    create(&app, "Apple").await;

    let response = app
        .client()
        .post("/api/CreateGrocery")
        .multipart(catalog_form(&grocery("Apple", json!("2.00")), Some(png(4, 4))))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Duplicate product found");
    assert_eq!(app.records.count(GROCERIES_COLLECTION).await, 1);
}

#[tokio::test]
async fn get_by_id_returns_document_or_errors() {
    let app = setup_test_app().await;
    seed(&app, 12, "Apple", 1.5, "Fruit").await;

    let response = app.client().get("/api/GetGroceryByID?id=12").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["productname"], "Apple");

    let response = app.client().get("/api/GetGroceryByID?id=13").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.text(), "Document not found");

    let response = app.client().get("/api/GetGroceryByID?id=abc").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Invalid Grocery ID");

    let response = app.client().get("/api/GetGroceryByID").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Grocery ID is required");
}

#[tokio::test]
async fn update_merges_fields_and_publishes_audit() {
    let app = setup_test_app().await;
    seed(&app, 12, "Apple", 1.5, "Fruit").await;

    let response = app
        .client()
        .patch("/api/UpdateGrocery?id=12")
        .multipart(catalog_form(&json!({ "brand": "Orchard", "price": "2.25" }), None))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Document updated successfully");
    assert_eq!(body["documentID"], "12");

    let doc = app.records.get(GROCERIES_COLLECTION, "12").await.unwrap();
    assert_eq!(doc["brand"], "Orchard");
    assert_eq!(doc["price"], json!(2.25));
    assert_eq!(doc["productname"], "Apple");

    let pushes = app.pushes.wait_for(1).await;
    assert_eq!(pushes.len(), 1);
    assert!(pushes[0].0.ends_with("/api/auditlog"));
    assert_eq!(pushes[0].1.payload["action"], "Update");
    assert_eq!(pushes[0].1.payload["id"], "12");
    assert_eq!(pushes[0].1.payload["product_name"], "Apple");
}

#[tokio::test]
async fn update_with_image_replaces_the_old_object() {
    let app = setup_test_app().await;
    let created = create(&app, "Apple").await;
    let id = created["id"].as_i64().unwrap();
    let old_url = created["image"].as_str().unwrap().to_string();
    let old_key = app.storage.key_from_url(&old_url).unwrap();

    let response = app
        .client()
        .patch(&format!("/api/UpdateGrocery?id={id}"))
        .multipart(catalog_form(&json!({ "brand": "Orchard" }), Some(png(8, 8))))
        .await;
    response.assert_status(StatusCode::CREATED);

    assert!(!app.storage.exists(&old_key).await.unwrap());
    let doc = app
        .records
        .get(GROCERIES_COLLECTION, &id.to_string())
        .await
        .unwrap();
    let new_url = doc["image"].as_str().unwrap();
    assert_ne!(new_url, old_url);
    assert_eq!(app.staged(new_url).await, png(8, 8));

    // create thumbnail, update thumbnail, update audit
    let pushes = app.pushes.wait_for(3).await;
    let thumbnail_urls: Vec<&Value> = pushes
        .iter()
        .filter(|(endpoint, _)| endpoint.ends_with("/api/thumbnail"))
        .map(|(_, message)| &message.payload["fileURL"])
        .collect();
    assert!(thumbnail_urls.contains(&&json!(new_url)));
}

#[tokio::test]
async fn update_of_missing_document_is_not_found() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .patch("/api/UpdateGrocery?id=404")
        .multipart(catalog_form(&json!({ "brand": "Orchard" }), None))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = app
        .client()
        .patch("/api/UpdateGrocery")
        .multipart(catalog_form(&json!({ "brand": "Orchard" }), None))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Grocery ID is required");
}

#[tokio::test]
async fn delete_removes_document_and_image() {
    let app = setup_test_app().await;
    let created = create(&app, "Apple").await;
    let id = created["id"].as_i64().unwrap();
    let image_key = app
        .storage
        .key_from_url(created["image"].as_str().unwrap())
        .unwrap();

    let response = app
        .client()
        .delete(&format!("/api/DeleteGrocery?id={id}"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Document Deleted successfully");
    assert_eq!(body["documentID"], id.to_string());

    assert_eq!(app.records.count(GROCERIES_COLLECTION).await, 0);
    assert!(!app.storage.exists(&image_key).await.unwrap());

    let pushes = app.pushes.wait_for(2).await;
    assert!(pushes.iter().any(|(endpoint, message)| {
        endpoint.ends_with("/api/auditlog") && message.payload["action"] == "Delete"
    }));

    let response = app
        .client()
        .delete(&format!("/api/DeleteGrocery?id={id}"))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = app.client().delete("/api/DeleteGrocery?id=x1").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Invalid document ID");
}

#[tokio::test]
async fn listing_pages_by_id() {
    let app = setup_test_app().await;
    for id in 1..=6 {
        seed(&app, id, &format!("Item{id}"), id as f64, "Fruit").await;
    }

    let response = app.client().get("/api/ViewAllGroceries").await;
    response.assert_status_ok();
    let body: Value = response.json();
    let ids: Vec<i64> = body["groceries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(body["pageTokenParam"], "pageToken");
    let token = body["nextPageToken"].as_str().unwrap().to_string();
    assert_eq!(token, STANDARD.encode("4"));

    let response = app
        .client()
        .get("/api/ViewAllGroceries")
        .add_query_param("pageToken", &token)
        .await;
    let body: Value = response.json();
    let ids: Vec<i64> = body["groceries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![5, 6]);
    assert_eq!(body["nextPageToken"], "");
}

#[tokio::test]
async fn listing_combines_filters() {
    let app = setup_test_app().await;
    seed(&app, 1, "Apple", 1.0, "Fruit").await;
    seed(&app, 2, "Milk", 3.0, "Dairy").await;
    seed(&app, 3, "Cherry", 5.0, "Fruit").await;
    seed(&app, 4, "Mango", 2.5, "Fruit").await;

    let response = app
        .client()
        .get("/api/ViewAllGroceries")
        .add_query_param("priceFilter", "gt:2")
        .add_query_param("category", "Fruit")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let names: Vec<&str> = body["groceries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["productname"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Mango", "Cherry"]);

    let response = app
        .client()
        .get("/api/ViewAllGroceries")
        .add_query_param("productname", "Milk")
        .await;
    let body: Value = response.json();
    assert_eq!(body["groceries"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn listing_rejects_bad_filters_and_tokens() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/api/ViewAllGroceries")
        .add_query_param("priceFilter", "gt")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.text(),
        "Invalid priceFilter format. Use 'gt', 'eq', or 'lt' with a number."
    );

    let response = app
        .client()
        .get("/api/ViewAllGroceries")
        .add_query_param("priceFilter", "gt:two")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Invalid price value provided.");

    let response = app
        .client()
        .get("/api/ViewAllGroceries")
        .add_query_param("priceFilter", "ge:2")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.text(),
        "Invalid priceFilter type. Use 'gt', 'eq', or 'lt'."
    );

    let response = app
        .client()
        .get("/api/ViewAllGroceries")
        .add_query_param("pageToken", "@@not-base64@@")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.text().starts_with("Invalid pageToken provided:"));
}
