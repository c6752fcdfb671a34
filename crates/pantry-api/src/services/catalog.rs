//! Single-item catalog operations over the `Groceries` collection.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use pantry_core::constants::{
    CATALOG_PAGE_SIZE, GROCERIES_COLLECTION, MAX_CATALOG_ID, REQUIRED_FIELDS,
    THUMBNAIL_CONSUMER_PATH,
};
use pantry_core::{AppError, AuditAction, FieldMap, NotificationEvent};
use pantry_db::{DbError, FilterOp, RecordQuery};
use pantry_processing::{
    detect_image_type, field_as_text, validate_item_package_quantity, validate_price,
};
use pantry_storage::keys::image_key;
use rand::Rng;
use serde::Serialize;
use serde_json::{json, Number, Value};

use crate::error::{channel_error, db_error, field_error, storage_error};
use crate::services::audit::publish_audit;
use crate::state::AppState;

const ID_ALLOCATION_ATTEMPTS: usize = 32;

/// An image part from a catalog form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub data: Vec<u8>,
}

/// The multipart form used by create and update.
#[derive(Debug, Clone, Default)]
pub struct CatalogForm {
    /// Raw `json-data` field.
    pub json_data: Option<String>,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone)]
pub struct CreatedGrocery {
    pub id: i64,
    pub image_url: String,
}

/// Filters accepted by the listing endpoint, straight from the query string.
#[derive(Debug, Clone, Default)]
pub struct ListFilters {
    pub page_token: Option<String>,
    pub productname: Option<String>,
    pub category: Option<String>,
    pub price_filter: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroceryPage {
    pub groceries: Vec<FieldMap>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: String,
    #[serde(rename = "pageTokenParam")]
    pub page_token_param: &'static str,
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError::BadRequest(message.into())
}

fn parse_form_data(form: &CatalogForm) -> Result<FieldMap, AppError> {
    let raw = form
        .json_data
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| bad_request("No 'json-data' field provided in the form"))?;
    serde_json::from_str::<FieldMap>(raw).map_err(|e| {
        tracing::debug!(error = %e, "json-data is not a JSON object");
        bad_request("Invalid JSON payload")
    })
}

/// Validate and rewrite `price` and `itempackagequantity` as numbers when present.
fn normalize_numeric_fields(data: &mut FieldMap) -> Result<(), AppError> {
    if let Some(raw) = data.get("price") {
        let price = validate_price(&field_as_text(raw)).map_err(field_error)?;
        let number = Number::from_f64(price)
            .ok_or_else(|| field_error(pantry_processing::FieldValidationError::NonNumericPrice))?;
        data.insert("price".to_string(), Value::Number(number));
    }
    if let Some(raw) = data.get("itempackagequantity") {
        let quantity = validate_item_package_quantity(&field_as_text(raw)).map_err(field_error)?;
        data.insert("itempackagequantity".to_string(), json!(quantity));
    }
    Ok(())
}

fn parse_catalog_id(raw: Option<&str>, missing: &str, invalid: &str) -> Result<i64, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| bad_request(missing))?;
    raw.parse::<i64>().map_err(|_| bad_request(invalid))
}

fn product_name_of(data: &FieldMap) -> Result<String, AppError> {
    data.get("productname")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AppError::Internal("Product name not found in existing data".to_string()))
}

fn random_catalog_id() -> i64 {
    rand::rng().random_range(0..=MAX_CATALOG_ID)
}

/// Draw random ids until one is unused.
async fn allocate_catalog_id(state: &AppState) -> Result<i64, AppError> {
    for _ in 0..ID_ALLOCATION_ATTEMPTS {
        let id = random_catalog_id();
        match state.records.get(GROCERIES_COLLECTION, &id.to_string()).await {
            Err(DbError::NotFound { .. }) => return Ok(id),
            Ok(_) => tracing::debug!(doc_id = id, "Catalog id already taken, drawing again"),
            Err(e) => return Err(db_error(e)),
        }
    }
    Err(AppError::Internal(
        "Failed to allocate a free catalog id".to_string(),
    ))
}

async fn product_name_exists(state: &AppState, product_name: &str) -> Result<bool, AppError> {
    let query = RecordQuery::new()
        .filter("productname", FilterOp::Eq, json!(product_name))
        .limit(1);
    let page = state
        .records
        .query(GROCERIES_COLLECTION, &query)
        .await
        .map_err(db_error)?;
    Ok(!page.documents.is_empty())
}

/// Check the sniffed type and stage an item image with public read. Returns its URL.
async fn stage_image(state: &AppState, image: ImageUpload) -> Result<String, AppError> {
    let kind = detect_image_type(&image.data).ok_or_else(|| {
        bad_request("Unsupported file format. Only JPG or PNG files are allowed")
    })?;

    let key = image_key(&image.filename, Utc::now());
    let url = state
        .storage
        .put(&key, image.data, kind.mime_type())
        .await
        .map_err(storage_error)?;
    state
        .storage
        .set_public_read(&key)
        .await
        .map_err(storage_error)?;
    tracing::info!(key = %key, url = %url, "Item image staged");
    Ok(url)
}

async fn delete_image_by_url(state: &AppState, url: &str) -> Result<(), AppError> {
    match state.storage.key_from_url(url) {
        Some(key) => {
            state.storage.delete(&key).await.map_err(storage_error)?;
            tracing::info!(key = %key, "Item image deleted");
        }
        None => tracing::warn!(url = %url, "Image URL is not owned by this store, leaving it"),
    }
    Ok(())
}

async fn request_thumbnail(state: &AppState, image_url: &str, id: i64) -> Result<(), AppError> {
    let event = NotificationEvent::thumbnail_requested(
        image_url,
        id,
        state.config.push_endpoint(THUMBNAIL_CONSUMER_PATH),
    );
    state
        .channel
        .publish_event(&event)
        .await
        .map_err(channel_error)?;
    Ok(())
}

/// Create a catalog item from the form and request its thumbnail.
#[tracing::instrument(skip(state, form))]
pub async fn create_grocery(state: &AppState, form: CatalogForm) -> Result<CreatedGrocery, AppError> {
    let mut data = parse_form_data(&form)?;

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !data.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(bad_request(format!(
            "Fields ['{}'] are required",
            missing.join("', '")
        )));
    }

    let product_name = data
        .get("productname")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| bad_request("Invalid type for product name"))?;

    if product_name_exists(state, &product_name).await? {
        tracing::info!(product_name = %product_name, "Duplicate product found");
        return Err(bad_request("Duplicate product found"));
    }

    normalize_numeric_fields(&mut data)?;

    let image = form
        .image
        .ok_or_else(|| bad_request("Image is required"))?;

    let id = allocate_catalog_id(state).await?;
    let image_url = stage_image(state, image).await?;

    data.insert("id".to_string(), json!(id));
    data.insert("image".to_string(), Value::String(image_url.clone()));
    state
        .records
        .set(GROCERIES_COLLECTION, &id.to_string(), data)
        .await
        .map_err(db_error)?;
    tracing::info!(doc_id = id, product_name = %product_name, "Grocery created");

    request_thumbnail(state, &image_url, id).await?;

    Ok(CreatedGrocery { id, image_url })
}

/// Merge the form into an existing item. A new image replaces the old object.
#[tracing::instrument(skip(state, form))]
pub async fn update_grocery(
    state: &AppState,
    id: Option<&str>,
    form: CatalogForm,
) -> Result<String, AppError> {
    let document_id = id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| bad_request("Grocery ID is required"))?
        .to_string();

    let mut updates = parse_form_data(&form)?;
    normalize_numeric_fields(&mut updates)?;

    let mut existing = state
        .records
        .get(GROCERIES_COLLECTION, &document_id)
        .await
        .map_err(db_error)?;
    let product_name = product_name_of(&existing)?;

    let mut new_image = None;
    if let Some(image) = form.image {
        let numeric_id = document_id
            .parse::<i64>()
            .map_err(|_| bad_request("Invalid document ID"))?;
        if detect_image_type(&image.data).is_none() {
            return Err(bad_request(
                "Unsupported file format. Only JPG or PNG files are allowed",
            ));
        }

        if let Some(old_url) = existing.get("image").and_then(Value::as_str) {
            delete_image_by_url(state, old_url).await?;
        }

        let url = stage_image(state, image).await?;
        existing.insert("image".to_string(), Value::String(url.clone()));
        new_image = Some((url, numeric_id));
    }

    for (field, value) in updates {
        existing.insert(field, value);
    }

    state
        .records
        .set(GROCERIES_COLLECTION, &document_id, existing)
        .await
        .map_err(db_error)?;
    tracing::info!(doc_id = %document_id, "Grocery updated");

    if let Some((url, numeric_id)) = new_image {
        request_thumbnail(state, &url, numeric_id).await?;
    }

    publish_audit(state, AuditAction::Update, &document_id, &product_name).await?;

    Ok(document_id)
}

/// Remove an item and its image.
#[tracing::instrument(skip(state))]
pub async fn delete_grocery(state: &AppState, id: Option<&str>) -> Result<i64, AppError> {
    let id = parse_catalog_id(id, "Document ID is required", "Invalid document ID")?;
    let key = id.to_string();

    let existing = state
        .records
        .get(GROCERIES_COLLECTION, &key)
        .await
        .map_err(db_error)?;
    let product_name = product_name_of(&existing)?;

    state
        .records
        .delete(GROCERIES_COLLECTION, &key)
        .await
        .map_err(db_error)?;

    if let Some(url) = existing.get("image").and_then(Value::as_str) {
        delete_image_by_url(state, url).await?;
    }
    tracing::info!(doc_id = id, "Grocery deleted");

    publish_audit(state, AuditAction::Delete, &key, &product_name).await?;

    Ok(id)
}

pub async fn get_grocery(state: &AppState, id: Option<&str>) -> Result<FieldMap, AppError> {
    let id = parse_catalog_id(id, "Grocery ID is required", "Invalid Grocery ID")?;
    state
        .records
        .get(GROCERIES_COLLECTION, &id.to_string())
        .await
        .map_err(db_error)
}

fn parse_price_filter(raw: &str) -> Result<(FilterOp, i64), AppError> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [op, value] = parts.as_slice() else {
        return Err(bad_request(
            "Invalid priceFilter format. Use 'gt', 'eq', or 'lt' with a number.",
        ));
    };
    let value = value
        .parse::<i64>()
        .map_err(|_| bad_request("Invalid price value provided."))?;
    let op = match *op {
        "gt" => FilterOp::Gt,
        "eq" => FilterOp::Eq,
        "lt" => FilterOp::Lt,
        _ => return Err(bad_request("Invalid priceFilter type. Use 'gt', 'eq', or 'lt'.")),
    };
    Ok((op, value))
}

fn decode_page_token(token: &str) -> Result<Value, AppError> {
    let decoded = STANDARD
        .decode(token)
        .map_err(|e| bad_request(format!("Invalid pageToken provided: {}", e)))?;
    serde_json::from_slice(&decoded)
        .map_err(|e| bad_request(format!("Invalid pageToken provided: {}", e)))
}

fn encode_page_token(cursor: &Value) -> String {
    STANDARD.encode(cursor.to_string())
}

/// One page of the catalog, ordered by `id` (or by `price` when a price filter is set).
#[tracing::instrument(skip(state))]
pub async fn list_groceries(state: &AppState, filters: ListFilters) -> Result<GroceryPage, AppError> {
    let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

    let mut query = RecordQuery::new().order_by("id").limit(CATALOG_PAGE_SIZE);

    if let Some(name) = non_empty(&filters.productname) {
        query = query.filter("productname", FilterOp::Eq, Value::String(name));
    }
    if let Some(raw) = non_empty(&filters.price_filter) {
        let (op, value) = parse_price_filter(&raw)?;
        query = query.order_by("price").filter("price", op, json!(value));
    }
    if let Some(category) = non_empty(&filters.category) {
        query = query.filter("category", FilterOp::Eq, Value::String(category));
    }
    if let Some(token) = non_empty(&filters.page_token) {
        query = query.start_after(decode_page_token(&token)?);
    }

    let page = state
        .records
        .query(GROCERIES_COLLECTION, &query)
        .await
        .map_err(db_error)?;

    Ok(GroceryPage {
        next_page_token: page
            .next_cursor
            .as_ref()
            .map(encode_page_token)
            .unwrap_or_default(),
        groceries: page.documents.into_iter().map(|doc| doc.data).collect(),
        page_token_param: "pageToken",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_filter_parses_operator_and_integer() {
        assert_eq!(parse_price_filter("gt:2").unwrap(), (FilterOp::Gt, 2));
        assert_eq!(parse_price_filter("lt:10").unwrap(), (FilterOp::Lt, 10));
        assert!(matches!(
            parse_price_filter("between:1"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(parse_price_filter("gt:1.5"), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_price_filter("gt"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn page_token_is_base64_of_cursor() {
        let token = encode_page_token(&json!(1234));
        assert_eq!(token, STANDARD.encode("1234"));
        assert_eq!(decode_page_token(&token).unwrap(), json!(1234));
        assert!(decode_page_token("%%%").is_err());
    }

    #[test]
    fn numeric_fields_are_validated_and_stored_as_numbers() {
        let mut data = json!({"price": "2.50", "itempackagequantity": 3})
            .as_object()
            .cloned()
            .unwrap();
        normalize_numeric_fields(&mut data).unwrap();
        assert_eq!(data["price"], json!(2.5));
        assert_eq!(data["itempackagequantity"], json!(3));

        let mut negative = json!({"price": "-1"}).as_object().cloned().unwrap();
        let err = normalize_numeric_fields(&mut negative).unwrap_err();
        assert_eq!(
            pantry_core::ErrorMetadata::client_message(&err),
            "Price should not be a non-negative value"
        );
    }

    #[test]
    fn random_ids_stay_in_range() {
        for _ in 0..1000 {
            let id = random_catalog_id();
            assert!((0..=MAX_CATALOG_ID).contains(&id));
        }
    }
}
