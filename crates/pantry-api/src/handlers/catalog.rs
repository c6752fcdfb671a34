use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, rejection::QueryRejection, Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::HttpAppError;
use crate::services::catalog::{self, CatalogForm, ImageUpload, ListFilters};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "pageToken")]
    page_token: Option<String>,
    productname: Option<String>,
    category: Option<String>,
    #[serde(rename = "priceFilter")]
    price_filter: Option<String>,
}

/// Collect the `json-data` and `image` parts; other parts are ignored.
async fn read_catalog_form(mut multipart: Multipart) -> Result<CatalogForm, HttpAppError> {
    let mut form = CatalogForm::default();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("json-data") => form.json_data = Some(field.text().await?),
            Some("image") => {
                let filename = field.file_name().unwrap_or("image").to_string();
                let data = field.bytes().await?;
                form.image = Some(ImageUpload {
                    filename,
                    data: data.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

#[tracing::instrument(skip(state, multipart), fields(operation = "create_grocery"))]
pub async fn create_grocery(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_catalog_form(multipart?).await?;
    let created = catalog::create_grocery(&state, form).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "File uploaded successfully",
            "url": created.image_url,
        })),
    ))
}

#[tracing::instrument(skip(state, query, multipart), fields(operation = "update_grocery"))]
pub async fn update_grocery(
    State(state): State<Arc<AppState>>,
    query: Result<Query<IdQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Query(query) = query?;
    let form = read_catalog_form(multipart?).await?;
    let document_id = catalog::update_grocery(&state, query.id.as_deref(), form).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Document updated successfully",
            "documentID": document_id,
        })),
    ))
}

#[tracing::instrument(skip(state, query), fields(operation = "delete_grocery"))]
pub async fn delete_grocery(
    State(state): State<Arc<AppState>>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Query(query) = query?;
    let id = catalog::delete_grocery(&state, query.id.as_deref()).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Document Deleted successfully",
            "documentID": id.to_string(),
        })),
    ))
}

pub async fn get_grocery(
    State(state): State<Arc<AppState>>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Query(query) = query?;
    let grocery = catalog::get_grocery(&state, query.id.as_deref()).await?;
    Ok(Json(grocery))
}

pub async fn view_all_groceries(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Query(query) = query?;
    let page = catalog::list_groceries(
        &state,
        ListFilters {
            page_token: query.page_token,
            productname: query.productname,
            category: query.category,
            price_filter: query.price_filter,
        },
    )
    .await?;
    Ok(Json(page))
}
