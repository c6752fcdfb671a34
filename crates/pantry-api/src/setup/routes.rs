//! Route configuration and setup

use crate::handlers;
use crate::middleware::cors_middleware;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};
use pantry_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router<()> {
    let max_body = config.max_upload_size_bytes();

    let api_routes = Router::new()
        .route("/api/BulkCreate", post(handlers::bulk::bulk_create))
        .route("/api/downloadcsv", post(handlers::push::download_csv))
        .route("/api/thumbnail", post(handlers::push::thumbnail))
        .route(
            "/api/auditlog",
            post(handlers::push::audit_log)
                .fallback(handlers::push::audit_log_method_not_allowed),
        )
        .route("/api/CreateGrocery", post(handlers::catalog::create_grocery))
        .route("/api/UpdateGrocery", patch(handlers::catalog::update_grocery))
        .route("/api/DeleteGrocery", delete(handlers::catalog::delete_grocery))
        .route("/api/GetGroceryByID", get(handlers::catalog::get_grocery))
        .route(
            "/api/ViewAllGroceries",
            get(handlers::catalog::view_all_groceries),
        );

    let health_routes = Router::new().route(
        "/health",
        get({
            let state = state.clone();
            move || {
                let state = state.clone();
                async { handlers::health::health_check(state).await }
            }
        }),
    );

    // Server-level concurrency limit to protect against resource exhaustion under extreme load
    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);

    tracing::info!(
        max_upload_size_mb = max_body / 1024 / 1024,
        http_concurrency_limit = http_concurrency_limit,
        "Routes configured"
    );

    api_routes
        .with_state(state)
        .merge(health_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(cors_middleware))
}
