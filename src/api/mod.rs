//! API module for the control tower dashboard
//!
//! REST interface over the working table, consumed by the chart and map front end.

pub mod handlers;
pub mod service;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use service::DashboardService;

/// Largest accepted dataset upload
pub const MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

pub fn router(service: Arc<DashboardService>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(handlers::health))
        // Dataset
        .route(
            "/api/v1/dataset",
            get(handlers::get_dataset)
                .post(handlers::upload_dataset)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/v1/regions", get(handlers::get_regions))
        // Panels
        .route("/api/v1/kpis", get(handlers::get_kpis))
        .route("/api/v1/summary", get(handlers::get_summary))
        .route("/api/v1/charts", get(handlers::get_charts))
        .route("/api/v1/map", get(handlers::get_map))
        // Assistant and risk
        .route("/api/v1/ask", post(handlers::ask))
        .route("/api/v1/risk", post(handlers::run_risk_model))
        // State and middleware
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
