pub mod handlers;

pub use handlers::{bulk_upload, health_check, AppState, BulkUploadResponse, ReportFormat};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;

/// 构建路由
pub fn router(state: AppState, max_request_bytes: usize) -> Router {
    let intake_routes = Router::new()
        .route("/api/invoices/bulk", post(bulk_upload))
        .layer(DefaultBodyLimit::max(max_request_bytes))
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .merge(intake_routes)
        .layer(ServiceBuilder::new())
}
