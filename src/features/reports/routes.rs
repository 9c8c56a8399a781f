use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::reports::handlers;
use crate::features::reports::services::ReportService;

/// Report API routes (auth guard applied by caller)
pub fn routes(report_service: Arc<ReportService>) -> Router {
    Router::new()
        .route(
            "/api/reports",
            get(handlers::list_reports).post(handlers::create_report),
        )
        .route(
            "/api/reports/protocol/{protocol_number}",
            get(handlers::get_by_protocol),
        )
        .with_state(report_service)
}

/// Catalog routes, readable without a session
pub fn public_routes() -> Router {
    Router::new().route("/api/catalog", get(handlers::get_catalog))
}
