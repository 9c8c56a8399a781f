use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::core::error::AppError;
use crate::features::auth::model::Viewer;
use crate::features::dashboard::dtos::DashboardDto;
use crate::features::dashboard::services::DashboardService;
use crate::features::reports::dtos::ReportQueryParams;
use crate::shared::types::ApiResponse;

/// Get aggregated dashboard data for a filter
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "dashboard",
    params(ReportQueryParams),
    responses(
        (status = 200, description = "Summary tiles, chart series and recent reports", body = ApiResponse<DashboardDto>),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Superseded by a newer request from the same viewer"),
        (status = 500, description = "Internal server error")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn get_dashboard(
    viewer: Viewer,
    State(service): State<Arc<DashboardService>>,
    Query(params): Query<ReportQueryParams>,
) -> Result<Json<ApiResponse<DashboardDto>>, AppError> {
    let filter = params.to_filter()?;
    let dashboard = service.load_for_viewer(&viewer, &filter).await?;
    Ok(Json(ApiResponse::success(Some(dashboard), None, None)))
}
