use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{
    CatalogDto, CreateReportDto, ReportListDto, ReportQueryParams, ServiceTypeOptionDto,
    SubmissionReceiptDto,
};
use crate::features::reports::models::ServiceType;
use crate::features::reports::services::ReportService;
use crate::shared::constants::{INFRACTION_CATALOG, SECTORS};
use crate::shared::types::{ApiResponse, Meta};

/// Submit a report with its infractions
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = CreateReportDto,
    responses(
        (status = 201, description = "Report stored; data carries the protocol number", body = ApiResponse<SubmissionReceiptDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Protocol number collision")
    ),
    security(("session_cookie" = []), ("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn create_report(
    user: AuthenticatedUser,
    State(service): State<Arc<ReportService>>,
    AppJson(dto): AppJson<CreateReportDto>,
) -> Result<(StatusCode, Json<ApiResponse<SubmissionReceiptDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let stored = service.submit(dto.into_submission(user.display_name)).await?;
    let receipt = SubmissionReceiptDto::from(stored);
    let message = format!("Report submitted. Protocol: {}", receipt.protocol_number);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(receipt), Some(message), None)),
    ))
}

/// List reports matching a filter, newest first, with their infractions
#[utoipa::path(
    get,
    path = "/api/reports",
    params(ReportQueryParams),
    responses(
        (status = 200, description = "Matching reports and infractions", body = ApiResponse<ReportListDto>),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Unauthorized")
    ),
    security(("session_cookie" = []), ("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_reports(
    State(service): State<Arc<ReportService>>,
    Query(params): Query<ReportQueryParams>,
) -> Result<Json<ApiResponse<ReportListDto>>> {
    let filter = params.to_filter()?;
    let set = service.list(&filter).await?;
    let total = set.reports.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(set.into()),
        None,
        Some(Meta { total }),
    )))
}

/// Look up a submission receipt by protocol number
#[utoipa::path(
    get,
    path = "/api/reports/protocol/{protocol_number}",
    params(
        ("protocol_number" = String, Path, description = "Protocol number, e.g. PRT-20261018-0123456789AB")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<SubmissionReceiptDto>),
        (status = 400, description = "Malformed protocol number"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Report not found")
    ),
    security(("session_cookie" = []), ("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn get_by_protocol(
    State(service): State<Arc<ReportService>>,
    Path(protocol_number): Path<String>,
) -> Result<Json<ApiResponse<SubmissionReceiptDto>>> {
    let stored = service.get_by_protocol(&protocol_number).await?;
    Ok(Json(ApiResponse::success(Some(stored.into()), None, None)))
}

/// Selectable service types, sectors and infraction types
#[utoipa::path(
    get,
    path = "/api/catalog",
    responses(
        (status = 200, description = "Form catalogs", body = ApiResponse<CatalogDto>)
    ),
    tag = "reports"
)]
pub async fn get_catalog() -> Json<ApiResponse<CatalogDto>> {
    let catalog = CatalogDto {
        service_types: ServiceType::ALL
            .iter()
            .map(|t| ServiceTypeOptionDto {
                value: *t,
                label: t.label().to_string(),
            })
            .collect(),
        sectors: SECTORS.iter().map(|s| s.to_string()).collect(),
        infraction_types: INFRACTION_CATALOG.iter().map(|s| s.to_string()).collect(),
    };
    Json(ApiResponse::success(Some(catalog), None, None))
}
