use utoipa::openapi::security::{
    ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme,
};
use utoipa::{Modify, OpenApi};

use crate::core::config::SessionConfig;
use crate::features::auth::{self, dtos as auth_dtos};
use crate::features::dashboard::{dtos as dashboard_dtos, handlers as dashboard_handlers};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::login,
        auth::handlers::logout,
        auth::handlers::get_session,
        auth::handlers::session_events,
        // Reports
        reports_handlers::create_report,
        reports_handlers::list_reports,
        reports_handlers::get_by_protocol,
        reports_handlers::get_catalog,
        // Dashboard
        dashboard_handlers::get_dashboard,
    ),
    components(
        schemas(
            Meta,
            // Auth
            auth::model::AuthenticatedUser,
            auth_dtos::LoginRequestDto,
            auth_dtos::LoginResponseDto,
            auth_dtos::SessionStatusDto,
            ApiResponse<auth_dtos::LoginResponseDto>,
            ApiResponse<auth_dtos::SessionStatusDto>,
            // Reports
            reports_models::ServiceType,
            reports_dtos::InfractionInputDto,
            reports_dtos::CreateReportDto,
            reports_dtos::InfractionResponseDto,
            reports_dtos::ReportResponseDto,
            reports_dtos::SubmissionReceiptDto,
            reports_dtos::ReportListDto,
            reports_dtos::ServiceTypeOptionDto,
            reports_dtos::CatalogDto,
            ApiResponse<reports_dtos::SubmissionReceiptDto>,
            ApiResponse<reports_dtos::ReportListDto>,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<reports_dtos::CatalogDto>,
            // Dashboard
            dashboard_dtos::DashboardTotalsDto,
            dashboard_dtos::ServiceTypeCountDto,
            dashboard_dtos::SectorRemovalsDto,
            dashboard_dtos::InfractionTypeTotalDto,
            dashboard_dtos::DashboardStatsDto,
            dashboard_dtos::DashboardDto,
            ApiResponse<dashboard_dtos::DashboardDto>,
        )
    ),
    tags(
        (name = "auth", description = "Agent sign-in and session state"),
        (name = "reports", description = "Enforcement report submission and lookup"),
        (name = "dashboard", description = "Aggregated statistics over filtered reports"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "GEOTRAN API",
        version = "0.1.0",
        description = "API documentation for the GEOTRAN enforcement reporting service",
    )
)]
pub struct ApiDoc;

/// Adds the bearer token and session cookie security schemes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    SessionConfig::DEFAULT_COOKIE_NAME,
                ))),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
