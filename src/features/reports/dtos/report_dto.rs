use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{
    Infraction, PendingInfraction, Report, ReportFilter, ReportWithInfractions, ServiceType,
};
use crate::features::reports::services::{ReportSet, ReportSubmission};

// ============================================================================
// Requests
// ============================================================================

/// Infraction line on a submission
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct InfractionInputDto {
    #[validate(length(min = 1, message = "Infraction type is required"))]
    pub infraction_type: String,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Request DTO for submitting a report
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateReportDto {
    #[serde(default)]
    pub service_type: ServiceType,

    #[validate(length(min = 1, message = "Sector is required"))]
    pub sector: String,

    #[validate(range(min = 0, message = "Car removals must not be negative"))]
    #[serde(default)]
    pub car_removals: i32,

    #[validate(range(min = 0, message = "Motorcycle removals must not be negative"))]
    #[serde(default)]
    pub motorcycle_removals: i32,

    #[validate(range(min = 0, message = "Total approaches must not be negative"))]
    #[serde(default)]
    pub total_approaches: i32,

    #[validate(nested)]
    #[serde(default)]
    pub infractions: Vec<InfractionInputDto>,
}

impl CreateReportDto {
    /// Attach the responsible agent, which always comes from the session
    pub fn into_submission(self, responsible_name: String) -> ReportSubmission {
        ReportSubmission {
            responsible_name,
            service_type: self.service_type,
            sector: self.sector,
            car_removals: self.car_removals,
            motorcycle_removals: self.motorcycle_removals,
            total_approaches: self.total_approaches,
            infractions: self
                .infractions
                .into_iter()
                .map(|i| PendingInfraction {
                    infraction_type: i.infraction_type,
                    quantity: i.quantity,
                })
                .collect(),
        }
    }
}

/// Filter query parameters shared by the report list and the dashboard.
///
/// Empty strings and `all` mean "no filter" so HTML selects can submit them unchanged.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams)]
pub struct ReportQueryParams {
    /// `ordinario`, `operacao_especial`, `ras` or `all`
    pub service_type: Option<String>,
    /// Inclusive start day (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// Inclusive end day (YYYY-MM-DD)
    pub end_date: Option<String>,
}

impl ReportQueryParams {
    pub fn to_filter(&self) -> Result<ReportFilter> {
        let service_type = match non_empty(&self.service_type) {
            None | Some("all") => None,
            Some(value) => Some(value.parse::<ServiceType>().map_err(AppError::BadRequest)?),
        };

        let filter = ReportFilter {
            service_type,
            start_date: parse_day(&self.start_date, "start_date")?,
            end_date: parse_day(&self.end_date, "end_date")?,
        };
        filter.validate()?;

        Ok(filter)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_day(value: &Option<String>, field: &str) -> Result<Option<NaiveDate>> {
    non_empty(value)
        .map(|v| {
            NaiveDate::parse_from_str(v, "%Y-%m-%d").map_err(|_| {
                AppError::BadRequest(format!("{} must be a date in YYYY-MM-DD format", field))
            })
        })
        .transpose()
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InfractionResponseDto {
    pub id: Uuid,
    pub infraction_type: String,
    pub quantity: i32,
    pub report_id: Option<Uuid>,
}

impl From<Infraction> for InfractionResponseDto {
    fn from(i: Infraction) -> Self {
        Self {
            id: i.id,
            infraction_type: i.infraction_type,
            quantity: i.quantity,
            report_id: i.report_id,
        }
    }
}

/// Response DTO for report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: Uuid,
    pub responsible_name: String,
    pub service_type: ServiceType,
    pub sector: String,
    pub car_removals: i32,
    pub motorcycle_removals: i32,
    pub total_approaches: i32,
    pub protocol_number: String,
    pub created_at: DateTime<Utc>,
}

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        Self {
            id: r.id,
            responsible_name: r.responsible_name,
            service_type: r.service_type,
            sector: r.sector,
            car_removals: r.car_removals,
            motorcycle_removals: r.motorcycle_removals,
            total_approaches: r.total_approaches,
            protocol_number: r.protocol_number,
            created_at: r.created_at,
        }
    }
}

/// Submission receipt: the stored report and its infractions
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmissionReceiptDto {
    pub protocol_number: String,
    pub report: ReportResponseDto,
    pub infractions: Vec<InfractionResponseDto>,
}

impl From<ReportWithInfractions> for SubmissionReceiptDto {
    fn from(stored: ReportWithInfractions) -> Self {
        Self {
            protocol_number: stored.report.protocol_number.clone(),
            report: stored.report.into(),
            infractions: stored.infractions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Reports matching a filter with the infractions bound to them
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportListDto {
    pub reports: Vec<ReportResponseDto>,
    pub infractions: Vec<InfractionResponseDto>,
}

impl From<ReportSet> for ReportListDto {
    fn from(set: ReportSet) -> Self {
        Self {
            reports: set.reports.into_iter().map(Into::into).collect(),
            infractions: set.infractions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Selectable values for the report form
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogDto {
    pub service_types: Vec<ServiceTypeOptionDto>,
    pub sectors: Vec<String>,
    pub infraction_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceTypeOptionDto {
    pub value: ServiceType,
    pub label: String,
}
