use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::reports::dtos::ReportResponseDto;
use crate::features::reports::models::ServiceType;

/// Summary tiles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardTotalsDto {
    pub report_count: i64,
    pub total_approaches: i64,
    /// Car plus motorcycle removals
    pub total_removals: i64,
    pub car_removals: i64,
    pub motorcycle_removals: i64,
    /// Sum of infraction quantities over the current report set
    pub total_infractions: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ServiceTypeCountDto {
    pub service_type: ServiceType,
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SectorRemovalsDto {
    pub sector: String,
    pub car_removals: i64,
    pub motorcycle_removals: i64,
    pub total_removals: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InfractionTypeTotalDto {
    pub infraction_type: String,
    pub quantity: i64,
}

/// Everything derived from one fetch. Series keep first-seen order of the
/// newest-first report set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DashboardStatsDto {
    pub totals: DashboardTotalsDto,
    pub service_types: Vec<ServiceTypeCountDto>,
    pub sectors: Vec<SectorRemovalsDto>,
    pub infraction_types: Vec<InfractionTypeTotalDto>,
    pub recent_reports: Vec<ReportResponseDto>,
}

/// Dashboard payload tagged with the fetch it answers
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardDto {
    pub sequence: u64,
    #[serde(flatten)]
    pub stats: DashboardStatsDto,
}
