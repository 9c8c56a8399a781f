use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

/// Service type enum matching database enum
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "service_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// Ordinary patrol
    #[default]
    Ordinario,
    /// Special operation
    OperacaoEspecial,
    Ras,
}

impl ServiceType {
    pub const ALL: [ServiceType; 3] = [
        ServiceType::Ordinario,
        ServiceType::OperacaoEspecial,
        ServiceType::Ras,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Ordinario => "ordinario",
            ServiceType::OperacaoEspecial => "operacao_especial",
            ServiceType::Ras => "ras",
        }
    }

    /// Label shown in forms and chart legends
    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::Ordinario => "Ordinário",
            ServiceType::OperacaoEspecial => "Operação Especial",
            ServiceType::Ras => "RAS",
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ServiceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown service type: {}", s))
    }
}

/// Database model for report
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Report {
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

impl Report {
    pub fn total_removals(&self) -> i64 {
        i64::from(self.car_removals) + i64::from(self.motorcycle_removals)
    }
}

/// Data for creating a new report. The id is minted before the write.
#[derive(Debug, Clone)]
pub struct CreateReport {
    pub id: Uuid,
    pub responsible_name: String,
    pub service_type: ServiceType,
    pub sector: String,
    pub car_removals: i32,
    pub motorcycle_removals: i32,
    pub total_approaches: i32,
    pub protocol_number: String,
}

/// Read filter for the report collection.
///
/// `None` service type means "all". Date bounds are inclusive UTC calendar days.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub service_type: Option<ServiceType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReportFilter {
    /// Inclusive lower bound on `created_at`
    pub fn created_from(&self) -> Option<DateTime<Utc>> {
        self.start_date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }

    /// Inclusive upper bound on `created_at`, extended to the end of the day
    pub fn created_until(&self) -> Option<DateTime<Utc>> {
        self.end_date
            .and_then(|d| d.and_hms_micro_opt(23, 59, 59, 999_999))
            .map(|dt| dt.and_utc())
    }

    /// In-memory form of the store's filter predicate
    #[cfg(test)]
    pub fn matches(&self, report: &Report) -> bool {
        if self
            .service_type
            .is_some_and(|service_type| report.service_type != service_type)
        {
            return false;
        }
        if self
            .created_from()
            .is_some_and(|from| report.created_at < from)
        {
            return false;
        }
        if self
            .created_until()
            .is_some_and(|until| report.created_at > until)
        {
            return false;
        }
        true
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(AppError::Validation(
                    "start_date must not be after end_date".to_string(),
                ));
            }
        }
        Ok(())
    }
}
