use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Report;

/// Database model for infraction line item
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Infraction {
    pub id: Uuid,
    pub infraction_type: String,
    pub quantity: i32,
    /// Null only for rows left unbound by the old two-step submission
    pub report_id: Option<Uuid>,
}

/// Infraction selected on the form but not yet submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInfraction {
    pub infraction_type: String,
    pub quantity: i32,
}

/// Data for creating an infraction row already bound to its report
#[derive(Debug, Clone)]
pub struct CreateInfraction {
    pub id: Uuid,
    pub report_id: Uuid,
    pub infraction_type: String,
    pub quantity: i32,
}

/// A report together with the infractions bound to it
#[derive(Debug, Clone)]
pub struct ReportWithInfractions {
    pub report: Report,
    pub infractions: Vec<Infraction>,
}
