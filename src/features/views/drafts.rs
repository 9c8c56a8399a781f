use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::SessionObserver;
use crate::features::reports::models::{PendingInfraction, ServiceType};
use crate::features::reports::services::ReportSubmission;
use crate::shared::constants::{default_sector, is_known_infraction};

/// Unsent report form of one browser session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDraft {
    pub service_type: ServiceType,
    pub sector: String,
    pub car_removals: i32,
    pub motorcycle_removals: i32,
    pub total_approaches: i32,
    pub infractions: Vec<PendingInfraction>,
}

impl Default for ReportDraft {
    fn default() -> Self {
        Self {
            service_type: ServiceType::default(),
            sector: default_sector().to_string(),
            car_removals: 0,
            motorcycle_removals: 0,
            total_approaches: 0,
            infractions: Vec::new(),
        }
    }
}

/// Raw form fields. Every form button posts the whole form so edits are never lost.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReportFormInput {
    pub service_type: Option<String>,
    pub sector: Option<String>,
    pub car_removals: Option<String>,
    pub motorcycle_removals: Option<String>,
    pub total_approaches: Option<String>,
    pub infraction_type: Option<String>,
    pub quantity: Option<String>,
}

/// Parse a count field: blank is zero, anything else must be a non-negative integer
fn parse_count(value: &Option<String>, label: &str) -> Result<i32> {
    let raw = value.as_deref().map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Ok(0);
    }
    match raw.parse::<i32>() {
        Ok(n) if n >= 0 => Ok(n),
        _ => Err(AppError::Validation(format!(
            "{} must be a whole number of zero or more",
            label
        ))),
    }
}

impl ReportDraft {
    /// Copy the report fields of a posted form into the draft. Nothing changes on error.
    pub fn apply_fields(&mut self, input: &ReportFormInput) -> Result<()> {
        let service_type = match input.service_type.as_deref().map(str::trim) {
            None | Some("") => self.service_type,
            Some(value) => value
                .parse::<ServiceType>()
                .map_err(AppError::Validation)?,
        };
        let car_removals = parse_count(&input.car_removals, "Car removals")?;
        let motorcycle_removals = parse_count(&input.motorcycle_removals, "Motorcycle removals")?;
        let total_approaches = parse_count(&input.total_approaches, "Total approaches")?;

        self.service_type = service_type;
        if let Some(sector) = input.sector.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            self.sector = sector.to_string();
        }
        self.car_removals = car_removals;
        self.motorcycle_removals = motorcycle_removals;
        self.total_approaches = total_approaches;
        Ok(())
    }

    /// Append a pending infraction. Quantity must be positive and the type catalogued.
    pub fn add_infraction(&mut self, infraction_type: &str, quantity: &str) -> Result<()> {
        let infraction_type = infraction_type.trim();
        if !is_known_infraction(infraction_type) {
            return Err(AppError::Validation(
                "Select an infraction type from the list".to_string(),
            ));
        }
        let quantity = match quantity.trim().parse::<i32>() {
            Ok(n) if n > 0 => n,
            _ => {
                return Err(AppError::Validation(
                    "Quantity must be a positive whole number".to_string(),
                ))
            }
        };

        self.infractions.push(PendingInfraction {
            infraction_type: infraction_type.to_string(),
            quantity,
        });
        Ok(())
    }

    /// Remove the pending infraction at `index`, if any
    pub fn remove_infraction(&mut self, index: usize) -> Option<PendingInfraction> {
        (index < self.infractions.len()).then(|| self.infractions.remove(index))
    }

    pub fn to_submission(&self, responsible_name: String) -> ReportSubmission {
        ReportSubmission {
            responsible_name,
            service_type: self.service_type,
            sector: self.sector.clone(),
            car_removals: self.car_removals,
            motorcycle_removals: self.motorcycle_removals,
            total_approaches: self.total_approaches,
            infractions: self.infractions.clone(),
        }
    }
}

/// Drafts keyed by browser session id
#[derive(Default)]
pub struct DraftStore {
    drafts: RwLock<HashMap<Uuid, ReportDraft>>,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session's draft, or a fresh one
    pub async fn get(&self, session_id: Uuid) -> ReportDraft {
        self.drafts
            .read()
            .await
            .get(&session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Edit the session's draft in place
    pub async fn update<R>(&self, session_id: Uuid, edit: impl FnOnce(&mut ReportDraft) -> R) -> R {
        let mut drafts = self.drafts.write().await;
        edit(drafts.entry(session_id).or_default())
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.drafts.read().await.len()
    }

    /// Back to defaults after a successful submission
    pub async fn reset(&self, session_id: Uuid) {
        self.drafts.write().await.remove(&session_id);
    }

}

#[async_trait]
impl SessionObserver for DraftStore {
    async fn session_closed(&self, id: Uuid) {
        self.drafts.write().await.remove(&id);
    }
}
