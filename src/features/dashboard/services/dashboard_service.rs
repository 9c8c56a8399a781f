use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::Viewer;
use crate::features::auth::SessionObserver;
use crate::features::dashboard::dtos::{DashboardDto, DashboardStatsDto};
use crate::features::dashboard::services::{aggregate, FetchSequencer};
use crate::features::reports::models::ReportFilter;
use crate::features::reports::services::ReportService;

/// Service for dashboard aggregation
pub struct DashboardService {
    report_service: Arc<ReportService>,
    sequencer: FetchSequencer,
}

impl DashboardService {
    pub fn new(report_service: Arc<ReportService>) -> Self {
        Self {
            report_service,
            sequencer: FetchSequencer::new(),
        }
    }

    /// Full fetch-and-aggregate cycle for one filter
    pub async fn load(&self, filter: &ReportFilter) -> Result<DashboardStatsDto> {
        let set = self.report_service.list(filter).await?;
        Ok(aggregate(&set.reports, &set.infractions))
    }

    /// Like `load`, but a result overtaken by a newer fetch for the same viewer is
    /// discarded with `Conflict`.
    pub async fn load_for_viewer(
        &self,
        viewer: &Viewer,
        filter: &ReportFilter,
    ) -> Result<DashboardDto> {
        let sequence = self.sequencer.issue(viewer).await;
        let stats = self.load(filter).await?;

        if !self.sequencer.is_current(viewer, sequence).await {
            tracing::debug!(
                "Discarding dashboard fetch {} for {}: superseded",
                sequence,
                viewer.0
            );
            return Err(AppError::Conflict(
                "Superseded by a newer dashboard request".to_string(),
            ));
        }

        Ok(DashboardDto { sequence, stats })
    }

    /// Drop sequencing state once a viewer signs out
    pub async fn forget_viewer(&self, viewer: &Viewer) {
        self.sequencer.forget(viewer).await;
    }
}

#[async_trait]
impl SessionObserver for DashboardService {
    async fn session_closed(&self, id: Uuid) {
        self.forget_viewer(&Viewer::for_session(id)).await;
    }
}
