use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{
    CreateInfraction, CreateReport, Infraction, PendingInfraction, Report, ReportFilter,
    ReportWithInfractions, ServiceType,
};
use crate::features::reports::services::ReportStore;
use crate::shared::constants::{
    is_known_infraction, is_known_sector, PROTOCOL_PREFIX, PROTOCOL_TOKEN_LEN,
};
use crate::shared::validation::PROTOCOL_NUMBER_REGEX;

/// Generate a protocol number in format: PRT-YYYYMMDD-XXXXXXXXXXXX
///
/// The token is random (UUID v4), so numbers never depend on a store round-trip.
pub fn generate_protocol_number(now: DateTime<Utc>) -> String {
    let token = Uuid::new_v4().simple().to_string().to_uppercase();
    format!(
        "{}-{}-{}",
        PROTOCOL_PREFIX,
        now.format("%Y%m%d"),
        &token[..PROTOCOL_TOKEN_LEN]
    )
}

/// A completed report form
#[derive(Debug, Clone)]
pub struct ReportSubmission {
    pub responsible_name: String,
    pub service_type: ServiceType,
    pub sector: String,
    pub car_removals: i32,
    pub motorcycle_removals: i32,
    pub total_approaches: i32,
    pub infractions: Vec<PendingInfraction>,
}

impl ReportSubmission {
    pub fn validate(&self) -> Result<()> {
        if self.responsible_name.trim().is_empty() {
            return Err(AppError::Validation(
                "responsible name is required".to_string(),
            ));
        }
        if !is_known_sector(&self.sector) {
            return Err(AppError::Validation(format!(
                "Unknown sector: {}",
                self.sector
            )));
        }
        if self.car_removals < 0 || self.motorcycle_removals < 0 || self.total_approaches < 0 {
            return Err(AppError::Validation(
                "Counts must not be negative".to_string(),
            ));
        }
        for infraction in &self.infractions {
            if !is_known_infraction(&infraction.infraction_type) {
                return Err(AppError::Validation(format!(
                    "Unknown infraction type: {}",
                    infraction.infraction_type
                )));
            }
            if infraction.quantity <= 0 {
                return Err(AppError::Validation(format!(
                    "Quantity for {} must be positive",
                    infraction.infraction_type
                )));
            }
        }
        Ok(())
    }
}

/// Reports matching a filter plus the infractions of exactly those reports
#[derive(Debug, Clone, Default)]
pub struct ReportSet {
    pub reports: Vec<Report>,
    pub infractions: Vec<Infraction>,
}

/// Service for report submission and retrieval
pub struct ReportService {
    store: Arc<dyn ReportStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self { store }
    }

    /// Persist one report with all its pending infractions as a single write.
    ///
    /// Ids and the protocol number are minted here, before the store is touched, so
    /// infractions are written already bound to their report.
    pub async fn submit(&self, submission: ReportSubmission) -> Result<ReportWithInfractions> {
        submission.validate()?;

        let protocol_number = generate_protocol_number(Utc::now());
        let report_id = Uuid::now_v7();

        let report = CreateReport {
            id: report_id,
            responsible_name: submission.responsible_name.trim().to_string(),
            service_type: submission.service_type,
            sector: submission.sector,
            car_removals: submission.car_removals,
            motorcycle_removals: submission.motorcycle_removals,
            total_approaches: submission.total_approaches,
            protocol_number,
        };

        let infractions: Vec<CreateInfraction> = submission
            .infractions
            .into_iter()
            .map(|pending| CreateInfraction {
                id: Uuid::now_v7(),
                report_id,
                infraction_type: pending.infraction_type,
                quantity: pending.quantity,
            })
            .collect();

        let stored = self.store.insert_submission(&report, &infractions).await?;

        tracing::info!(
            "Report submitted: id={}, protocol={}, infractions={}",
            stored.report.id,
            stored.report.protocol_number,
            stored.infractions.len()
        );

        Ok(stored)
    }

    /// Fetch reports matching the filter (newest first) and their infractions.
    pub async fn list(&self, filter: &ReportFilter) -> Result<ReportSet> {
        filter.validate()?;

        let reports = self.store.find_reports(filter).await?;

        // An "in empty set" query must never be sent
        if reports.is_empty() {
            return Ok(ReportSet::default());
        }

        let report_ids: Vec<Uuid> = reports.iter().map(|r| r.id).collect();
        let infractions = self.store.find_infractions(&report_ids).await?;

        tracing::debug!(
            "Fetched {} reports and {} infractions",
            reports.len(),
            infractions.len()
        );

        Ok(ReportSet {
            reports,
            infractions,
        })
    }

    /// Look up a submission receipt
    pub async fn get_by_protocol(&self, protocol_number: &str) -> Result<ReportWithInfractions> {
        if !PROTOCOL_NUMBER_REGEX.is_match(protocol_number) {
            return Err(AppError::BadRequest(
                "Invalid protocol number format".to_string(),
            ));
        }

        let report = self
            .store
            .find_by_protocol(protocol_number)
            .await?
            .ok_or_else(|| AppError::NotFound("Report not found".to_string()))?;

        let infractions = self.store.find_infractions(&[report.id]).await?;

        Ok(ReportWithInfractions {
            report,
            infractions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{seed_report, MemoryReportStore};
    use chrono::{Duration, TimeZone};
    use std::collections::HashSet;
    use tokio_test::{assert_err, assert_ok};

    fn service_with(store: &Arc<MemoryReportStore>) -> ReportService {
        ReportService::new(Arc::clone(store) as Arc<dyn ReportStore>)
    }

    fn submission(infractions: Vec<PendingInfraction>) -> ReportSubmission {
        ReportSubmission {
            responsible_name: "Sgt. Almeida".to_string(),
            service_type: ServiceType::Ordinario,
            sector: "GEOTRAN - 1º Distrito".to_string(),
            car_removals: 2,
            motorcycle_removals: 1,
            total_approaches: 5,
            infractions,
        }
    }

    fn pending(infraction_type: &str, quantity: i32) -> PendingInfraction {
        PendingInfraction {
            infraction_type: infraction_type.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_protocol_number_format() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let protocol = generate_protocol_number(now);

        assert!(protocol.starts_with("PRT-20261018-"));
        assert!(PROTOCOL_NUMBER_REGEX.is_match(&protocol));
    }

    #[test]
    fn test_protocol_numbers_do_not_repeat() {
        let now = Utc::now();
        let protocols: HashSet<String> =
            (0..1000).map(|_| generate_protocol_number(now)).collect();
        assert_eq!(protocols.len(), 1000);
    }

    #[tokio::test]
    async fn test_submit_without_infractions_writes_only_the_report() {
        let store = Arc::new(MemoryReportStore::default());
        let service = service_with(&store);

        let stored = assert_ok!(service.submit(submission(vec![])).await);

        assert!(stored.infractions.is_empty());
        assert_eq!(store.report_count(), 1);
        assert_eq!(store.infraction_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_binds_every_infraction_to_the_new_report() {
        let store = Arc::new(MemoryReportStore::default());
        let service = service_with(&store);

        let stored = service
            .submit(submission(vec![
                pending("Sem capacete", 3),
                pending("Licenciamento vencido", 1),
                pending("Sem capacete", 2),
            ]))
            .await
            .unwrap();

        assert_eq!(store.report_count(), 1);
        assert_eq!(store.infraction_count(), 3);
        assert!(store
            .infractions()
            .iter()
            .all(|i| i.report_id == Some(stored.report.id)));
    }

    #[tokio::test]
    async fn test_submit_scenario_persists_fields_and_returns_protocol() {
        let store = Arc::new(MemoryReportStore::default());
        let service = service_with(&store);

        let stored = service
            .submit(submission(vec![pending("Sem capacete", 3)]))
            .await
            .unwrap();

        let report = &store.reports()[0];
        assert_eq!(report.service_type, ServiceType::Ordinario);
        assert_eq!(report.sector, "GEOTRAN - 1º Distrito");
        assert_eq!(report.car_removals, 2);
        assert_eq!(report.motorcycle_removals, 1);
        assert_eq!(report.total_approaches, 5);
        assert!(!stored.report.protocol_number.is_empty());
        assert_eq!(report.protocol_number, stored.report.protocol_number);

        let infraction = &store.infractions()[0];
        assert_eq!(infraction.infraction_type, "Sem capacete");
        assert_eq!(infraction.quantity, 3);
        assert_eq!(infraction.report_id, Some(report.id));
    }

    #[tokio::test]
    async fn test_repeated_submissions_get_distinct_protocols() {
        let store = Arc::new(MemoryReportStore::default());
        let service = service_with(&store);

        let first = service.submit(submission(vec![])).await.unwrap();
        let second = service.submit(submission(vec![])).await.unwrap();

        assert_ne!(first.report.protocol_number, second.report.protocol_number);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_nothing_behind() {
        let store = Arc::new(MemoryReportStore::default());
        store.fail_writes(true);
        let service = service_with(&store);

        let result = service
            .submit(submission(vec![pending("Sem capacete", 3)]))
            .await;

        assert_err!(result);
        assert_eq!(store.report_count(), 0);
        assert_eq!(store.infraction_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_submission_never_reaches_the_store() {
        let store = Arc::new(MemoryReportStore::default());
        let service = service_with(&store);

        let mut bad_quantity = submission(vec![pending("Sem capacete", 0)]);
        assert!(matches!(
            service.submit(bad_quantity.clone()).await,
            Err(AppError::Validation(_))
        ));

        bad_quantity.infractions = vec![pending("Not in catalog", 1)];
        assert!(matches!(
            service.submit(bad_quantity.clone()).await,
            Err(AppError::Validation(_))
        ));

        let mut bad_sector = submission(vec![]);
        bad_sector.sector = "Somewhere".to_string();
        assert!(matches!(
            service.submit(bad_sector).await,
            Err(AppError::Validation(_))
        ));

        let mut negative = submission(vec![]);
        negative.car_removals = -1;
        assert!(matches!(
            service.submit(negative).await,
            Err(AppError::Validation(_))
        ));

        assert_eq!(store.report_count(), 0);
    }

    #[tokio::test]
    async fn test_list_empty_set_skips_infraction_query() {
        let store = Arc::new(MemoryReportStore::default());
        let service = service_with(&store);

        let set = service.list(&ReportFilter::default()).await.unwrap();

        assert!(set.reports.is_empty());
        assert!(set.infractions.is_empty());
        assert_eq!(store.infraction_queries(), 0);
    }

    #[tokio::test]
    async fn test_list_filters_and_orders_newest_first() {
        let store = Arc::new(MemoryReportStore::default());
        let base = Utc.with_ymd_and_hms(2026, 10, 10, 9, 0, 0).unwrap();
        let old = seed_report(&store, ServiceType::Ras, "GEOTRAN - 2º Distrito", 1, 0, base);
        let newer = seed_report(
            &store,
            ServiceType::Ras,
            "GEOTRAN - 2º Distrito",
            0,
            1,
            base + Duration::days(2),
        );
        seed_report(
            &store,
            ServiceType::Ordinario,
            "GEOTRAN - 1º Distrito",
            4,
            0,
            base + Duration::days(1),
        );
        let service = service_with(&store);

        let set = service
            .list(&ReportFilter {
                service_type: Some(ServiceType::Ras),
                ..Default::default()
            })
            .await
            .unwrap();

        let ids: Vec<Uuid> = set.reports.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![newer, old]);
        assert_eq!(store.infraction_queries(), 1);
    }

    #[tokio::test]
    async fn test_list_returns_only_infractions_of_matching_reports() {
        let store = Arc::new(MemoryReportStore::default());
        let service = service_with(&store);

        let kept = service
            .submit(ReportSubmission {
                service_type: ServiceType::Ras,
                ..submission(vec![pending("Sem capacete", 2)])
            })
            .await
            .unwrap();
        service
            .submit(submission(vec![pending("Licenciamento vencido", 5)]))
            .await
            .unwrap();

        let set = service
            .list(&ReportFilter {
                service_type: Some(ServiceType::Ras),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(set.reports.len(), 1);
        assert_eq!(set.infractions.len(), 1);
        assert_eq!(set.infractions[0].report_id, Some(kept.report.id));
    }

    #[tokio::test]
    async fn test_list_read_failure_stops_before_infractions() {
        let store = Arc::new(MemoryReportStore::default());
        store.fail_reads(true);
        let service = service_with(&store);

        assert!(service.list(&ReportFilter::default()).await.is_err());
        assert_eq!(store.infraction_queries(), 0);
    }

    #[tokio::test]
    async fn test_get_by_protocol() {
        let store = Arc::new(MemoryReportStore::default());
        let service = service_with(&store);
        let stored = service
            .submit(submission(vec![pending("Sem capacete", 1)]))
            .await
            .unwrap();

        let found = service
            .get_by_protocol(&stored.report.protocol_number)
            .await
            .unwrap();
        assert_eq!(found.report.id, stored.report.id);
        assert_eq!(found.infractions.len(), 1);

        assert!(matches!(
            service.get_by_protocol("PRT-20000101-000000000000").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.get_by_protocol("not-a-protocol").await,
            Err(AppError::BadRequest(_))
        ));
    }
}
