use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{handle_db_error, AppError, Result};
use crate::features::reports::models::{
    CreateInfraction, CreateReport, Infraction, Report, ReportFilter, ReportWithInfractions,
};

/// Persistence for reports and their infractions.
///
/// `insert_submission` is all-or-nothing: either the report and every infraction are
/// stored, or nothing is.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn insert_submission(
        &self,
        report: &CreateReport,
        infractions: &[CreateInfraction],
    ) -> Result<ReportWithInfractions>;

    /// Reports matching the filter, newest first
    async fn find_reports(&self, filter: &ReportFilter) -> Result<Vec<Report>>;

    /// Infractions bound to any of the given reports. Callers must not pass an empty slice.
    async fn find_infractions(&self, report_ids: &[Uuid]) -> Result<Vec<Infraction>>;

    async fn find_by_protocol(&self, protocol_number: &str) -> Result<Option<Report>>;
}

const INSERT_REPORT_SQL: &str = r#"
    INSERT INTO reports (
        id, responsible_name, service_type, sector,
        car_removals, motorcycle_removals, total_approaches, protocol_number
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    RETURNING
        id, responsible_name, service_type, sector,
        car_removals, motorcycle_removals, total_approaches, protocol_number, created_at
"#;

const SELECT_REPORTS_SQL: &str = r#"
    SELECT
        id, responsible_name, service_type, sector,
        car_removals, motorcycle_removals, total_approaches, protocol_number, created_at
    FROM reports
    WHERE TRUE"#;

const SELECT_REPORT_BY_PROTOCOL_SQL: &str = r#"
    SELECT
        id, responsible_name, service_type, sector,
        car_removals, motorcycle_removals, total_approaches, protocol_number, created_at
    FROM reports
    WHERE protocol_number = $1
"#;

/// Build the filtered report query: equality on service type, inclusive date bounds,
/// newest first.
pub fn report_query(filter: &ReportFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(SELECT_REPORTS_SQL);

    if let Some(service_type) = filter.service_type {
        query.push(" AND service_type = ").push_bind(service_type);
    }
    if let Some(from) = filter.created_from() {
        query.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(until) = filter.created_until() {
        query.push(" AND created_at <= ").push_bind(until);
    }
    query.push(" ORDER BY created_at DESC");

    query
}

/// PostgreSQL-backed report store
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn insert_submission(
        &self,
        report: &CreateReport,
        infractions: &[CreateInfraction],
    ) -> Result<ReportWithInfractions> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin submission transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let stored: Report = sqlx::query_as(INSERT_REPORT_SQL)
            .bind(report.id)
            .bind(&report.responsible_name)
            .bind(report.service_type)
            .bind(&report.sector)
            .bind(report.car_removals)
            .bind(report.motorcycle_removals)
            .bind(report.total_approaches)
            .bind(&report.protocol_number)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert report {}: {:?}", report.id, e);
                handle_db_error(e)
            })?;

        let mut stored_infractions = Vec::with_capacity(infractions.len());
        if !infractions.is_empty() {
            let mut insert: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO infractions (id, report_id, infraction_type, quantity) ",
            );
            insert.push_values(infractions, |mut row, infraction| {
                row.push_bind(infraction.id)
                    .push_bind(infraction.report_id)
                    .push_bind(infraction.infraction_type.clone())
                    .push_bind(infraction.quantity);
            });
            insert.push(" RETURNING id, infraction_type, quantity, report_id");

            stored_infractions = insert
                .build_query_as::<Infraction>()
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!(
                        "Failed to insert {} infractions for report {}: {:?}",
                        infractions.len(),
                        report.id,
                        e
                    );
                    handle_db_error(e)
                })?;
        }

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit submission {}: {:?}", report.id, e);
            AppError::Database(e)
        })?;

        Ok(ReportWithInfractions {
            report: stored,
            infractions: stored_infractions,
        })
    }

    async fn find_reports(&self, filter: &ReportFilter) -> Result<Vec<Report>> {
        let mut query = report_query(filter);

        query
            .build_query_as::<Report>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch reports: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_infractions(&self, report_ids: &[Uuid]) -> Result<Vec<Infraction>> {
        sqlx::query_as::<_, Infraction>(
            r#"
            SELECT id, infraction_type, quantity, report_id
            FROM infractions
            WHERE report_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(report_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch infractions: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_protocol(&self, protocol_number: &str) -> Result<Option<Report>> {
        sqlx::query_as::<_, Report>(SELECT_REPORT_BY_PROTOCOL_SQL)
            .bind(protocol_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch report by protocol number: {:?}", e);
                AppError::Database(e)
            })
    }
}
