//! In-memory stand-ins for the database and the hosted auth provider.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use fake::{faker::name::en::Name, Fake};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::core::config::SessionConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::clients::AuthProvider;
use crate::features::auth::model::{AuthenticatedUser, Session};
use crate::features::auth::services::SessionGate;
use crate::features::reports::models::{
    CreateInfraction, CreateReport, Infraction, Report, ReportFilter, ReportWithInfractions,
    ServiceType,
};
use crate::features::reports::services::{generate_protocol_number, ReportStore};

pub const AGENT_EMAIL: &str = "agente@geotran.test";
pub const AGENT_PASSWORD: &str = "senha-secreta";
pub const AGENT_NAME: &str = "Sgt. Almeida";

// =============================================================================
// REPORT STORE
// =============================================================================

#[derive(Default)]
pub struct MemoryReportStore {
    reports: Mutex<Vec<Report>>,
    infractions: Mutex<Vec<Infraction>>,
    infraction_queries: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryReportStore {
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }

    pub fn infractions(&self) -> Vec<Infraction> {
        self.infractions.lock().unwrap().clone()
    }

    pub fn report_count(&self) -> usize {
        self.reports.lock().unwrap().len()
    }

    pub fn infraction_count(&self) -> usize {
        self.infractions.lock().unwrap().len()
    }

    /// Number of infraction lookups issued so far
    pub fn infraction_queries(&self) -> usize {
        self.infraction_queries.load(Ordering::SeqCst)
    }

    pub fn push_report(&self, report: Report) {
        self.reports.lock().unwrap().push(report);
    }

    pub fn push_infraction(&self, infraction: Infraction) {
        self.infractions.lock().unwrap().push(infraction);
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Internal("simulated read failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn insert_submission(
        &self,
        report: &CreateReport,
        infractions: &[CreateInfraction],
    ) -> Result<ReportWithInfractions> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("simulated write failure".to_string()));
        }

        let mut reports = self.reports.lock().unwrap();
        if reports
            .iter()
            .any(|r| r.protocol_number == report.protocol_number)
        {
            return Err(AppError::Conflict("Protocol number already issued".to_string()));
        }

        let stored = Report {
            id: report.id,
            responsible_name: report.responsible_name.clone(),
            service_type: report.service_type,
            sector: report.sector.clone(),
            car_removals: report.car_removals,
            motorcycle_removals: report.motorcycle_removals,
            total_approaches: report.total_approaches,
            protocol_number: report.protocol_number.clone(),
            created_at: Utc::now(),
        };
        let stored_infractions: Vec<Infraction> = infractions
            .iter()
            .map(|i| Infraction {
                id: i.id,
                infraction_type: i.infraction_type.clone(),
                quantity: i.quantity,
                report_id: Some(i.report_id),
            })
            .collect();

        reports.push(stored.clone());
        self.infractions
            .lock()
            .unwrap()
            .extend(stored_infractions.iter().cloned());

        Ok(ReportWithInfractions {
            report: stored,
            infractions: stored_infractions,
        })
    }

    async fn find_reports(&self, filter: &ReportFilter) -> Result<Vec<Report>> {
        self.check_reads()?;
        let mut reports: Vec<Report> = self
            .reports
            .lock()
            .unwrap()
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reports)
    }

    async fn find_infractions(&self, report_ids: &[Uuid]) -> Result<Vec<Infraction>> {
        self.infraction_queries.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        Ok(self
            .infractions
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.report_id.is_some_and(|id| report_ids.contains(&id)))
            .cloned()
            .collect())
    }

    async fn find_by_protocol(&self, protocol_number: &str) -> Result<Option<Report>> {
        self.check_reads()?;
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.protocol_number == protocol_number)
            .cloned())
    }
}

/// Store a report created at a fixed instant and return its id
pub fn seed_report(
    store: &MemoryReportStore,
    service_type: ServiceType,
    sector: &str,
    car_removals: i32,
    motorcycle_removals: i32,
    created_at: DateTime<Utc>,
) -> Uuid {
    let id = Uuid::now_v7();
    store.push_report(Report {
        id,
        responsible_name: Name().fake(),
        service_type,
        sector: sector.to_string(),
        car_removals,
        motorcycle_removals,
        total_approaches: car_removals + motorcycle_removals,
        protocol_number: generate_protocol_number(created_at),
        created_at,
    });
    id
}

pub fn seed_infraction(
    store: &MemoryReportStore,
    report_id: Option<Uuid>,
    infraction_type: &str,
    quantity: i32,
) {
    store.push_infraction(Infraction {
        id: Uuid::now_v7(),
        infraction_type: infraction_type.to_string(),
        quantity,
        report_id,
    });
}

// =============================================================================
// AUTH PROVIDER
// =============================================================================

/// Accepts only `AGENT_EMAIL` / `AGENT_PASSWORD`
pub struct FakeAuthProvider {
    ttl: Duration,
    issued: Mutex<HashMap<String, AuthenticatedUser>>,
    signed_out: Mutex<Vec<String>>,
    fail_sign_out: AtomicBool,
}

impl Default for FakeAuthProvider {
    fn default() -> Self {
        Self::with_ttl(Duration::hours(1))
    }
}

impl FakeAuthProvider {
    /// Sessions issued by this provider expire after `ttl`
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            issued: Mutex::new(HashMap::new()),
            signed_out: Mutex::new(Vec::new()),
            fail_sign_out: AtomicBool::new(false),
        }
    }

    pub fn fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }

    pub fn signed_out_tokens(&self) -> Vec<String> {
        self.signed_out.lock().unwrap().clone()
    }

    /// Issue a token directly, as if signed in from another client
    pub fn issue_token(&self) -> String {
        let token = format!("token-{}", Uuid::new_v4());
        self.issued.lock().unwrap().insert(token.clone(), agent());
        token
    }
}

pub fn agent() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: "agent-1".to_string(),
        email: AGENT_EMAIL.to_string(),
        display_name: AGENT_NAME.to_string(),
    }
}

#[async_trait]
impl AuthProvider for FakeAuthProvider {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        if email != AGENT_EMAIL || password != AGENT_PASSWORD {
            return Err(AppError::Unauthorized("Invalid email or password".to_string()));
        }
        let token = self.issue_token();
        Ok(Session {
            access_token: token,
            refresh_token: None,
            expires_at: Utc::now() + self.ttl,
            user: agent(),
        })
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthenticatedUser> {
        if self
            .signed_out
            .lock()
            .unwrap()
            .iter()
            .any(|t| t == access_token)
        {
            return Err(AppError::Unauthorized("Invalid or expired token".to_string()));
        }
        self.issued
            .lock()
            .unwrap()
            .get(access_token)
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AppError::ExternalServiceError(
                "simulated provider outage".to_string(),
            ));
        }
        self.signed_out
            .lock()
            .unwrap()
            .push(access_token.to_string());
        Ok(())
    }
}

pub fn session_gate(provider: &Arc<FakeAuthProvider>) -> Arc<SessionGate> {
    Arc::new(SessionGate::new(
        Arc::clone(provider) as Arc<dyn AuthProvider>,
        SessionConfig::default(),
    ))
}
