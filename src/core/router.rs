use axum::{http::StatusCode, middleware::from_fn_with_state, routing::get, Router};
use std::sync::Arc;

use crate::core::config::SessionConfig;
use crate::features::auth::guards::require_api_auth;
use crate::features::auth::{
    routes as auth_routes, AuthProvider, AuthState, SessionGate, SessionObserver,
};
use crate::features::dashboard::{routes as dashboard_routes, DashboardService};
use crate::features::reports::{routes as reports_routes, ReportService, ReportStore};
use crate::features::views::{self, DraftStore, ViewState};

/// Long-lived services shared by every route
#[derive(Clone)]
pub struct AppServices {
    pub gate: Arc<SessionGate>,
    pub report_service: Arc<ReportService>,
    pub dashboard_service: Arc<DashboardService>,
    pub drafts: Arc<DraftStore>,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn ReportStore>,
        auth_provider: Arc<dyn AuthProvider>,
        session_config: SessionConfig,
    ) -> Self {
        let report_service = Arc::new(ReportService::new(store));
        let dashboard_service = Arc::new(DashboardService::new(Arc::clone(&report_service)));
        let drafts = Arc::new(DraftStore::new());

        // Closing a session releases its draft and dashboard sequencing state
        let gate = SessionGate::new(auth_provider, session_config)
            .with_observer(Arc::clone(&drafts) as Arc<dyn SessionObserver>)
            .with_observer(Arc::clone(&dashboard_service) as Arc<dyn SessionObserver>);

        Self {
            gate: Arc::new(gate),
            report_service,
            dashboard_service,
            drafts,
        }
    }
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Application routes without the outer HTTP layers (CORS, tracing, swagger)
pub fn build_router(services: &AppServices) -> Router {
    // API routes accept the session cookie or a bearer token
    let protected_api = Router::new()
        .merge(reports_routes::routes(Arc::clone(&services.report_service)))
        .merge(dashboard_routes::routes(Arc::clone(
            &services.dashboard_service,
        )))
        .route_layer(from_fn_with_state(
            Arc::clone(&services.gate),
            require_api_auth,
        ));

    let auth_state = AuthState {
        gate: Arc::clone(&services.gate),
        dashboard_service: Arc::clone(&services.dashboard_service),
    };

    let view_state = ViewState {
        gate: Arc::clone(&services.gate),
        report_service: Arc::clone(&services.report_service),
        dashboard_service: Arc::clone(&services.dashboard_service),
        drafts: Arc::clone(&services.drafts),
    };

    Router::new()
        .merge(protected_api)
        .merge(reports_routes::public_routes())
        .merge(auth_routes::routes(auth_state))
        .merge(views::routes(view_state))
        .route("/health", get(health_check))
}
