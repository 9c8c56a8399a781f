mod dashboard_page;
mod form_page;
mod login_page;

pub use dashboard_page::*;
pub use form_page::*;
pub use login_page::*;

use std::sync::Arc;

use crate::features::auth::SessionGate;
use crate::features::dashboard::DashboardService;
use crate::features::reports::ReportService;
use crate::features::views::drafts::DraftStore;

/// State shared by the server-rendered pages
#[derive(Clone)]
pub struct ViewState {
    pub gate: Arc<SessionGate>,
    pub report_service: Arc<ReportService>,
    pub dashboard_service: Arc<DashboardService>,
    pub drafts: Arc<DraftStore>,
}

/// `{value, label}` pairs for the service type select
fn service_type_options() -> Vec<minijinja::Value> {
    crate::features::reports::models::ServiceType::ALL
        .iter()
        .map(|t| minijinja::context! { value => t.as_str(), label => t.label() })
        .collect()
}
