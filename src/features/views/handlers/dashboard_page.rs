use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};
use minijinja::context;

use crate::core::error::Result;
use crate::features::auth::model::{CurrentSession, Viewer};
use crate::features::reports::dtos::ReportQueryParams;
use crate::features::views::handlers::{service_type_options, ViewState};
use crate::shared::views::page;

/// Dashboard page. Any read failure replaces the whole dashboard with an error.
pub async fn show_dashboard(
    State(state): State<ViewState>,
    current: CurrentSession,
    Query(params): Query<ReportQueryParams>,
) -> Result<Response> {
    let viewer = Viewer::for_session(current.id);
    let loaded = match params.to_filter() {
        Ok(filter) => {
            state
                .dashboard_service
                .load_for_viewer(&viewer, &filter)
                .await
        }
        Err(e) => Err(e),
    };

    let user = current.session.user.display_name.as_str();
    match loaded {
        Ok(dashboard) => page(
            StatusCode::OK,
            "dashboard.html",
            context! {
                user => user,
                filter => params,
                service_types => service_type_options(),
                dashboard => dashboard,
            },
        ),
        Err(e) => {
            e.log();
            page(
                e.status_code(),
                "dashboard.html",
                context! {
                    user => user,
                    filter => params,
                    service_types => service_type_options(),
                    error => e.user_message(),
                },
            )
        }
    }
}
