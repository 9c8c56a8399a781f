use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::auth::guards::require_page_session;
use crate::features::views::handlers::{self, ViewState};

/// Server-rendered pages. Everything except login/logout requires a session.
pub fn routes(state: ViewState) -> Router {
    let gate = Arc::clone(&state.gate);

    let protected = Router::new()
        .route("/", get(handlers::show_form))
        .route("/form/infractions", post(handlers::add_infraction))
        .route(
            "/form/infractions/{index}/delete",
            post(handlers::remove_infraction),
        )
        .route("/form/submit", post(handlers::submit_report))
        .route("/dashboard", get(handlers::show_dashboard))
        .route_layer(from_fn_with_state(gate, require_page_session));

    Router::new()
        .route(
            "/login",
            get(handlers::show_login).post(handlers::submit_login),
        )
        .route("/logout", post(handlers::logout))
        .merge(protected)
        .with_state(state)
}
