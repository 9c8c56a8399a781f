use crate::features::auth::handlers::{self, AuthState};
use axum::{
    routing::{get, post},
    Router,
};

/// Auth and session routes (no guard; each handler resolves the caller itself)
pub fn routes(state: AuthState) -> Router {
    Router::new()
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/session", get(handlers::get_session))
        .route("/api/session/events", get(handlers::session_events))
        .with_state(state)
}
