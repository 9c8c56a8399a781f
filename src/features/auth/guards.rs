//! Request guards for pages and the JSON API.
//!
//! Both guards attach `AuthenticatedUser` and `Viewer` to request extensions;
//! cookie-based requests also get `CurrentSession`.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::core::error::AppError;
use crate::features::auth::model::{CurrentSession, Viewer};
use crate::features::auth::services::SessionGate;
use crate::shared::constants::{DEFAULT_ROUTE, LOGIN_ROUTE};

/// Look up the live session named by the request's cookie
pub async fn session_from_headers(
    gate: &SessionGate,
    headers: &HeaderMap,
) -> Option<CurrentSession> {
    let id = gate.session_id(headers)?;
    let session = gate.current(id).await?;
    Some(CurrentSession { id, session })
}

fn attach_session(request: &mut Request, current: CurrentSession) {
    let extensions = request.extensions_mut();
    extensions.insert(current.session.user.clone());
    extensions.insert(Viewer::for_session(current.id));
    extensions.insert(current);
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Login URL that returns to `target` after signing in
pub fn login_redirect(target: &str) -> Redirect {
    if target == DEFAULT_ROUTE {
        return Redirect::to(LOGIN_ROUTE);
    }
    Redirect::to(&format!(
        "{}?next={}",
        LOGIN_ROUTE,
        urlencoding::encode(target)
    ))
}

/// Guard for server-rendered pages: unauthenticated visitors go to the login page
pub async fn require_page_session(
    State(gate): State<Arc<SessionGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    match session_from_headers(&gate, request.headers()).await {
        Some(current) => {
            attach_session(&mut request, current);
            next.run(request).await
        }
        None => {
            let target = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or(DEFAULT_ROUTE);
            tracing::debug!("No session for {}, redirecting to login", target);
            login_redirect(target).into_response()
        }
    }
}

/// Guard for API routes: accepts the session cookie or a provider bearer token
pub async fn require_api_auth(
    State(gate): State<Arc<SessionGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(current) = session_from_headers(&gate, request.headers()).await {
        attach_session(&mut request, current);
        return next.run(request).await;
    }

    let Some(token) = bearer_token(request.headers()) else {
        return AppError::Unauthorized("Authentication required".to_string()).into_response();
    };

    match gate.resolve_bearer(token).await {
        Ok(user) => {
            let extensions = request.extensions_mut();
            extensions.insert(Viewer::for_user(&user));
            extensions.insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
