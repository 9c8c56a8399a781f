use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Form,
};
use minijinja::context;
use serde::Deserialize;

use crate::core::error::{AppError, Result};
use crate::features::views::handlers::ViewState;
use crate::shared::constants::{DEFAULT_ROUTE, LOGIN_ROUTE};
use crate::shared::views::page;

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Only same-site paths are followed after login
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => DEFAULT_ROUTE,
    }
}

fn render_login(
    status: StatusCode,
    error: Option<&str>,
    email: &str,
    next: Option<&str>,
) -> Result<Response> {
    page(
        status,
        "login.html",
        context! { error => error, email => email, next => next },
    )
}

/// Login page; signed-in users go straight to the form
pub async fn show_login(
    State(state): State<ViewState>,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> Result<Response> {
    if let Some(id) = state.gate.session_id(&headers) {
        if state.gate.is_authenticated(id).await {
            return Ok(Redirect::to(DEFAULT_ROUTE).into_response());
        }
    }
    render_login(StatusCode::OK, None, "", query.next.as_deref())
}

pub async fn submit_login(
    State(state): State<ViewState>,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match state.gate.sign_in(&form.email, &form.password).await {
        Ok((id, _)) => {
            let target = safe_next(form.next.as_deref());
            Ok((
                AppendHeaders([(header::SET_COOKIE, state.gate.session_cookie(id))]),
                Redirect::to(target),
            )
                .into_response())
        }
        Err(e) => {
            e.log();
            let message = match &e {
                AppError::Unauthorized(_) | AppError::Validation(_) => "E-mail ou senha inválidos.",
                _ => "Serviço de autenticação indisponível. Tente novamente.",
            };
            render_login(
                e.status_code(),
                Some(message),
                form.email.trim(),
                form.next.as_deref(),
            )
        }
    }
}

/// Sign out, drop the draft and return to the login page
pub async fn logout(State(state): State<ViewState>, headers: HeaderMap) -> Response {
    if let Some(id) = state.gate.session_id(&headers) {
        state.gate.sign_out(id).await;
    }

    (
        AppendHeaders([(header::SET_COOKIE, state.gate.clear_cookie())]),
        Redirect::to(LOGIN_ROUTE),
    )
        .into_response()
}
