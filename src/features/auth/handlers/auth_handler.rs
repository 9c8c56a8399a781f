use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{
        sse::{Event, KeepAlive, Sse},
        AppendHeaders, IntoResponse,
    },
    Json,
};
use futures::Stream;
use std::sync::Arc;
use tokio_stream::{wrappers::WatchStream, StreamExt};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{LoginRequestDto, LoginResponseDto, SessionStatusDto};
use crate::features::auth::guards::{bearer_token, session_from_headers};
use crate::features::auth::model::Viewer;
use crate::features::auth::services::SessionGate;
use crate::features::dashboard::DashboardService;
use crate::shared::types::ApiResponse;

/// State for auth handlers
#[derive(Clone)]
pub struct AuthState {
    pub gate: Arc<SessionGate>,
    pub dashboard_service: Arc<DashboardService>,
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful; session cookie set", body = ApiResponse<LoginResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 502, description = "Auth provider unavailable")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AuthState>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<impl IntoResponse> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (id, session) = state.gate.sign_in(&dto.email, &dto.password).await?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, state.gate.session_cookie(id))]),
        Json(ApiResponse::success(
            Some(LoginResponseDto::from(session)),
            None,
            None,
        )),
    ))
}

/// Sign out the cookie session and/or revoke the bearer token
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Signed out; session cookie cleared", body = ApiResponse<SessionStatusDto>)
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    // Draft and dashboard state of the cookie session are released by the gate
    if let Some(id) = state.gate.session_id(&headers) {
        state.gate.sign_out(id).await;
    }

    if let Some(token) = bearer_token(&headers) {
        match state.gate.resolve_bearer(token).await {
            Ok(user) => {
                if let Err(e) = state.gate.revoke_bearer(token).await {
                    tracing::warn!("Failed to revoke bearer token: {}", e);
                }
                state
                    .dashboard_service
                    .forget_viewer(&Viewer::for_user(&user))
                    .await;
            }
            Err(e) => tracing::debug!("Ignoring unknown bearer token on logout: {}", e),
        }
    }

    (
        AppendHeaders([(header::SET_COOKIE, state.gate.clear_cookie())]),
        Json(ApiResponse::success(
            Some(SessionStatusDto::from(None)),
            Some("Signed out".to_string()),
            None,
        )),
    )
}

/// Current session state for the cookie on this request
#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "Session state", body = ApiResponse<SessionStatusDto>)
    ),
    tag = "auth"
)]
pub async fn get_session(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Json<ApiResponse<SessionStatusDto>> {
    let session = session_from_headers(&state.gate, &headers)
        .await
        .map(|current| current.session);
    Json(ApiResponse::success(Some(session.into()), None, None))
}

/// Stream session changes as server-sent events.
///
/// Emits the current state first, then one `session` event per change. The stream
/// ends after sign-out or expiry.
#[utoipa::path(
    get,
    path = "/api/session/events",
    responses(
        (status = 200, description = "Event stream of SessionStatusDto payloads", content_type = "text/event-stream"),
        (status = 401, description = "No live session")
    ),
    tag = "auth"
)]
pub async fn session_events(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>>> {
    let id = state
        .gate
        .session_id(&headers)
        .ok_or_else(|| AppError::Unauthorized("Session required".to_string()))?;
    if !state.gate.is_authenticated(id).await {
        return Err(AppError::Unauthorized("Session required".to_string()));
    }
    let receiver = state
        .gate
        .subscribe(id)
        .await
        .ok_or_else(|| AppError::Unauthorized("Session required".to_string()))?;

    let stream = WatchStream::new(receiver).map(|session| {
        Event::default()
            .event("session")
            .json_data(SessionStatusDto::from(session))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
