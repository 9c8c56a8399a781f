use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use minijinja::context;
use serde::Deserialize;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::CurrentSession;
use crate::features::views::drafts::{ReportDraft, ReportFormInput};
use crate::features::views::handlers::{service_type_options, ViewState};
use crate::shared::constants::{DEFAULT_ROUTE, INFRACTION_CATALOG, SECTORS};
use crate::shared::validation::PROTOCOL_NUMBER_REGEX;
use crate::shared::views::page;

#[derive(Debug, Default, Deserialize)]
pub struct FormQuery {
    /// Receipt of the submission that redirected here
    pub protocol: Option<String>,
}

fn render_form(
    status: StatusCode,
    current: &CurrentSession,
    draft: &ReportDraft,
    error: Option<String>,
    protocol: Option<&str>,
) -> Result<Response> {
    page(
        status,
        "form.html",
        context! {
            user => current.session.user.display_name,
            draft => draft,
            service_types => service_type_options(),
            sectors => SECTORS,
            infraction_catalog => INFRACTION_CATALOG,
            error => error,
            protocol => protocol,
        },
    )
}

/// Re-render the form with the session's draft and a form-level error
async fn form_error(state: &ViewState, current: &CurrentSession, error: AppError) -> Result<Response> {
    error.log();
    let draft = state.drafts.get(current.id).await;
    render_form(
        error.status_code(),
        current,
        &draft,
        Some(error.user_message()),
        None,
    )
}

/// Report form with the session's draft
pub async fn show_form(
    State(state): State<ViewState>,
    current: CurrentSession,
    Query(query): Query<FormQuery>,
) -> Result<Response> {
    let draft = state.drafts.get(current.id).await;
    let protocol = query
        .protocol
        .as_deref()
        .filter(|p| PROTOCOL_NUMBER_REGEX.is_match(p));
    render_form(StatusCode::OK, &current, &draft, None, protocol)
}

pub async fn add_infraction(
    State(state): State<ViewState>,
    current: CurrentSession,
    Form(input): Form<ReportFormInput>,
) -> Result<Response> {
    let outcome = state
        .drafts
        .update(current.id, |draft| {
            draft.apply_fields(&input)?;
            draft.add_infraction(
                input.infraction_type.as_deref().unwrap_or_default(),
                input.quantity.as_deref().unwrap_or_default(),
            )
        })
        .await;

    match outcome {
        Ok(()) => Ok(Redirect::to(DEFAULT_ROUTE).into_response()),
        Err(e) => form_error(&state, &current, e).await,
    }
}

pub async fn remove_infraction(
    State(state): State<ViewState>,
    current: CurrentSession,
    Path(index): Path<usize>,
    Form(input): Form<ReportFormInput>,
) -> Result<Response> {
    let outcome = state
        .drafts
        .update(current.id, |draft| {
            draft.apply_fields(&input)?;
            draft.remove_infraction(index);
            Ok::<(), AppError>(())
        })
        .await;

    match outcome {
        Ok(()) => Ok(Redirect::to(DEFAULT_ROUTE).into_response()),
        Err(e) => form_error(&state, &current, e).await,
    }
}

/// Submit the draft. On failure the draft is kept for a retry.
pub async fn submit_report(
    State(state): State<ViewState>,
    current: CurrentSession,
    Form(input): Form<ReportFormInput>,
) -> Result<Response> {
    let applied = state
        .drafts
        .update(current.id, |draft| {
            draft.apply_fields(&input).map(|_| draft.clone())
        })
        .await;
    let draft = match applied {
        Ok(draft) => draft,
        Err(e) => return form_error(&state, &current, e).await,
    };

    let submission = draft.to_submission(current.session.user.display_name.clone());
    match state.report_service.submit(submission).await {
        Ok(stored) => {
            state.drafts.reset(current.id).await;
            Ok(Redirect::to(&format!(
                "{}?protocol={}",
                DEFAULT_ROUTE, stored.report.protocol_number
            ))
            .into_response())
        }
        Err(e) => form_error(&state, &current, e).await,
    }
}
