//! Server-rendered page support.

pub mod engine;

pub use engine::{render_view, TemplateError};

use axum::response::{Html, IntoResponse, Response};
use axum::http::StatusCode;
use minijinja::Value;

use crate::core::error::AppError;

impl From<TemplateError> for AppError {
    fn from(e: TemplateError) -> Self {
        AppError::Internal(e.to_string())
    }
}

/// Render a page into an HTML response with the given status.
pub fn page(status: StatusCode, template_name: &str, ctx: Value) -> Result<Response, AppError> {
    let body = render_view(template_name, ctx)?;
    Ok((status, Html(body)).into_response())
}
