//! Template engine for the server-rendered pages (login, report form, dashboard).
//!
//! Templates live in `templates/views/` and use Jinja2 syntax. They are loaded once
//! into a process-wide environment on first use.

use minijinja::{AutoEscape, Environment, Value};
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Template directory relative to the project root
const TEMPLATE_DIR: &str = "templates/views";

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);

    let template_path = Path::new(TEMPLATE_DIR);
    if template_path.exists() {
        load_templates_recursive(&mut env, template_path, template_path);
    } else {
        tracing::warn!("Template directory {} not found", TEMPLATE_DIR);
    }

    env
}

/// Recursively load all .html templates from a directory
fn load_templates_recursive(env: &mut Environment<'static>, base_path: &Path, current_path: &Path) {
    let Ok(entries) = std::fs::read_dir(current_path) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            load_templates_recursive(env, base_path, &path);
            continue;
        }
        if !path.extension().is_some_and(|ext| ext == "html") {
            continue;
        }

        let (Ok(relative), Ok(content)) =
            (path.strip_prefix(base_path), std::fs::read_to_string(&path))
        else {
            continue;
        };
        let template_name = relative.to_string_lossy().replace('\\', "/");
        // Leaked once at start-up; templates live for the whole process
        let static_name: &'static str = Box::leak(template_name.clone().into_boxed_str());
        let static_content: &'static str = Box::leak(content.into_boxed_str());
        if let Err(e) = env.add_template(static_name, static_content) {
            tracing::warn!("Failed to load template {}: {}", template_name, e);
        } else {
            tracing::debug!("Loaded template: {}", template_name);
        }
    }
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a page template with the given context.
///
/// ```ignore
/// let html = render_view("login.html", minijinja::context! { error => "Invalid credentials" })?;
/// ```
pub fn render_view(template_name: &str, ctx: Value) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}
