//! Catch-all server rendering: run the component tree for the requested
//! location and either redirect or wrap the markup in the page template.

use askama::Template;
use axum::{
    extract::{OriginalUri, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{info, instrument};

use crate::{errors::AppError, state::AppState};

pub mod shell;
pub mod theme;

pub use shell::AppShell;
pub use theme::{StyleRegistry, Theme};

/// Outcome of rendering the component tree for one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderResult {
    Markup(String),
    /// The tree asked to navigate elsewhere instead of producing a page.
    Redirect(String),
}

/// The UI component tree. Styles used by the rendered markup are registered
/// into `styles` while rendering.
pub trait Renderer: Send + Sync {
    fn render(&self, location: &str, theme: &Theme, styles: &mut StyleRegistry) -> RenderResult;
}

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate<'a> {
    pub markup: &'a str,
    pub css: &'a str,
}

#[instrument(skip(state))]
pub async fn render_page(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, AppError> {
    let location = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let theme = Theme::default();
    let mut styles = StyleRegistry::new();

    let markup = match state.renderer.render(location, &theme, &mut styles) {
        RenderResult::Redirect(to) => {
            info!(%location, %to, "render redirected");
            return Ok(Redirect::to(&to).into_response());
        }
        RenderResult::Markup(markup) => markup,
    };

    let css = styles.to_css();
    let page = PageTemplate {
        markup: &markup,
        css: &css,
    }
    .render()
    .map_err(|e| AppError::Internal(anyhow::anyhow!("page template: {e}")))?;

    Ok((StatusCode::OK, Html(page)).into_response())
}
