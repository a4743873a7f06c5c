//! Chat page rendering.
//!
//! The template is embedded at compile time and rendered with minijinja;
//! `.html` templates are auto-escaped, so stored messages are safe to show.

use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use minijinja::{context, Environment};
use serde::Serialize;

use banter_types::turn::ChatTurn;

use crate::http::error::AppError;
use crate::http::session::BrowserSession;
use crate::state::AppState;

const INDEX_TEMPLATE: &str = "index.html";

/// Build the template environment with the embedded chat page.
pub fn build_templates() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(INDEX_TEMPLATE, include_str!("../../../templates/index.html"))?;
    Ok(env)
}

#[derive(Serialize)]
struct TurnView<'a> {
    id: i64,
    user_message: &'a str,
    ai_response: &'a str,
    timestamp: String,
}

impl<'a> From<&'a ChatTurn> for TurnView<'a> {
    fn from(turn: &'a ChatTurn) -> Self {
        Self {
            id: turn.id,
            user_message: &turn.user_message,
            ai_response: &turn.ai_response,
            timestamp: turn.display_timestamp(),
        }
    }
}

/// GET /
///
/// Resolves the session and renders its recent history oldest-first.
pub async fn show_page(State(state): State<AppState>, session: BrowserSession) -> Response {
    let rendered = render_page(&state, &session.session_id).await;
    (session.cookie, rendered).into_response()
}

async fn render_page(state: &AppState, session_id: &str) -> Result<Html<String>, AppError> {
    let history = state.chat_service.history(session_id).await?;
    let turns: Vec<TurnView<'_>> = history.iter().map(TurnView::from).collect();

    let template = state.templates.get_template(INDEX_TEMPLATE)?;
    let html = template.render(context! {
        chat_history => turns,
        session_id => session_id,
    })?;

    Ok(Html(html))
}
