//! JSON endpoints for sending a message and clearing history.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use banter_types::error::{ChatError, ValidationError};

use crate::http::error::AppError;
use crate::http::session::BrowserSession;
use crate::state::AppState;

/// POST /send/
///
/// Body: `{"message": "..."}`. The raw body is parsed here so malformed JSON
/// gets the same `{"error": ...}` shape as every other failure.
pub async fn send_message(
    State(state): State<AppState>,
    session: BrowserSession,
    body: Bytes,
) -> Response {
    let result = send_inner(&state, &session.session_id, &body).await;
    (session.cookie, result).into_response()
}

async fn send_inner(state: &AppState, session_id: &str, body: &[u8]) -> Result<Json<Value>, AppError> {
    let message = parse_message(body)?;
    let turn = state.chat_service.send(session_id, &message).await?;

    Ok(Json(json!({
        "success": true,
        "ai_response": turn.ai_response,
        "timestamp": turn.display_timestamp(),
        "message_id": turn.id,
    })))
}

/// Extract the `message` field. A missing or null field reads as empty and
/// is rejected later as an empty message.
fn parse_message(body: &[u8]) -> Result<String, ChatError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ValidationError::MalformedPayload(e.to_string()))?;

    let Value::Object(fields) = value else {
        return Err(ValidationError::MalformedPayload("expected a JSON object".into()).into());
    };

    match fields.get("message") {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(ValidationError::MalformedPayload("`message` must be a string".into()).into()),
    }
}

/// POST /clear/
pub async fn clear_history(State(state): State<AppState>, session: BrowserSession) -> Response {
    let result = state
        .chat_service
        .clear(&session.session_id)
        .await
        .map(|deleted| {
            Json(json!({
                "success": true,
                "message": "Chat history cleared",
                "deleted": deleted,
            }))
        })
        .map_err(AppError::Clear);

    (session.cookie, result).into_response()
}
