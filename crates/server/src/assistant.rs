use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use ventura_agent::runtime::{AssistantReply, AssistantRuntime};
use ventura_core::domain::conversation::{ConversationTurn, TurnRole};
use ventura_core::errors::{AssistantError, InterfaceError};

use crate::auth::Authenticator;

#[derive(Clone)]
pub struct AssistantState {
    pub runtime: Arc<AssistantRuntime>,
    pub authenticator: Authenticator,
}

pub fn router(state: AssistantState) -> Router {
    Router::new().route("/api/assistant/chat", post(chat)).with_state(state)
}

/// `{ "error": ... }` body with the status the interface error maps to.
pub struct ApiError(pub InterfaceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}

/// Auth runs before the body is looked at, so the body is taken raw.
pub async fn chat(
    State(state): State<AssistantState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AssistantReply>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let span = info_span!("assistant_chat", correlation_id = %correlation_id);
    handle_chat(state, headers, body, correlation_id).instrument(span).await
}

async fn handle_chat(
    state: AssistantState,
    headers: HeaderMap,
    body: Bytes,
    correlation_id: String,
) -> Result<Json<AssistantReply>, ApiError> {
    let caller = state.authenticator.authenticate(&headers).await.map_err(|error| {
        warn!(
            event_name = "assistant.chat.unauthorized",
            correlation_id = %correlation_id,
            reason = %error,
            "rejected assistant request"
        );
        ApiError(error.into_interface(&correlation_id))
    })?;

    let transcript = parse_transcript(&body).map_err(|message| {
        warn!(
            event_name = "assistant.chat.bad_request",
            correlation_id = %correlation_id,
            reason = %message,
            "rejected assistant request body"
        );
        ApiError(InterfaceError::bad_request(message, &correlation_id))
    })?;

    info!(
        event_name = "assistant.chat.accepted",
        correlation_id = %correlation_id,
        user_id = caller.user_id.0,
        turns = transcript.len(),
        "assistant request accepted"
    );

    state.runtime.respond(&caller, &transcript).await.map(Json).map_err(|failure| {
        match &failure {
            AssistantError::Configuration(detail) => error!(
                event_name = "assistant.chat.unconfigured",
                correlation_id = %correlation_id,
                detail = %detail,
                "assistant model credential missing"
            ),
            other => error!(
                event_name = "assistant.chat.failed",
                correlation_id = %correlation_id,
                error = %other,
                "assistant turn failed"
            ),
        }
        ApiError(failure.into_interface(&correlation_id))
    })
}

/// Validates `{ "messages": [{ "role", "content" }, ...] }`.
pub fn parse_transcript(body: &[u8]) -> Result<Vec<ConversationTurn>, String> {
    let payload: Value =
        serde_json::from_slice(body).map_err(|_| "request body must be valid JSON".to_owned())?;

    let messages = payload
        .get("messages")
        .ok_or_else(|| "`messages` is required".to_owned())?
        .as_array()
        .ok_or_else(|| "`messages` must be an array".to_owned())?;

    messages
        .iter()
        .enumerate()
        .map(|(index, message)| {
            let role = message
                .get("role")
                .and_then(Value::as_str)
                .ok_or_else(|| format!("messages[{index}].role must be a string"))?
                .parse::<TurnRole>()
                .map_err(|reason| format!("messages[{index}]: {reason}"))?;
            let content = message
                .get("content")
                .and_then(Value::as_str)
                .ok_or_else(|| format!("messages[{index}].content must be a string"))?;
            Ok(ConversationTurn::new(role, content))
        })
        .collect()
}
