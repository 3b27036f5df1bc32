//! HTTP request handlers.

use axum::{
    body::Bytes,
    extract::{Extension, State},
    response::IntoResponse,
    Json,
};

use super::server::{AppState, RequestId};
use super::types::{AskRequest, AskResponse};
use crate::error::Error;

/// Handle POST /ask.
///
/// Malformed bodies are rejected with 400 before any provider call; a
/// provider failure still yields 200 with the fallback text.
pub async fn ask(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<AskResponse>, Error> {
    let Some(message) = parse_message(&body) else {
        tracing::debug!(request_id = %request_id.0, "Rejected malformed request body");
        return Err(Error::BadRequest("missing message field".to_string()));
    };

    tracing::info!(
        request_id = %request_id.0,
        message_len = message.len(),
        "Received ask request"
    );

    let reply = state.recommender.recommend(&message).await;

    Ok(Json(AskResponse {
        response: reply.into_text(),
    }))
}

/// Extract the `message` field from a request body.
///
/// Returns None when the body is absent, not valid JSON, or has no string
/// `message` field. The distinction is not surfaced to the client.
fn parse_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<AskRequest>(body).ok()?.message
}

/// Handle GET /health.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "medrelay"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_message_accepts_valid_body() {
        let message = parse_message(br#"{"message": "I have a headache"}"#);
        assert_eq!(message.as_deref(), Some("I have a headache"));
    }

    #[test]
    fn parse_message_accepts_empty_string() {
        let message = parse_message(br#"{"message": ""}"#);
        assert_eq!(message.as_deref(), Some(""));
    }

    #[test]
    fn parse_message_ignores_unknown_fields() {
        let message = parse_message(br#"{"message": "fever", "session": "abc"}"#);
        assert_eq!(message.as_deref(), Some("fever"));
    }

    #[test]
    fn parse_message_rejects_empty_object() {
        assert!(parse_message(br#"{}"#).is_none());
    }

    #[test]
    fn parse_message_rejects_empty_body() {
        assert!(parse_message(b"").is_none());
    }

    #[test]
    fn parse_message_rejects_non_json() {
        assert!(parse_message(b"I have a headache").is_none());
    }

    #[test]
    fn parse_message_rejects_non_string_message() {
        assert!(parse_message(br#"{"message": 42}"#).is_none());
        assert!(parse_message(br#"{"message": null}"#).is_none());
        assert!(parse_message(br#"{"message": ["fever"]}"#).is_none());
    }

    #[test]
    fn parse_message_rejects_json_array() {
        assert!(parse_message(br#"["message"]"#).is_none());
    }
}
