//! JSON relay forwarding free-form messages to the chat webhook.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

use crate::application::{error::ErrorReport, notify::NotifyError};

use super::HttpState;

const SOURCE: &str = "infra::http::api::relay_message";

#[derive(Debug, Serialize)]
struct RelaySuccess {
    success: bool,
}

#[derive(Debug, Serialize)]
struct RelayErrorBody {
    error: &'static str,
}

#[derive(Debug)]
pub struct RelayError {
    status: StatusCode,
    message: &'static str,
    detail: String,
}

impl RelayError {
    fn unreadable(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal server error",
            detail: detail.into(),
        }
    }

    fn not_configured() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Webhook URL not configured",
            detail: NotifyError::Configuration.to_string(),
        }
    }

    fn missing_message(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Message is required",
            detail: detail.into(),
        }
    }

    fn send_failed(err: &NotifyError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Failed to send notification",
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = RelayErrorBody {
            error: self.message,
        };
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message(SOURCE, self.status, self.detail).attach(&mut response);
        response
    }
}

/// `POST /api/notify`. The body is read as JSON whatever its content type.
/// An unreadable body is an internal error. Configuration is checked before
/// the message.
pub async fn relay_message(
    State(state): State<HttpState>,
    body: Bytes,
) -> Result<Response, RelayError> {
    let payload: Value = serde_json::from_slice(&body).map_err(|err| {
        warn!(
            target = "folio::http::api",
            error = %err,
            "relay body is not JSON"
        );
        RelayError::unreadable(format!("request body is not JSON: {err}"))
    })?;
    let message = relay_text(&payload)?;

    if !state.notifier.is_configured() {
        return Err(RelayError::not_configured());
    }

    let Some(message) = message else {
        return Err(RelayError::missing_message("message field is empty"));
    };

    match state.notifier.relay(&message).await {
        Ok(()) => Ok((StatusCode::OK, Json(RelaySuccess { success: true })).into_response()),
        Err(NotifyError::Configuration) => Err(RelayError::not_configured()),
        Err(NotifyError::Validation(detail)) => Err(RelayError::missing_message(detail)),
        Err(err) => {
            error!(
                target = "folio::http::api",
                error = %err,
                "webhook relay failed"
            );
            Err(RelayError::send_failed(&err))
        }
    }
}

/// Text to forward from the `message` member. Missing, null, false, zero and
/// blank values count as no message; other non-strings are sent as JSON text.
fn relay_text(payload: &Value) -> Result<Option<String>, RelayError> {
    let message = match payload {
        Value::Null => return Err(RelayError::unreadable("request body is null")),
        Value::Object(members) => members.get("message"),
        _ => None,
    };

    Ok(match message {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::Number(number)) if number.as_f64() == Some(0.0) => None,
        Some(Value::String(text)) if text.trim().is_empty() => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn falsy_messages_are_missing() {
        for payload in [
            json!({}),
            json!({ "message": null }),
            json!({ "message": false }),
            json!({ "message": 0 }),
            json!({ "message": "  " }),
            json!("message"),
        ] {
            assert_eq!(relay_text(&payload).expect("readable"), None, "{payload}");
        }
    }

    #[test]
    fn non_string_messages_are_forwarded_as_json_text() {
        assert_eq!(
            relay_text(&json!({ "message": 123 })).expect("readable"),
            Some("123".to_string())
        );
        assert_eq!(
            relay_text(&json!({ "message": ["a"] })).expect("readable"),
            Some(r#"["a"]"#.to_string())
        );
    }

    #[test]
    fn null_body_is_an_internal_error() {
        let err = relay_text(&Value::Null).expect_err("null body");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
    }
}
