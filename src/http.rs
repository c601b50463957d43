use reqwest::StatusCode;

use crate::errors::RequestError;

/// Shape a non-2xx response into a [`RequestError`], pulling the most useful
/// message out of the body. Recognizes `{"message": ...}` and
/// `{"error": {"message": ...}}` / `{"error": "..."}` envelopes; anything else
/// falls back to the raw body or the status line.
pub(crate) fn parse_request_error_parts(status: StatusCode, body: String) -> RequestError {
    let status_code = status.as_u16();
    let status_text = status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string();

    if body.trim().is_empty() {
        return RequestError::new(status_text).with_status(status_code);
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
        let message = value
            .get("message")
            .and_then(|v| v.as_str())
            .or_else(|| {
                value
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|v| v.as_str())
            })
            .or_else(|| value.get("error").and_then(|v| v.as_str()));
        if let Some(message) = message {
            return RequestError::new(message).with_status(status_code);
        }
    }

    RequestError::new(body).with_status(status_code)
}
