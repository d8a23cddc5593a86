//! API error response parsing.
//!
//! Handles the error envelopes OpenAI-compatible servers return:
//! - Standard: `{"error": {"message": "...", "type": "..."}}`
//! - Detail:   `{"detail": "..."}`
//! - Flat:     `{"message": "...", "code": "..."}`

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::Value;
use whisper_core::retry::parse_retry_after_header;

use crate::errors::SpeechError;

/// Parsed API error information.
pub struct ApiErrorInfo {
    /// Human-readable error message.
    pub message: String,
    /// Provider error type/code.
    pub code: Option<String>,
    /// Whether the request can be retried (429 or 5xx).
    pub retryable: bool,
}

/// Parse an API error body, falling back to the raw text.
pub fn parse_api_error(body: &str, status: u16) -> ApiErrorInfo {
    let retryable = status == 429 || status >= 500;

    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = json["error"]["message"].as_str() {
            let code = json["error"]["type"]
                .as_str()
                .or_else(|| json["error"]["code"].as_str())
                .map(String::from);
            return ApiErrorInfo {
                message: msg.to_string(),
                code,
                retryable,
            };
        }

        if let Some(msg) = json["detail"].as_str().or_else(|| json["message"].as_str()) {
            return ApiErrorInfo {
                message: msg.to_string(),
                code: json["code"].as_str().map(String::from),
                retryable,
            };
        }
    }

    ApiErrorInfo {
        message: format!("HTTP {status}: {}", body.trim()),
        code: None,
        retryable,
    }
}

/// Map a non-success response to a [`SpeechError`].
pub fn error_from_response(status: StatusCode, headers: &HeaderMap, body: &str) -> SpeechError {
    let info = parse_api_error(body, status.as_u16());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SpeechError::Auth {
            message: info.message,
        },
        StatusCode::TOO_MANY_REQUESTS => SpeechError::RateLimited {
            retry_after_ms: headers
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after_header),
            message: info.message,
        },
        _ => SpeechError::Api {
            status: status.as_u16(),
            message: info.message,
            code: info.code,
            retryable: info.retryable,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use reqwest::header::HeaderValue;

    #[test]
    fn standard_envelope() {
        let body = r#"{"error":{"message":"Invalid file format.","type":"invalid_request_error"}}"#;
        let info = parse_api_error(body, 400);
        assert_eq!(info.message, "Invalid file format.");
        assert_eq!(info.code.as_deref(), Some("invalid_request_error"));
        assert!(!info.retryable);
    }

    #[test]
    fn detail_envelope() {
        let info = parse_api_error(r#"{"detail":"upstream overloaded"}"#, 503);
        assert_eq!(info.message, "upstream overloaded");
        assert!(info.retryable);
    }

    #[test]
    fn non_json_body() {
        let info = parse_api_error("Bad Gateway", 502);
        assert_eq!(info.message, "HTTP 502: Bad Gateway");
        assert!(info.retryable);
    }

    #[test]
    fn maps_statuses_to_variants() {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(RETRY_AFTER, HeaderValue::from_static("3"));

        assert_matches!(
            error_from_response(StatusCode::UNAUTHORIZED, &HeaderMap::new(), "{}"),
            SpeechError::Auth { .. }
        );
        assert_matches!(
            error_from_response(StatusCode::TOO_MANY_REQUESTS, &headers, "{}"),
            SpeechError::RateLimited { retry_after_ms: Some(3000), .. }
        );
        assert_matches!(
            error_from_response(StatusCode::INTERNAL_SERVER_ERROR, &HeaderMap::new(), "boom"),
            SpeechError::Api { status: 500, retryable: true, .. }
        );
        assert_matches!(
            error_from_response(StatusCode::BAD_REQUEST, &HeaderMap::new(), "nope"),
            SpeechError::Api { status: 400, retryable: false, .. }
        );
    }
}
