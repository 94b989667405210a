//! Error handling for helpdesk API responses.
//!
//! The backend reports failures as JSON bodies carrying a `mensaje` field
//! (sometimes `message` or `error`). [`ApiError`] extracts the most useful
//! text and converts into [`MesaError`].

use std::fmt;

use serde::Deserialize;

use crate::error::MesaError;

/// HTTP-level failure returned by the helpdesk API.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code
    pub status: reqwest::StatusCode,
    /// Human-readable error message
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    mensaje: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl ApiError {
    /// Build an error from a non-success status and the raw response body.
    pub fn from_body(status: reqwest::StatusCode, body: &str) -> Self {
        Self {
            status,
            message: extract_message(status, body),
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }
}

fn extract_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body)
        && let Some(message) = parsed
            .mensaje
            .or(parsed.message)
            .or(parsed.error)
            .filter(|m| !m.trim().is_empty())
    {
        return message;
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() <= 200 && !trimmed.starts_with('<') {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("unexpected response")
        .to_string()
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<ApiError> for MesaError {
    fn from(error: ApiError) -> Self {
        match error.status.as_u16() {
            401 | 403 => MesaError::Auth(error.message),
            status => MesaError::ApiStatus {
                status,
                message: error.message,
            },
        }
    }
}
