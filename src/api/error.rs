//! Error taxonomy for REST calls.

use std::collections::BTreeMap;

use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::validation::ValidationErrors;

/// Failure of a REST call, after the one-shot refresh has been attempted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The server could not be reached.
    #[error("network error: {0}")]
    Network(String),
    /// 401 on a public endpoint (e.g. rejected login).
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// 401 on a protected endpoint that survived the refresh attempt, or the
    /// refresh itself failed. Callers must log out.
    #[error("session expired")]
    SessionExpired,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// Client-side schema failure, or a 400/422 from the server.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
    /// The request could not be built (bad path or unserializable body).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn network(e: impl std::fmt::Display) -> Self {
        Self::Network(e.to_string())
    }

    pub fn decode(e: impl std::fmt::Display) -> Self {
        Self::Decode(e.to_string())
    }

    /// Failures where the data could not be fetched at all, as opposed to
    /// the server answering with a definite refusal.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Server { .. } | Self::NotFound(_) | Self::Decode(_)
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::decode(e)
        } else {
            Self::network(e)
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Error body shapes the backend is known to send:
/// `{"error": ".."}`, `{"message": ".."}`, optionally with
/// `"errors": {"field": ".."}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
    #[serde(alias = "fields")]
    errors: Option<BTreeMap<String, serde_json::Value>>,
}

impl ErrorBody {
    fn summary(&self) -> Option<String> {
        self.error.clone().or_else(|| self.message.clone())
    }
}

/// Map a non-success response onto the taxonomy. Successful responses are
/// returned untouched.
pub async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().path().to_string();
    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let summary = body
        .summary()
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

    debug!(status = status.as_u16(), path = %url, error = %summary, "Request rejected");

    Err(match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            let mut errors = ValidationErrors::new();
            for (field, message) in body.errors.iter().flatten() {
                let message = match message {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Array(items) => items
                        .iter()
                        .filter_map(|v| v.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                    other => other.to_string(),
                };
                errors.add(field.clone(), message);
            }
            if body.summary().is_some() || errors.is_empty() {
                errors.set_form(summary);
            }
            ApiError::Validation(errors)
        }
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(summary),
        StatusCode::FORBIDDEN => ApiError::Forbidden(summary),
        StatusCode::NOT_FOUND => ApiError::NotFound(summary),
        _ => ApiError::Server {
            status: status.as_u16(),
            message: summary,
        },
    })
}
