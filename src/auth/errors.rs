//! Authentication error types.

use crate::api::ApiError;

/// Failures of user-facing auth operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    /// The login response lacked a token, a user, or a user type.
    #[error("unexpected login response: {0}")]
    UnexpectedResponse(String),
    #[error("network error: {0}")]
    NetworkError(String),
    #[error("session expired")]
    SessionExpired,
    #[error("server error: {0}")]
    Server(String),
}

impl AuthError {
    /// Map an API failure of the login call.
    pub(super) fn from_login(e: ApiError) -> Self {
        match e {
            ApiError::Network(msg) => Self::NetworkError(msg),
            ApiError::Unauthorized(_) | ApiError::Forbidden(_) | ApiError::Validation(_) => {
                Self::InvalidCredentials
            }
            ApiError::SessionExpired => Self::SessionExpired,
            ApiError::Decode(msg) => Self::UnexpectedResponse(msg),
            ApiError::NotFound(msg) | ApiError::InvalidRequest(msg) => Self::Server(msg),
            ApiError::Server { status, message } => Self::Server(format!("{}: {}", status, message)),
        }
    }
}
