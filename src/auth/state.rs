//! Auth session state: the single writer of [`Session`].
//!
//! Everything else reads snapshots through [`AuthSession::subscribe`] or
//! [`AuthSession::snapshot`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::errors::AuthError;
use super::store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TokenStore, USER_TYPE_KEY};
use super::types::{Session, User, UserType};
use crate::api::{ApiClient, ApiError, LOGIN_PATH};
use crate::jwt;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Login response. Every field is optional here so that a missing one can
/// be reported as `UnexpectedResponse` instead of a decode error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<UserPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserPayload {
    #[serde(default)]
    email: Option<String>,
    user_type: Option<UserType>,
    #[serde(default, alias = "displayName")]
    name: Option<String>,
}

/// Owns the current [`Session`] and the persisted credential record.
pub struct AuthSession {
    api: ApiClient,
    tokens: Arc<dyn TokenStore>,
    state: watch::Sender<Session>,
}

impl AuthSession {
    /// Starts in the hydrating state (`is_loading`) until
    /// [`restore_from_storage`](Self::restore_from_storage) runs.
    pub fn new(api: ApiClient) -> Self {
        let tokens = api.tokens().clone();
        let (state, _) = watch::channel(Session::hydrating());
        Self { api, tokens, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Log in with email and password. On success the tokens and user type
    /// are persisted and the session becomes authenticated.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.last_error = None;
        });

        match self.try_login(email, password).await {
            Ok(session) => {
                info!(email, admin = session.is_admin, "Logged in");
                self.state.send_replace(session.clone());
                Ok(session)
            }
            Err(e) => {
                warn!(email, error = %e, "Login failed");
                self.state.send_modify(|s| {
                    s.is_loading = false;
                    s.last_error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let response: LoginResponse = self
            .api
            .post_json(LOGIN_PATH, &LoginRequest { email, password })
            .await
            .map_err(AuthError::from_login)?;

        let access_token = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::UnexpectedResponse("missing access token".into()))?;

        if jwt::is_expired(&access_token) {
            return Err(AuthError::UnexpectedResponse(
                "access token is expired or not a JWT".into(),
            ));
        }

        let user = match response.user {
            Some(payload) => {
                let user_type = payload.user_type.ok_or_else(|| {
                    AuthError::UnexpectedResponse("missing user type".into())
                })?;
                User {
                    email: payload.email.unwrap_or_else(|| email.to_string()),
                    user_type,
                    name: payload.name,
                }
            }
            None => jwt::decode(&access_token)
                .as_ref()
                .and_then(User::from_claims)
                .ok_or_else(|| AuthError::UnexpectedResponse("missing user".into()))?,
        };

        let refresh_token = response.refresh_token.filter(|t| !t.is_empty());
        if refresh_token.is_none() {
            debug!("Login response carried no refresh token");
        }

        self.tokens.set(ACCESS_TOKEN_KEY, &access_token);
        match &refresh_token {
            Some(token) => self.tokens.set(REFRESH_TOKEN_KEY, token),
            None => self.tokens.remove(REFRESH_TOKEN_KEY),
        }
        self.tokens.set(USER_TYPE_KEY, user.user_type.as_str());

        Ok(Session::authenticated(user, access_token, refresh_token))
    }

    /// Clear the session and the persisted credentials. Idempotent.
    pub fn logout(&self) -> Session {
        self.tokens.clear();
        let empty = Session::default();
        self.state.send_replace(empty.clone());
        debug!("Session cleared");
        empty
    }

    /// Hydrate from persisted storage. An expired token purges everything.
    pub fn restore_from_storage(&self) -> Session {
        let Some(access_token) = self.tokens.get(ACCESS_TOKEN_KEY) else {
            return self.logout();
        };

        if jwt::is_expired(&access_token) {
            info!("Stored access token expired, logging out");
            return self.logout();
        }

        let user = self.user_for_token(&access_token);
        let session = Session::authenticated(
            user,
            access_token,
            self.tokens.get(REFRESH_TOKEN_KEY),
        );
        self.state.send_replace(session.clone());
        session
    }

    /// React to a token change (e.g. the API client refreshed or cleared the
    /// access token). Expired or missing tokens log out preemptively; a new
    /// valid token replaces the session's while keeping user and refresh
    /// token.
    pub fn refresh_if_needed(&self) -> Session {
        let current = self.snapshot();
        let stored = self.tokens.get(ACCESS_TOKEN_KEY);

        match stored {
            None if current.is_authenticated => {
                info!("Access token removed, logging out");
                self.logout()
            }
            None => current,
            Some(token) if jwt::is_expired(&token) => {
                info!("Access token expired, logging out");
                self.logout()
            }
            Some(token) if current.access_token.as_deref() != Some(token.as_str()) => {
                if current.is_authenticated {
                    debug!("Adopting refreshed access token");
                    self.state.send_modify(|s| s.access_token = Some(token));
                    self.snapshot()
                } else {
                    self.restore_from_storage()
                }
            }
            Some(_) => current,
        }
    }

    /// Forward an API failure observed by any caller. A terminal auth
    /// failure logs out and records why.
    pub fn handle_api_error(&self, error: &ApiError) {
        if *error == ApiError::SessionExpired {
            self.logout();
            self.state
                .send_modify(|s| s.last_error = Some(AuthError::SessionExpired.to_string()));
        }
    }

    /// Identity from the token claims, falling back to the persisted user
    /// type when the token does not carry one.
    fn user_for_token(&self, access_token: &str) -> User {
        let claims = jwt::decode(access_token).unwrap_or_default();
        User::from_claims(&claims).unwrap_or_else(|| User {
            email: claims.email.clone().unwrap_or_default(),
            user_type: self
                .tokens
                .get(USER_TYPE_KEY)
                .map(UserType::from)
                .unwrap_or_default(),
            name: claims.name.clone(),
        })
    }
}
