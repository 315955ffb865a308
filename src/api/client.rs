//! HTTP client with bearer injection and a one-shot refresh on 401.
//!
//! Protected requests carry `Authorization: Bearer <access token>` read from
//! the token store at send time. A 401 on a protected request that has not
//! been retried yet triggers one refresh and one retry. Concurrent 401s
//! rejected with the same stale token share a single refresh call.

use std::sync::Arc;

use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use super::endpoints::PublicEndpoints;
use super::error::{ApiError, check_status};
use super::refresh::RefreshStrategy;
use crate::auth::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TokenStore};

/// Interceptor state for one logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Idle,
    AwaitingRetryAfterRefresh,
}

/// Remembers which stale token the last failed refresh was for, so requests
/// queued behind it fail without refreshing again.
#[derive(Debug, Default)]
struct RefreshGate {
    failed_for: Option<Option<String>>,
}

/// REST client for the portfolio backend. Cheap to clone; clones share the
/// token store and the refresh gate.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    tokens: Arc<dyn TokenStore>,
    refresher: Arc<dyn RefreshStrategy>,
    public: Arc<PublicEndpoints>,
    gate: Arc<Mutex<RefreshGate>>,
}

impl ApiClient {
    /// `base` must end with '/' so relative paths resolve beneath it.
    pub fn new(
        http: reqwest::Client,
        base: Url,
        tokens: Arc<dyn TokenStore>,
        refresher: Arc<dyn RefreshStrategy>,
    ) -> Self {
        Self {
            http,
            base,
            tokens,
            refresher,
            public: Arc::new(PublicEndpoints::default()),
            gate: Arc::new(Mutex::new(RefreshGate::default())),
        }
    }

    pub fn with_public_endpoints(mut self, public: PublicEndpoints) -> Self {
        self.public = Arc::new(public);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn is_public(&self, method: &Method, path: &str) -> bool {
        self.public.is_public(method, path)
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidRequest(format!("{}: {}", path, e)))
    }

    async fn send(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(ApiError::network)
    }

    /// Issue a request. Non-401 responses pass through unchanged, whatever
    /// their status; a 401 on a protected path is refreshed and retried once.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        let url = self.url(path)?;
        let public = self.is_public(&method, path);
        let mut token = if public {
            None
        } else {
            self.tokens.get(ACCESS_TOKEN_KEY)
        };
        let mut attempt = Attempt::Idle;

        loop {
            let response = self.send(&method, &url, body, token.as_deref()).await?;
            let unauthorized = response.status() == StatusCode::UNAUTHORIZED;

            match attempt {
                Attempt::Idle if unauthorized && !public => {
                    debug!(%method, path, "Access token rejected, refreshing");
                    attempt = Attempt::AwaitingRetryAfterRefresh;
                    let fresh = self.refresh_after_unauthorized(token.as_deref()).await?;
                    token = Some(fresh);
                }
                _ => return Ok(response),
            }
        }
    }

    /// Obtain a token to retry with, refreshing at most once per stale token.
    async fn refresh_after_unauthorized(&self, stale: Option<&str>) -> Result<String, ApiError> {
        let mut gate = self.gate.lock().await;

        // Another request already replaced the token we were rejected with.
        if let Some(current) = self.tokens.get(ACCESS_TOKEN_KEY) {
            if Some(current.as_str()) != stale {
                debug!("Using access token refreshed by a concurrent request");
                return Ok(current);
            }
        }

        if gate.failed_for.as_ref().is_some_and(|f| f.as_deref() == stale) {
            return Err(ApiError::SessionExpired);
        }

        let Some(refresh_token) = self.tokens.get(REFRESH_TOKEN_KEY) else {
            debug!("No refresh token stored");
            return Err(ApiError::SessionExpired);
        };

        match self.refresher.refresh(&refresh_token).await {
            Ok(access) => {
                self.tokens.set(ACCESS_TOKEN_KEY, &access);
                gate.failed_for = None;
                info!("Access token refreshed");
                Ok(access)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                self.tokens.remove(ACCESS_TOKEN_KEY);
                gate.failed_for = Some(stale.map(str::to_owned));
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// Request plus status mapping. A 401 that survives the retry on a
    /// protected path means the session is gone.
    async fn call(&self, method: Method, path: &str, body: Option<Value>) -> Result<Response, ApiError> {
        let public = self.is_public(&method, path);
        let response = self.request(method, path, body.as_ref()).await?;
        match check_status(response).await {
            Err(ApiError::Unauthorized(_)) if !public => Err(ApiError::SessionExpired),
            other => other,
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.call(Method::GET, path, None).await?;
        Ok(response.json().await?)
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.call(Method::POST, path, Some(to_body(body)?)).await?;
        Ok(response.json().await?)
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.call(Method::PUT, path, Some(to_body(body)?)).await?;
        Ok(response.json().await?)
    }

    /// POST whose response body is ignored.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.call(Method::POST, path, Some(to_body(body)?)).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.call(Method::DELETE, path, None).await?;
        Ok(())
    }
}

fn to_body<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))
}
