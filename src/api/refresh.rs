//! Exchanging a refresh token for a new access token.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use super::endpoints::REFRESH_PATH;
use super::error::{ApiError, check_status};

/// How the API client obtains a new access token after a 401.
#[async_trait]
pub trait RefreshStrategy: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<String, ApiError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

/// `POST auth/refresh` with `{refreshToken}`, expecting `{accessToken}`.
///
/// Sent directly on the HTTP client, never through the interceptor, so a
/// failing refresh cannot trigger another refresh.
pub struct HttpRefresh {
    http: reqwest::Client,
    url: Url,
}

impl HttpRefresh {
    pub fn new(http: reqwest::Client, base: &Url) -> Result<Self, ApiError> {
        let url = base
            .join(REFRESH_PATH)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        Ok(Self { http, url })
    }
}

#[async_trait]
impl RefreshStrategy for HttpRefresh {
    async fn refresh(&self, refresh_token: &str) -> Result<String, ApiError> {
        let response = self
            .http
            .post(self.url.clone())
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(ApiError::network)?;

        let body: RefreshResponse = check_status(response).await?.json().await?;
        if body.access_token.is_empty() {
            return Err(ApiError::decode("refresh returned an empty access token"));
        }
        Ok(body.access_token)
    }
}
