//! Client configuration and wiring.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::api::{ApiClient, ApiError, HttpRefresh};
use crate::auth::{AuthSession, FileTokenStore, LOGIN_ROUTE, RouteGuard, TokenStore};
use crate::crud::FallbackPolicy;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
const CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("API URL must use HTTPS unless it points at localhost: {0}")]
    InsecureUrl(String),
    #[error("no config directory found; pass --credentials")]
    NoConfigDir,
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl From<ApiError> for ConfigError {
    fn from(e: ApiError) -> Self {
        Self::HttpClient(e.to_string())
    }
}

/// Parse the API base URL. Only http(s) is accepted, plain http only for
/// loopback hosts. The path always ends with '/' so endpoint paths resolve
/// beneath it.
pub fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "https" => {}
        "http" => {
            let is_local = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));
            if !is_local {
                return Err(ConfigError::InsecureUrl(raw.to_string()));
            }
        }
        other => {
            return Err(ConfigError::InvalidUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme '{}'", other),
            });
        }
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// `<config dir>/folio/credentials.json`.
pub fn default_credentials_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("folio").join(CREDENTIALS_FILE))
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: Url,
    pub credentials_path: PathBuf,
    pub fallback: FallbackPolicy,
    pub login_route: String,
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Config with defaults for everything but the URL and credential file.
    pub fn new(api_url: Url, credentials_path: PathBuf) -> Self {
        Self {
            api_url,
            credentials_path,
            fallback: FallbackPolicy::default(),
            login_route: LOGIN_ROUTE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))
    }

    pub fn guard(&self) -> RouteGuard {
        RouteGuard::new(self.login_route.clone())
    }

    /// Open the credential file and build the API client and auth session
    /// on top of it. The session is still hydrating.
    pub fn connect(&self) -> Result<AuthSession, ConfigError> {
        let http = self.http_client()?;
        let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::open(self.credentials_path.clone()));
        let refresher = HttpRefresh::new(http.clone(), &self.api_url)?;
        debug!(
            api_url = %self.api_url,
            credentials = %self.credentials_path.display(),
            "Connecting"
        );
        let api = ApiClient::new(http, self.api_url.clone(), tokens, Arc::new(refresher));
        Ok(AuthSession::new(api))
    }
}
