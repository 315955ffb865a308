#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{
    Json, Router,
    extract::{Path, Request, State},
    http::{HeaderMap, Method, StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use folio::api::{ApiClient, HttpRefresh};
use folio::auth::{AuthSession, TokenStore};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use url::Url;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const USER_EMAIL: &str = "user@example.com";
pub const PASSWORD: &str = "hunter2";
pub const REFRESH_TOKEN: &str = "refresh-token-1";

const SECRET: &[u8] = b"mock-backend-secret";

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
}

pub struct BackendState {
    /// The only access token protected routes accept.
    current_token: Mutex<Option<String>>,
    token_serial: AtomicU64,
    pub refresh_calls: AtomicUsize,
    refresh_enabled: AtomicBool,
    refresh_delay_ms: AtomicU64,
    projects: Mutex<Vec<Value>>,
    fail_lists: AtomicBool,
    next_id: AtomicI64,
    pub seen: Mutex<Vec<SeenRequest>>,
    pub contact_messages: Mutex<Vec<Value>>,
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Sign a token for `email` that expires `ttl_secs` from now (negative for
/// an already expired token).
pub fn mint_token(email: &str, user_type: &str, ttl_secs: i64, serial: u64) -> String {
    let now = now_secs();
    let claims = json!({
        "sub": serial,
        "email": email,
        "userType": user_type,
        "name": "Test User",
        "iat": now,
        "exp": now + ttl_secs,
        "jti": format!("t{}", serial),
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap()
}

impl BackendState {
    fn new() -> Self {
        Self {
            current_token: Mutex::new(None),
            token_serial: AtomicU64::new(1),
            refresh_calls: AtomicUsize::new(0),
            refresh_enabled: AtomicBool::new(true),
            refresh_delay_ms: AtomicU64::new(0),
            projects: Mutex::new(vec![json!({
                "id": 1,
                "title": "Seeded Project",
                "slug": "seeded-project",
                "description": "From the backend",
                "category": "web",
                "tags": [],
                "featured": false
            })]),
            fail_lists: AtomicBool::new(false),
            next_id: AtomicI64::new(2),
            seen: Mutex::new(Vec::new()),
            contact_messages: Mutex::new(Vec::new()),
        }
    }

    fn issue_token(&self, email: &str, user_type: &str) -> String {
        let serial = self.token_serial.fetch_add(1, Ordering::SeqCst);
        let token = mint_token(email, user_type, 3600, serial);
        *self.current_token.lock().unwrap() = Some(token.clone());
        token
    }

    fn is_authorized(&self, headers: &HeaderMap) -> bool {
        let current = self.current_token.lock().unwrap().clone();
        let presented = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        matches!((current, presented), (Some(c), Some(p)) if c == p)
    }
}

async fn record(State(state): State<Arc<BackendState>>, request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.seen.lock().unwrap().push(SeenRequest {
        method: request.method().clone(),
        path: request.uri().path().to_string(),
        authorization,
    });
    next.run(request).await
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Invalid or expired token"})),
    )
        .into_response()
}

async fn login(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let user_type = match (email, password) {
        (ADMIN_EMAIL, PASSWORD) => "admin",
        (USER_EMAIL, PASSWORD) => "user",
        _ => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Invalid credentials"})),
            )
                .into_response();
        }
    };
    let token = state.issue_token(email, user_type);
    Json(json!({
        "accessToken": token,
        "refreshToken": REFRESH_TOKEN,
        "user": {"email": email, "userType": user_type, "name": "Test User"}
    }))
    .into_response()
}

async fn refresh(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let delay = state.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    if !state.refresh_enabled.load(Ordering::SeqCst) || body["refreshToken"] != REFRESH_TOKEN {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Refresh token revoked"})),
        )
            .into_response();
    }
    let token = state.issue_token(ADMIN_EMAIL, "admin");
    Json(json!({"accessToken": token})).into_response()
}

async fn list_projects(State(state): State<Arc<BackendState>>) -> Response {
    if state.fail_lists.load(Ordering::SeqCst) {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "Database unavailable"})),
        )
            .into_response();
    }
    let projects = state.projects.lock().unwrap().clone();
    Json(json!({"data": projects})).into_response()
}

async fn get_project(State(state): State<Arc<BackendState>>, Path(id): Path<i64>) -> Response {
    let projects = state.projects.lock().unwrap();
    match projects.iter().find(|p| p["id"] == id) {
        Some(p) => Json(p.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"error": "Project not found"}))).into_response(),
    }
}

async fn create_project(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    if !state.is_authorized(&headers) {
        return unauthorized();
    }
    let title = body["title"].as_str().unwrap_or_default().trim().to_string();
    if title.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"message": "Validation failed", "errors": {"title": "Title is required"}})),
        )
            .into_response();
    }
    if title == "reject-me" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "A project with this title already exists"})),
        )
            .into_response();
    }
    body["id"] = json!(state.next_id.fetch_add(1, Ordering::SeqCst));
    state.projects.lock().unwrap().push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_project(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Response {
    if !state.is_authorized(&headers) {
        return unauthorized();
    }
    body["id"] = json!(id);
    let mut projects = state.projects.lock().unwrap();
    match projects.iter_mut().find(|p| p["id"] == id) {
        Some(slot) => {
            *slot = body.clone();
            Json(body).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({"error": "Project not found"}))).into_response(),
    }
}

async fn delete_project(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if !state.is_authorized(&headers) {
        return unauthorized();
    }
    state.projects.lock().unwrap().retain(|p| p["id"] != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn stats(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if !state.is_authorized(&headers) {
        return unauthorized();
    }
    let count = state.projects.lock().unwrap().len();
    Json(json!({"projects": count})).into_response()
}

async fn contact(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    state.contact_messages.lock().unwrap().push(body);
    (StatusCode::CREATED, Json(json!({"ok": true}))).into_response()
}

async fn get_theme() -> Response {
    Json(json!({"primaryColor": "#111111", "darkMode": true})).into_response()
}

pub struct MockBackend {
    pub state: Arc<BackendState>,
    pub base: Url,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::new());

        let api = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/refresh", post(refresh))
            .route("/projects", get(list_projects).post(create_project))
            .route(
                "/projects/{id}",
                get(get_project).put(update_project).delete(delete_project),
            )
            .route("/admin/stats", get(stats))
            .route("/contact", post(contact))
            .route("/theme", get(get_theme))
            .with_state(state.clone());

        let app = Router::new()
            .nest("/api", api)
            .layer(middleware::from_fn_with_state(state.clone(), record));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let base = Url::parse(&format!("http://{}/api/", addr)).unwrap();
        Self {
            state,
            base,
            handle,
        }
    }

    /// Invalidate the current access token so the next protected request
    /// gets a 401.
    pub fn expire_access_token(&self) {
        let serial = self.state.token_serial.fetch_add(1, Ordering::SeqCst);
        *self.state.current_token.lock().unwrap() =
            Some(mint_token(ADMIN_EMAIL, "admin", 3600, serial));
    }

    pub fn set_refresh_enabled(&self, enabled: bool) {
        self.state.refresh_enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn set_refresh_delay(&self, delay: Duration) {
        self.state
            .refresh_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Make list endpoints answer 503.
    pub fn set_lists_failing(&self, failing: bool) {
        self.state.fail_lists.store(failing, Ordering::SeqCst);
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.state.seen.lock().unwrap().clone()
    }

    pub fn clear_seen(&self) {
        self.state.seen.lock().unwrap().clear();
    }
}

pub fn api_client(base: &Url, tokens: Arc<dyn TokenStore>) -> ApiClient {
    let http = reqwest::Client::new();
    let refresher = HttpRefresh::new(http.clone(), base).unwrap();
    ApiClient::new(http, base.clone(), tokens, Arc::new(refresher))
}

pub fn auth_session(base: &Url, tokens: Arc<dyn TokenStore>) -> AuthSession {
    AuthSession::new(api_client(base, tokens))
}

/// Base URL on a port nothing listens on.
pub fn offline_base() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    Url::parse(&format!("http://127.0.0.1:{}/api/", port)).unwrap()
}
