mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{ADMIN_EMAIL, MockBackend, PASSWORD, auth_session};
use folio::api::{ApiError, Method};
use folio::auth::{ACCESS_TOKEN_KEY, AUTH_KEYS, MemoryTokenStore, TokenStore};
use folio::entities::ContactMessage;
use serde_json::Value;

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let backend = MockBackend::start().await;
    let tokens = Arc::new(MemoryTokenStore::new());
    let session = auth_session(&backend.base, tokens.clone());
    session.login(ADMIN_EMAIL, PASSWORD).await.unwrap();
    let stale = tokens.get(ACCESS_TOKEN_KEY).unwrap();

    backend.expire_access_token();
    backend.set_refresh_delay(Duration::from_millis(100));

    let api = session.api().clone();
    let (a, b) = futures::join!(
        api.get_json::<Value>("admin/stats"),
        api.get_json::<Value>("admin/stats")
    );
    assert_eq!(a.unwrap()["projects"], 1);
    assert_eq!(b.unwrap()["projects"], 1);
    assert_eq!(backend.refresh_calls(), 1);

    let fresh = tokens.get(ACCESS_TOKEN_KEY).unwrap();
    assert_ne!(fresh, stale);

    let adopted = session.refresh_if_needed();
    assert!(adopted.is_authenticated);
    assert_eq!(adopted.access_token.as_deref(), Some(fresh.as_str()));
}

#[tokio::test]
async fn test_retry_carries_refreshed_token() {
    let backend = MockBackend::start().await;
    let tokens = Arc::new(MemoryTokenStore::new());
    let session = auth_session(&backend.base, tokens.clone());
    session.login(ADMIN_EMAIL, PASSWORD).await.unwrap();

    backend.expire_access_token();
    backend.clear_seen();
    session.api().get_json::<Value>("admin/stats").await.unwrap();

    let stats: Vec<_> = backend
        .seen()
        .into_iter()
        .filter(|r| r.path == "/api/admin/stats")
        .collect();
    assert_eq!(stats.len(), 2);
    assert_ne!(stats[0].authorization, stats[1].authorization);
    assert_eq!(
        stats[1].authorization,
        Some(format!("Bearer {}", tokens.get(ACCESS_TOKEN_KEY).unwrap()))
    );
}

#[tokio::test]
async fn test_public_endpoints_carry_no_authorization() {
    let backend = MockBackend::start().await;
    let session = auth_session(&backend.base, Arc::new(MemoryTokenStore::new()));
    session.login(ADMIN_EMAIL, PASSWORD).await.unwrap();
    backend.clear_seen();

    let api = session.api();
    api.get_json::<Value>("projects").await.unwrap();
    api.get_json::<Value>("projects/1").await.unwrap();
    api.get_json::<Value>("theme").await.unwrap();
    ContactMessage {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        subject: "Hello".into(),
        message: "Nice site".into(),
    }
    .send(api)
    .await
    .unwrap();

    let seen = backend.seen();
    assert_eq!(seen.len(), 4);
    for request in &seen {
        assert_eq!(request.authorization, None, "{} {}", request.method, request.path);
    }
    assert_eq!(backend.state.contact_messages.lock().unwrap().len(), 1);

    backend.clear_seen();
    api.get_json::<Value>("admin/stats").await.unwrap();
    let seen = backend.seen();
    assert!(seen[0].authorization.as_deref().unwrap().starts_with("Bearer "));
    assert!(!api.is_public(&Method::DELETE, "projects/1"));
}

#[tokio::test]
async fn test_failed_refresh_clears_token_and_expires_session() {
    let backend = MockBackend::start().await;
    let tokens = Arc::new(MemoryTokenStore::new());
    let session = auth_session(&backend.base, tokens.clone());
    session.login(ADMIN_EMAIL, PASSWORD).await.unwrap();

    backend.expire_access_token();
    backend.set_refresh_enabled(false);

    let err = session
        .api()
        .get_json::<Value>("admin/stats")
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::SessionExpired);
    assert_eq!(tokens.get(ACCESS_TOKEN_KEY), None);
    assert_eq!(backend.refresh_calls(), 1);

    session.handle_api_error(&err);
    let snapshot = session.snapshot();
    assert!(!snapshot.is_authenticated);
    assert_eq!(snapshot.last_error.as_deref(), Some("session expired"));
    for key in AUTH_KEYS {
        assert_eq!(tokens.get(key), None);
    }
}

#[tokio::test]
async fn test_protected_request_without_session() {
    let backend = MockBackend::start().await;
    let session = auth_session(&backend.base, Arc::new(MemoryTokenStore::new()));

    let err = session
        .api()
        .get_json::<Value>("admin/stats")
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::SessionExpired);
    assert_eq!(backend.refresh_calls(), 0);
}

#[tokio::test]
async fn test_not_found_maps_to_error() {
    let backend = MockBackend::start().await;
    let session = auth_session(&backend.base, Arc::new(MemoryTokenStore::new()));

    let err = session
        .api()
        .get_json::<Value>("projects/404")
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::NotFound("Project not found".into()));
}
