//! End-to-end session flows over real HTTP against a mock API.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use agenda_application::{ApiClient, ApplicationError, AuthService, EventBus, TokenStore};
use agenda_domain::{ClientEvent, ClientSettings, CredentialPair, SessionState};
use agenda_infrastructure::{FileKeyValueStore, ReqwestHttpClient, SystemClock};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    _dir: TempDir,
    store_path: std::path::PathBuf,
    client: ApiClient,
}

async fn harness(server: &MockServer, stored: Option<CredentialPair>, grace: Duration) -> Harness {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let store_path = dir.path().join("session.json");
    let tokens = TokenStore::new(Arc::new(FileKeyValueStore::new(&store_path)));
    let initial = match stored {
        Some(pair) => {
            tokens.save_credentials(pair).await.unwrap();
            SessionState::Authenticated
        }
        None => SessionState::Unauthenticated,
    };

    let settings = ClientSettings {
        api_url: format!("{}/api", server.uri()),
        timeout_ms: 5_000,
        ..ClientSettings::default()
    };
    let client = ApiClient::new(
        Arc::new(ReqwestHttpClient::new(&settings).unwrap()),
        tokens,
        EventBus::new(initial),
        Arc::new(SystemClock::new()),
        grace,
    );

    Harness {
        _dir: dir,
        store_path,
        client,
    }
}

async fn reopen(path: &std::path::Path) -> TokenStore {
    TokenStore::load(Arc::new(FileKeyValueStore::new(path)))
        .await
        .unwrap()
}

async fn mount_expired_for(server: &MockServer, route: &str, stale: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("Authorization", format!("Bearer {stale}").as_str()))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"code": "TOKEN_EXPIRED"})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_persists_session_to_disk() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "ana@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"_id": "u1", "name": "Ana"},
            "tenant": {"id": "t1", "name": "Studio Bela"},
            "tokens": {"accessToken": "T1", "refreshToken": "R1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, None, Duration::from_secs(30)).await;
    let auth = AuthService::new(h.client.clone());

    auth.login("ana@example.com", "secret").await.unwrap();

    let reopened = reopen(&h.store_path).await;
    assert_eq!(
        reopened.credentials().await,
        Some(CredentialPair::new("T1", "R1"))
    );
    assert_eq!(reopened.user().await.unwrap().id, "u1");
    assert_eq!(reopened.tenant().await.unwrap().id, "t1");
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_replayed() {
    let server = MockServer::start().await;
    mount_expired_for(&server, "/api/clients", "T1").await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({"refreshToken": "R1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tokens": {"accessToken": "T2", "refreshToken": "R2"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/clients"))
        .and(header("Authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "c1"}])))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Some(CredentialPair::new("T1", "R1")), Duration::from_secs(30)).await;

    let body = h.client.get("/clients").await.unwrap();

    assert_eq!(body, json!([{"id": "c1"}]));
    assert_eq!(
        reopen(&h.store_path).await.credentials().await,
        Some(CredentialPair::new("T2", "R2"))
    );
}

#[tokio::test]
async fn test_concurrent_expiries_trigger_one_refresh() {
    let server = MockServer::start().await;
    for route in ["/api/clients", "/api/appointments", "/api/packages"] {
        mount_expired_for(&server, route, "T1").await;
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("Authorization", "Bearer T2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": route})))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"tokens": {"accessToken": "T2", "refreshToken": "R2"}}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Some(CredentialPair::new("T1", "R1")), Duration::from_secs(30)).await;
    let (a, b, c) = tokio::join!(
        h.client.get("/clients"),
        h.client.get("/appointments"),
        h.client.get("/packages"),
    );

    assert_eq!(a.unwrap(), json!({"ok": "/api/clients"}));
    assert_eq!(b.unwrap(), json!({"ok": "/api/appointments"}));
    assert_eq!(c.unwrap(), json!({"ok": "/api/packages"}));
}

#[tokio::test]
async fn test_rejected_refresh_signs_out_after_grace() {
    let server = MockServer::start().await;
    mount_expired_for(&server, "/api/clients", "T1").await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid refresh token"})))
        .expect(1)
        .mount(&server)
        .await;

    let grace = Duration::from_millis(300);
    let h = harness(&server, Some(CredentialPair::new("T1", "R1")), grace).await;
    let mut events = h.client.events().subscribe();

    let error = h.client.get("/clients").await.unwrap_err();

    assert!(matches!(error, ApplicationError::SessionExpired(_)));
    assert!(h.client.forced_logout().is_pending());
    assert!(reopen(&h.store_path).await.has_credentials().await);

    let redirected = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if events.recv().await.unwrap() == ClientEvent::RedirectToLogin {
                break;
            }
        }
    })
    .await;

    assert!(redirected.is_ok(), "no redirect after grace period");
    assert!(!reopen(&h.store_path).await.has_credentials().await);
    assert_eq!(h.client.events().session_state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_login_rejection_is_not_refreshed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"code": "TOKEN_EXPIRED"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server, Some(CredentialPair::new("T1", "R1")), Duration::from_secs(30)).await;
    let auth = AuthService::new(h.client.clone());

    let error = auth.login("ana@example.com", "wrong").await.unwrap_err();

    assert_eq!(error.status(), Some(401));
    assert!(!h.client.forced_logout().is_pending());
}
