//! End-to-end behaviour of the pipeline against a scripted backend.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use agenda_domain::{
    ApiRequest, ApiResponse, ClientEvent, CredentialPair, NotificationLevel, SessionState,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::broadcast;
use tokio::time::Instant;

use super::ApiClient;
use crate::auth::{REFRESH_PATH, TokenStore};
use crate::error::ApplicationError;
use crate::events::EventBus;
use crate::test_support::{FixedClock, MemoryStore, ScriptedHttpClient};

const GRACE: Duration = Duration::from_secs(30);

/// Business endpoints accept only `T2`; the refresh endpoint answers after
/// 50 ms, either with a new pair or with `refresh_status`.
fn backend(refresh_status: u16) -> Arc<ScriptedHttpClient> {
    ScriptedHttpClient::new(move |request: ApiRequest| async move {
        if request.path == REFRESH_PATH {
            tokio::time::sleep(Duration::from_millis(50)).await;
            return Ok(if refresh_status == 200 {
                ApiResponse::json_body(
                    200,
                    &json!({"tokens": {"accessToken": "T2", "refreshToken": "R2"}}),
                )
            } else {
                ApiResponse::json_body(refresh_status, &json!({"message": "refresh token revoked"}))
            });
        }
        if request.path.starts_with("/auth/") {
            return Ok(ApiResponse::json_body(401, &json!({"message": "Invalid credentials"})));
        }
        Ok(match request.bearer_token() {
            Some("T2" | "valid") => ApiResponse::json_body(200, &json!({"path": request.path})),
            _ => ApiResponse::json_body(401, &json!({"code": "TOKEN_EXPIRED"})),
        })
    })
}

async fn client_with(http: Arc<ScriptedHttpClient>, access: &str) -> ApiClient {
    let tokens = TokenStore::new(Arc::new(MemoryStore::default()));
    tokens
        .save_credentials(CredentialPair::new(access, "R1"))
        .await
        .unwrap();
    ApiClient::new(
        http,
        tokens,
        EventBus::new(SessionState::Authenticated),
        Arc::new(FixedClock::default()),
        GRACE,
    )
}

fn drain(rx: &mut broadcast::Receiver<ClientEvent>) -> Vec<ClientEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn test_valid_token_proceeds_unmodified() {
    let http = backend(200);
    let client = client_with(http.clone(), "valid").await;

    let body = client.get("/clients").await.unwrap();

    assert_eq!(body, json!({"path": "/clients"}));
    let sent = http.requests_to("/clients");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].headers.get("Authorization"), Some("Bearer valid"));
    assert!(http.requests_to(REFRESH_PATH).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_expired_token_is_refreshed_and_replayed() {
    let http = backend(200);
    let client = client_with(http.clone(), "T1").await;
    let mut watcher = client.events().watch_session();

    let body = client.get("/appointments").await.unwrap();

    assert_eq!(body, json!({"path": "/appointments"}));
    let sent = http.requests_to("/appointments");
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].bearer_token(), Some("T1"));
    assert_eq!(sent[1].bearer_token(), Some("T2"));
    assert_eq!(sent[1].attempt(), 1);
    assert_eq!(sent[0].id, sent[1].id);
    assert_eq!(
        client.tokens().credentials().await,
        Some(CredentialPair::new("T2", "R2"))
    );
    assert!(watcher.has_changed().unwrap());
    assert_eq!(*watcher.borrow_and_update(), SessionState::Authenticated);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_expiries_share_one_refresh() {
    let http = backend(200);
    let client = client_with(http.clone(), "T1").await;

    let mut set = tokio::task::JoinSet::new();
    for path in ["/clients", "/appointments", "/packages", "/transactions", "/schedules"] {
        let client = client.clone();
        set.spawn(async move { client.get(path).await });
    }
    let results = set.join_all().await;

    assert!(results.iter().all(Result::is_ok), "{results:?}");
    assert_eq!(http.requests_to(REFRESH_PATH).len(), 1);
    for path in ["/clients", "/appointments", "/packages", "/transactions", "/schedules"] {
        let sent = http.requests_to(path);
        assert_eq!(sent.len(), 2, "{path}");
        assert_eq!(sent[1].bearer_token(), Some("T2"), "{path}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_later_requests_use_the_new_token() {
    let http = backend(200);
    let client = client_with(http.clone(), "T1").await;

    client.get("/clients").await.unwrap();
    let stale = ApiRequest::get("/packages").unwrap().authorized("T1");
    let response = client.send(stale).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(http.requests_to(REFRESH_PATH).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_refresh_signs_out_after_grace() {
    let http = backend(401);
    let client = client_with(http.clone(), "T1").await;
    let mut rx = client.events().subscribe();
    let started = Instant::now();

    let (first, second) = tokio::join!(client.get("/clients"), client.get("/appointments"));

    assert!(started.elapsed() < GRACE);
    assert_eq!(
        first.unwrap_err(),
        ApplicationError::SessionExpired("refresh token revoked".to_string())
    );
    assert!(matches!(second, Err(ApplicationError::SessionExpired(_))));
    assert_eq!(http.requests_to(REFRESH_PATH).len(), 1);

    let events = drain(&mut rx);
    let warnings: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            ClientEvent::Notify(n) if n.level == NotificationLevel::Warning => Some(n),
            _ => None,
        })
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("30 seconds"));
    assert!(!warnings[0].is_transient());
    assert!(events.iter().any(|e| matches!(e, ClientEvent::LogoutScheduled { .. })));
    assert!(events.contains(&ClientEvent::SessionChanged(SessionState::Unauthenticated)));
    assert!(!events.iter().any(|e| matches!(e, ClientEvent::Notify(n) if n.level == NotificationLevel::Error)));
    assert!(!events.contains(&ClientEvent::RedirectToLogin));

    assert_eq!(rx.recv().await.unwrap(), ClientEvent::RedirectToLogin);
    assert!(started.elapsed() >= GRACE);
    assert!(client.tokens().credentials().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_login_rejection_is_returned_without_refresh() {
    let http = backend(200);
    let client = client_with(http.clone(), "T1").await;
    let mut rx = client.events().subscribe();

    let error = client
        .post("/auth/login", json!({"email": "ana@example.com", "password": "wrong"}))
        .await
        .unwrap_err();

    assert_eq!(error.status(), Some(401));
    assert!(http.requests_to(REFRESH_PATH).is_empty());
    assert!(drain(&mut rx).is_empty());
    assert!(!client.forced_logout().is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_replay_that_fails_again_does_not_refresh_twice() {
    let http = ScriptedHttpClient::new(|request: ApiRequest| async move {
        if request.path == REFRESH_PATH {
            return Ok(ApiResponse::json_body(
                200,
                &json!({"tokens": {"accessToken": "T2", "refreshToken": "R2"}}),
            ));
        }
        Ok(ApiResponse::json_body(401, &json!({"code": "TOKEN_EXPIRED"})))
    });
    let client = client_with(http.clone(), "T1").await;

    let error = client.get("/clients").await.unwrap_err();

    assert_eq!(error.status(), Some(401));
    assert_eq!(http.requests_to(REFRESH_PATH).len(), 1);
    assert_eq!(http.requests_to("/clients").len(), 2);
    assert!(!client.forced_logout().is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_token_starts_forced_logout_without_refresh() {
    let http = ScriptedHttpClient::new(|_request| async {
        Ok(ApiResponse::json_body(401, &json!({"code": "INVALID_TOKEN"})))
    });
    let client = client_with(http.clone(), "T1").await;

    let error = client.get("/clients").await.unwrap_err();

    assert_eq!(error, ApplicationError::Unauthorized);
    assert!(http.requests_to(REFRESH_PATH).is_empty());
    assert!(client.forced_logout().is_pending());
    assert_eq!(client.events().session_state(), SessionState::Unauthenticated);
}

#[tokio::test(start_paused = true)]
async fn test_requests_during_grace_do_not_refresh_again() {
    let http = backend(401);
    let client = client_with(http.clone(), "T1").await;

    assert!(client.get("/clients").await.is_err());
    tokio::time::sleep(Duration::from_secs(5)).await;

    let second = client.get("/appointments").await;

    assert!(matches!(second, Err(ApplicationError::SessionExpired(_))));
    assert_eq!(http.requests_to(REFRESH_PATH).len(), 1);
    assert!(client.forced_logout().is_pending());
    assert_eq!(client.events().session_state(), SessionState::Unauthenticated);
}

#[tokio::test(start_paused = true)]
async fn test_new_login_is_refreshed_after_an_earlier_refresh() {
    let http = ScriptedHttpClient::new(|request: ApiRequest| async move {
        if request.path == REFRESH_PATH {
            let next = match request.body.as_ref().and_then(|b| b["refreshToken"].as_str()) {
                Some("R1") => ("T2", "R2"),
                _ => ("T4", "R4"),
            };
            return Ok(ApiResponse::json_body(
                200,
                &json!({"tokens": {"accessToken": next.0, "refreshToken": next.1}}),
            ));
        }
        Ok(match request.bearer_token() {
            Some("T4") => ApiResponse::json_body(200, &json!({"ok": true})),
            Some("T2") if request.path == "/clients" => ApiResponse::json_body(200, &json!({"ok": true})),
            _ => ApiResponse::json_body(401, &json!({"code": "TOKEN_EXPIRED"})),
        })
    });
    let client = client_with(http.clone(), "T1").await;

    client.get("/clients").await.unwrap();
    client
        .tokens()
        .save_credentials(CredentialPair::new("T3", "R3"))
        .await
        .unwrap();

    let body = client.get("/appointments").await.unwrap();

    assert_eq!(body, json!({"ok": true}));
    let refreshes = http.requests_to(REFRESH_PATH);
    assert_eq!(refreshes.len(), 2);
    assert_eq!(refreshes[1].body, Some(json!({"refreshToken": "R3"})));
    assert_eq!(
        http.requests_to("/appointments").last().unwrap().bearer_token(),
        Some("T4")
    );
}
