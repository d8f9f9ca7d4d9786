//! Tests for the HTTP client module
//!
//! The refresh protocol tests pin the refresh endpoint's call count with
//! `expect(n)` and distinguish old/new tokens by matching the bearer header.

use super::*;
use crate::credentials::{CredentialStore, MemoryCredentialStore, TokenPair};
use crate::error::Error;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn seeded_store(pair: Option<TokenPair>) -> Arc<MemoryCredentialStore> {
    match pair {
        Some(pair) => Arc::new(MemoryCredentialStore::with_tokens(pair)),
        None => Arc::new(MemoryCredentialStore::new()),
    }
}

fn client_for(server: &MockServer, store: Arc<MemoryCredentialStore>) -> ApiClient {
    ApiClient::with_config(ApiClientConfig::new(server.uri()), store).unwrap()
}

/// Mount the refresh endpoint: exchanges `refresh` for a new pair
async fn mount_refresh(server: &MockServer, refresh: &str, new_pair: &TokenPair, delay_ms: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .and(body_json(json!({ "refreshToken": refresh })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(delay_ms))
                .set_body_json(json!({
                    "accessToken": new_pair.access_token,
                    "refreshToken": new_pair.refresh_token,
                })),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[test]
fn test_config_defaults() {
    let config = ApiClientConfig::new("https://api.example.com");
    assert_eq!(config.base_url, "https://api.example.com");
    assert_eq!(config.timeout, Duration::from_secs(10));
    assert!(config.default_headers.is_empty());
    assert!(config.user_agent.starts_with("taskdeck-client/"));
}

#[test]
fn test_config_builder() {
    let config = ApiClientConfig::builder("https://api.example.com")
        .timeout(Duration::from_secs(5))
        .header("X-Client", "cli")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(config.default_headers.get("X-Client"), Some(&"cli".to_string()));
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_invalid_base_url_rejected() {
    let result = ApiClient::new("not a url");
    assert!(matches!(result, Err(Error::InvalidUrl(_))));
}

#[tokio::test]
async fn test_attaches_bearer_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("Authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, seeded_store(Some(TokenPair::new("t1", "r1"))));
    let body: Value = client.get("/tasks").await.unwrap();
    assert_eq!(body["ok"], true);
}

// Requests with no stored token proceed without an Authorization header and
// are not pre-emptively blocked.
#[tokio::test]
async fn test_no_token_sends_no_authorization_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, seeded_store(None));
    let body: Value = client.get("/health").await.unwrap();
    assert_eq!(body["ok"], true);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_401_refreshes_and_replays_once() {
    let server = MockServer::start().await;
    let new_pair = TokenPair::new("t2", "r2");

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("Authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("Authorization", "Bearer t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tasks": [] })))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, "r1", &new_pair, 0).await;

    let store = seeded_store(Some(TokenPair::new("t1", "r1")));
    let client = client_for(&server, store.clone());

    let body: Value = client.get("/tasks").await.unwrap();
    assert_eq!(body["tasks"], json!([]));

    // The store holds exactly the new pair, no stale values
    assert_eq!(store.tokens().await.unwrap(), Some(new_pair));
}

// For N >= 1 concurrent requests all hitting 401, exactly one refresh call is
// made and every request is replayed with the token it produced.
#[test_case(1; "single request")]
#[test_case(3; "three concurrent")]
#[test_case(5; "five concurrent")]
#[tokio::test]
async fn test_concurrent_401s_share_one_refresh(n: usize) {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("Authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("Authorization", "Bearer t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tasks": [] })))
        .expect(n as u64)
        .mount(&server)
        .await;
    // The delay keeps the cycle open long enough for every request to queue
    mount_refresh(&server, "r1", &TokenPair::new("t2", "r2"), 200).await;

    let store = seeded_store(Some(TokenPair::new("t1", "r1")));
    let client = client_for(&server, store.clone());

    let results =
        futures::future::join_all((0..n).map(|_| client.get::<Value>("/tasks"))).await;
    for result in results {
        assert_eq!(result.unwrap()["tasks"], json!([]));
    }

    assert_eq!(store.tokens().await.unwrap(), Some(TokenPair::new("t2", "r2")));
}

// Staggered arrivals: the first 401 opens the cycle, the two later requests
// queue behind it, and each of the three replays exactly once with the new
// token.
#[tokio::test]
async fn test_three_requests_one_refresh_exact_counts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("Authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("Authorization", "Bearer t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tasks": [] })))
        .expect(3)
        .mount(&server)
        .await;
    mount_refresh(&server, "r1", &TokenPair::new("t2", "r2"), 250).await;

    let client = client_for(&server, seeded_store(Some(TokenPair::new("t1", "r1"))));

    let a = client.get::<Value>("/tasks");
    let b = async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        client.get::<Value>("/tasks").await
    };
    let c = async {
        tokio::time::sleep(Duration::from_millis(60)).await;
        client.get::<Value>("/tasks").await
    };

    let (a, b, c) = tokio::join!(a, b, c);
    assert!(a.is_ok());
    assert!(b.is_ok());
    assert!(c.is_ok());
}

// If the refresh call fails, every queued request rejects with an error
// derived from the refresh failure and the store is left empty.
#[tokio::test]
async fn test_refresh_failure_rejects_all_and_clears_store() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_delay(Duration::from_millis(200))
                .set_body_string("refresh token revoked"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = seeded_store(Some(TokenPair::new("t1", "r1")));
    let client = client_for(&server, store.clone());
    let mut session = client.subscribe_session();

    let results =
        futures::future::join_all((0..3).map(|_| client.get::<Value>("/tasks"))).await;
    for result in results {
        let err = result.unwrap_err();
        assert!(err.requires_login(), "unexpected error: {err}");
        assert!(
            matches!(&err, Error::SessionExpired { message } if message.contains("403")),
            "error not derived from refresh failure: {err}"
        );
    }

    assert_eq!(store.tokens().await.unwrap(), None);
    let event = tokio::time::timeout(Duration::from_secs(1), session.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event, SessionEvent::Invalidated);
}

// A request that fails with 401 twice surfaces the second failure to its
// caller and never triggers a second refresh cycle.
#[tokio::test]
async fn test_second_401_is_terminal() {
    let server = MockServer::start().await;

    // 401 regardless of which token the request carries
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    mount_refresh(&server, "r1", &TokenPair::new("t2", "r2"), 0).await;

    let client = client_for(&server, seeded_store(Some(TokenPair::new("t1", "r1"))));
    let err = client.get::<Value>("/tasks").await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized));
}

// After a refresh cycle settles the gate is released; a later 401 opens a
// fresh cycle with the rotated refresh token.
#[tokio::test]
async fn test_gate_reopens_after_settled_cycle() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("Authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("Authorization", "Bearer t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "page": 1 })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    // The second request finds t2 expired as well
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("Authorization", "Bearer t2"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("Authorization", "Bearer t3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "page": 2 })))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, "r1", &TokenPair::new("t2", "r2"), 0).await;
    mount_refresh(&server, "r2", &TokenPair::new("t3", "r3"), 0).await;

    let store = seeded_store(Some(TokenPair::new("t1", "r1")));
    let client = client_for(&server, store.clone());

    let first: Value = client.get("/tasks").await.unwrap();
    assert_eq!(first["page"], 1);

    let second: Value = client.get("/tasks").await.unwrap();
    assert_eq!(second["page"], 2);

    assert_eq!(store.tokens().await.unwrap(), Some(TokenPair::new("t3", "r3")));
}

// A 401 with no stored refresh token skips the endpoint entirely: immediate
// failure, store cleared, session invalidation published.
#[tokio::test]
async fn test_missing_refresh_token_short_circuits() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = seeded_store(None);
    let client = client_for(&server, store.clone());
    let mut session = client.subscribe_session();

    let err = client.get::<Value>("/tasks").await.unwrap_err();
    assert!(
        matches!(&err, Error::SessionExpired { message } if message.contains("No refresh token")),
        "unexpected error: {err}"
    );

    assert_eq!(store.tokens().await.unwrap(), None);
    let event = tokio::time::timeout(Duration::from_secs(1), session.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event, SessionEvent::Invalidated);
}

// Non-401 failures propagate unmodified: no refresh, no retry.
#[test_case(404; "not found")]
#[test_case(422; "unprocessable")]
#[test_case(500; "server error")]
#[test_case(503; "unavailable")]
#[tokio::test]
async fn test_non_401_status_propagates_without_refresh(status: u16) {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, seeded_store(Some(TokenPair::new("t1", "r1"))));
    let err = client.get::<Value>("/tasks").await.unwrap_err();
    match err {
        Error::HttpStatus { status: got, body } => {
            assert_eq!(got, status);
            assert_eq!(body, "nope");
        }
        other => panic!("expected HttpStatus, got {other}"),
    }
}

// A timed-out request surfaces as a non-401 failure and does not touch the
// refresh protocol.
#[tokio::test]
async fn test_timeout_does_not_trigger_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200).set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, seeded_store(Some(TokenPair::new("t1", "r1"))));
    let err = client
        .get_with_config::<Value>(
            "/slow",
            RequestConfig::new().timeout(Duration::from_millis(100)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }), "got {err}");
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tasks/new"))
        .and(body_json(json!({ "title": "write tests" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "42" })))
        .mount(&server)
        .await;

    let client = client_for(&server, seeded_store(Some(TokenPair::new("t1", "r1"))));
    let created: Value = client
        .post("/tasks/new", json!({ "title": "write tests" }))
        .await
        .unwrap();
    assert_eq!(created["id"], "42");
}

#[tokio::test]
async fn test_delete_discards_body() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/tasks/42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, seeded_store(Some(TokenPair::new("t1", "r1"))));
    client.delete("/tasks/42").await.unwrap();
}

#[tokio::test]
async fn test_default_headers_applied() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("X-Client", "cli"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let config = ApiClientConfig::builder(server.uri())
        .header("X-Client", "cli")
        .build();
    let client = ApiClient::with_config(config, seeded_store(None)).unwrap();
    let body: Value = client.get("/tasks").await.unwrap();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_clear_tokens_leaves_later_requests_unauthenticated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let store = seeded_store(Some(TokenPair::new("t1", "r1")));
    let client = client_for(&server, store);
    client.clear_tokens().await.unwrap();

    let _: Value = client.get("/tasks").await.unwrap();
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[test]
fn test_client_debug() {
    let client = ApiClient::new("https://api.example.com").unwrap();
    let debug_str = format!("{client:?}");
    assert!(debug_str.contains("ApiClient"));
    assert!(debug_str.contains("refresh_in_progress"));
}
