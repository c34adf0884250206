//! End-to-end refresh pipeline over HTTP with `ReqwestTransport`.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use roost_api::mocks::TestSession;
use roost_api::{ApiClient, ApiError, ClientConfig, LoginRequest, ReqwestTransport, TransportError};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, session: &TestSession) -> ApiClient<ReqwestTransport> {
    let config = ClientConfig::new(server.uri()).with_request_timeout(Duration::from_secs(5));
    ApiClient::new(
        ReqwestTransport::new(&config).unwrap(),
        session.session.clone(),
    )
}

#[tokio::test]
async fn expired_token_is_refreshed_with_cookie_and_request_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "refreshToken=r1; Path=/; HttpOnly")
                .set_body_json(json!({
                    "accessToken": "t0",
                    "user": {"id": 1, "email": "ada@example.com", "nickname": "ada"}
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(header("authorization", "Bearer t0"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(header("cookie", "refreshToken=r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "t1"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 10, "content": "hello"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = TestSession::new();
    let client = client_for(&server, &session);

    client
        .login(&LoginRequest::local("ada@example.com", "secret"))
        .await
        .unwrap();
    let posts = client.posts().await.unwrap();

    assert_eq!(posts.len(), 1);
    assert_eq!(session.token().as_deref(), Some("t1"));
    assert!(session.navigator.visited().is_empty());
}

#[tokio::test]
async fn second_unauthorized_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "t1"})))
        .expect(1)
        .mount(&server)
        .await;

    let session = TestSession::with_token("t0");
    let client = client_for(&server, &session);

    let error = client.me().await.unwrap_err();

    assert!(error.is_unauthorized());
}

#[tokio::test]
async fn failed_refresh_clears_token_and_navigates_to_login() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/follows/me/followings"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Refresh token expired"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = TestSession::with_token("t0");
    let client = client_for(&server, &session);

    let error = client.followings().await.unwrap_err();

    match error {
        ApiError::Status { status, body, .. } => {
            assert_eq!(status, 401);
            assert!(body.contains("Refresh token expired"));
        },
        other => panic!("expected refresh status error, got {other:?}"),
    }
    assert_eq!(session.token(), None);
    assert_eq!(session.navigator.visited(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn server_message_is_surfaced_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "Email already registered"})),
        )
        .mount(&server)
        .await;

    let session = TestSession::new();
    let client = client_for(&server, &session);

    let error = client
        .signup(&roost_api::SignupRequest {
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
            nickname: "ada".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(roost_api::error_message(&error), "Email already registered");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let config = ClientConfig::new("http://127.0.0.1:9").with_request_timeout(Duration::from_secs(2));
    let session = TestSession::new();
    let client = ApiClient::new(ReqwestTransport::new(&config).unwrap(), session.session.clone());

    let error = client.posts().await.unwrap_err();

    assert!(matches!(
        error,
        ApiError::Transport(TransportError::Connect(_) | TransportError::Timeout | TransportError::Request(_))
    ));
    assert!(!roost_api::error_message(&error).is_empty());
}
