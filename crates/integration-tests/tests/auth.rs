//! Bearer-token gate on protected routes.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use petstore_integration_tests::{TestApp, rex};
use petstore_server::config::AuthConfig;
use petstore_server::services::TokenCodec;
use secrecy::SecretString;

const PROTECTED: &[(&str, &str)] = &[
    ("POST", "/pet"),
    ("PUT", "/pet"),
    ("GET", "/pet/findByStatus?status=available"),
    ("GET", "/pet/findByTags?tags=cute"),
    ("GET", "/pet/1"),
    ("POST", "/pet/1"),
    ("DELETE", "/pet/1"),
    ("POST", "/pet/1/uploadImage"),
    ("GET", "/store/inventory"),
];

#[tokio::test]
async fn test_protected_routes_reject_missing_token() {
    let app = TestApp::new();

    for (method, uri) in PROTECTED {
        let method = Method::from_bytes(method.as_bytes()).unwrap();
        let response = app.json(method.clone(), uri, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(response.body["code"], 401);
    }
}

#[tokio::test]
async fn test_garbage_and_foreign_tokens_are_401() {
    let app = TestApp::new();
    let foreign = TokenCodec::new(&AuthConfig {
        jwt_secret: SecretString::from("Zq8#Lm3!Vb7@Nc1$Xd5%Wf9^Rg2&Th6*"),
        token_ttl: None,
    })
    .issue("alice")
    .unwrap();

    for token in ["not-a-token", "a.b.c", foreign.as_str()] {
        let response = app.json(Method::GET, "/pet/1", None, Some(token)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{token}");
    }
}

#[tokio::test]
async fn test_expired_token_is_401() {
    let app = TestApp::new();
    let expired = TokenCodec::new(&AuthConfig {
        token_ttl: Some(Duration::from_secs(1)),
        ..app.auth.clone()
    })
    .issue("alice")
    .unwrap();
    tokio::time::sleep(Duration::from_millis(2100)).await;

    let response = app.json(Method::GET, "/pet/1", None, Some(&expired)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_basic_scheme_is_401() {
    let app = TestApp::new();

    let response = app
        .send(
            Request::get("/store/inventory")
                .header(header::AUTHORIZATION, "Basic YWxpY2U6c2VjcmV0")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_issued_by_login_opens_protected_routes() {
    let app = TestApp::new();
    let token = app.login_as("alice", "secret123").await;

    let response = app.json(Method::POST, "/pet", Some(&rex()), Some(&token)).await;
    assert_eq!(response.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_public_routes_need_no_token() {
    let app = TestApp::new();

    assert_eq!(app.json(Method::GET, "/health", None, None).await.status, StatusCode::OK);
    assert_eq!(
        app.json(Method::GET, "/health/ready", None, None).await.status,
        StatusCode::OK
    );
    assert_eq!(
        app.json(Method::GET, "/user/logout", None, None).await.status,
        StatusCode::OK
    );
    assert_eq!(
        app.json(Method::GET, "/store/order/1", None, None).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = TestApp::new();
    let response = app
        .send(
            Request::get("/health")
                .header("x-request-id", "trace-me")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers["x-request-id"], "trace-me");

    let generated = app.json(Method::GET, "/health", None, None).await;
    assert!(generated.headers.contains_key("x-request-id"));
}
