//! Integration tests for the petstore gateway.
//!
//! Each test builds the full router (auth gate, request ids, timeout) over
//! fresh in-memory repositories and drives it in-process with
//! `tower::ServiceExt::oneshot`. No database or network is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p petstore-integration-tests
//! ```

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use petstore_server::config::AuthConfig;
use petstore_server::db::memory::MemoryStore;
use petstore_server::routes;
use petstore_server::services::PasswordHashing;
use petstore_server::state::AppState;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

/// Signing key shared by every test app.
pub const TEST_JWT_SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6e";

/// A router over its own in-memory store.
pub struct TestApp {
    router: Router,
    pub store: MemoryStore,
    pub auth: AuthConfig,
}

/// Status and parsed JSON body (`Value::Null` when the body is empty or not JSON).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    /// # Panics
    ///
    /// Panics if the application state cannot be built.
    #[must_use]
    pub fn new() -> Self {
        let store = MemoryStore::default();
        let auth = AuthConfig {
            jwt_secret: SecretString::from(TEST_JWT_SECRET),
            token_ttl: Some(Duration::from_secs(3600)),
        };
        let state =
            AppState::from_repositories(&auth, store.repositories(), PasswordHashing::low_cost())
                .expect("test state");

        Self {
            router: routes::app(state, Duration::from_secs(10)),
            store,
            auth,
        }
    }

    /// Send a request and collect the response.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Send `method uri` with an optional JSON body and bearer token.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        self.send(request).await
    }

    /// Register `username` with `password` and log in, returning the token.
    ///
    /// # Panics
    ///
    /// Panics if registration or login does not succeed.
    pub async fn login_as(&self, username: &str, password: &str) -> String {
        let user = serde_json::json!({ "username": username, "password": password });
        let created = self.json(Method::POST, "/user", Some(&user), None).await;
        assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);

        let login = self
            .json(
                Method::GET,
                &format!("/user/login?username={username}&password={password}"),
                None,
                None,
            )
            .await;
        assert_eq!(login.status, StatusCode::OK, "{:?}", login.body);

        login.body["token"]
            .as_str()
            .expect("token in login body")
            .to_owned()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// The canonical pet payload.
#[must_use]
pub fn rex() -> Value {
    serde_json::json!({
        "id": 1,
        "category": { "id": 1, "name": "Dog" },
        "name": "Rex",
        "photoUrls": ["http://x"],
        "tags": [{ "id": 1, "name": "cute" }],
        "status": "available"
    })
}
