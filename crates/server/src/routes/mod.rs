//! HTTP routes for the petstore gateway.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                    - Liveness
//! GET  /health/ready              - Readiness (database ping)
//!
//! # Pets (bearer token required)
//! POST   /pet                     - Add a pet
//! PUT    /pet                     - Replace a pet
//! GET    /pet/findByStatus        - ?status=a,b
//! GET    /pet/findByTags          - ?tags=a,b
//! GET    /pet/{petId}             - Find by id
//! POST   /pet/{petId}             - Form update of name/status
//! DELETE /pet/{petId}             - Delete
//! POST   /pet/{petId}/uploadImage - Multipart upload (stub)
//!
//! # Store
//! POST   /store/order             - Place an order
//! GET    /store/order/{orderId}   - Find order
//! DELETE /store/order/{orderId}   - Delete (409 if delivered)
//! GET    /store/inventory         - Counts by status (bearer token required)
//!
//! # Users
//! POST   /user                    - Register
//! POST   /user/createWithList     - Register many
//! POST   /user/createWithArray    - Register many
//! GET    /user/login              - ?username=&password= -> {"token"}
//! GET    /user/logout             - No-op
//! GET    /user/{username}         - Find
//! PUT    /user/{username}         - Update
//! DELETE /user/{username}         - Delete
//! ```

pub mod health;
pub mod pets;
pub mod store;
pub mod users;

use std::time::Duration;

use axum::{
    Router,
    extract::Request,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::middleware::{request_id_middleware, require_auth};
use crate::state::AppState;

/// Routes that need a bearer token.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/pet", post(pets::create).put(pets::update))
        .route("/pet/findByStatus", get(pets::find_by_status))
        .route("/pet/findByTags", get(pets::find_by_tags))
        .route(
            "/pet/{petId}",
            get(pets::show)
                .post(pets::update_form)
                .delete(pets::delete),
        )
        .route("/pet/{petId}/uploadImage", post(pets::upload_image))
        .route("/store/inventory", get(store::inventory))
}

/// Routes open to anonymous callers.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/store/order", post(store::place_order))
        .route(
            "/store/order/{orderId}",
            get(store::show_order).delete(store::delete_order),
        )
        .route("/user", post(users::create))
        .route("/user/createWithList", post(users::create_batch))
        .route("/user/createWithArray", post(users::create_batch))
        .route("/user/login", get(users::login))
        .route("/user/logout", get(users::logout))
        .route(
            "/user/{username}",
            get(users::show).put(users::update).delete(users::delete),
        )
}

/// Build the full application router.
///
/// Sentry layers are added by the binary on top of this.
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    let protected =
        protected_routes().route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes())
        .merge(protected)
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            // Path only: `/user/login` carries the password in its query.
            tracing::info_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = tracing::field::Empty,
            )
        }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use secrecy::SecretString;
    use tower::ServiceExt;

    use super::*;
    use crate::config::AuthConfig;
    use crate::db::Repositories;
    use crate::services::PasswordHashing;

    /// Log sink shared between the subscriber and the test.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn test_app() -> Router {
        let auth = AuthConfig {
            jwt_secret: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6e"),
            token_ttl: None,
        };
        let state =
            AppState::from_repositories(&auth, Repositories::in_memory(), PasswordHashing::low_cost())
                .unwrap();
        app(state, Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_login_password_never_reaches_logs() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter("petstore_server=debug,tower_http=debug")
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let app = test_app();
        let register = Request::post("/user")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"username":"alice","password":"Hunter2Secret"}"#))
            .unwrap();
        let response = app.clone().oneshot(register).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        for password in ["Hunter2Secret", "Hunter2Wrong"] {
            let login = Request::get(format!("/user/login?username=alice&password={password}"))
                .body(Body::empty())
                .unwrap();
            app.clone().oneshot(login).await.unwrap();
        }

        let output = logs.contents();
        assert!(output.contains("/user/login"), "request span was not logged");
        assert!(!output.contains("Hunter2Secret"));
        assert!(!output.contains("Hunter2Wrong"));
    }
}
