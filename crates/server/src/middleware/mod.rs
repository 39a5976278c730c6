//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context) - binary only
//! 2. `TraceLayer` (request span with `request_id` field)
//! 3. Request ID (record, tag and echo `x-request-id`)
//! 4. `TimeoutLayer` (per-request wall-clock bound)
//! 5. Auth gate (route layer on protected routes only)

pub mod auth;
pub mod request_id;

pub use auth::{AuthenticatedUser, RequireAuth, require_auth};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
