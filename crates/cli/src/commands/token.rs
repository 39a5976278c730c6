//! Issue a bearer token without going through `/user/login`.
//!
//! Handy for calling protected routes by hand:
//!
//! ```bash
//! TOKEN=$(petstore-cli token --username alice)
//! curl -H "Authorization: Bearer $TOKEN" localhost:8080/store/inventory
//! ```
//!
//! Uses `PETSTORE_JWT_SECRET` and `PETSTORE_TOKEN_TTL_SECS` exactly as the
//! server does, so the token verifies against a server sharing that `.env`.

use petstore_server::config::{AuthConfig, ConfigError};
use petstore_server::services::{CredentialError, TokenCodec};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to sign token: {0}")]
    Credential(#[from] CredentialError),

    #[error("Username cannot be empty")]
    EmptyUsername,
}

/// Print a signed token for `username` to stdout.
///
/// # Errors
///
/// Returns `TokenError` if the signing settings are missing or insecure.
pub fn issue(username: &str) -> Result<(), TokenError> {
    if username.is_empty() {
        return Err(TokenError::EmptyUsername);
    }

    let _ = dotenvy::dotenv();
    let codec = TokenCodec::new(&AuthConfig::from_env()?);
    let token = codec.issue(username)?;

    tracing::info!(username, "token issued");
    #[allow(clippy::print_stdout)]
    {
        println!("{token}");
    }
    Ok(())
}
