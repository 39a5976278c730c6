//! Credential primitives: bearer tokens and password hashes.
//!
//! Tokens are compact JWS strings (`header.claims.signature`, each part
//! base64url without padding) signed with HMAC-SHA256. Only `HS256` is
//! accepted on verification.
//!
//! Passwords are hashed with Argon2id into PHC strings; verification reads
//! the parameters back out of the stored hash.

use std::time::Duration;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::config::AuthConfig;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

/// Errors issuing or checking credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Token is not three base64url segments of valid JSON.
    #[error("malformed token")]
    Malformed,

    /// Token header names an algorithm other than `HS256`.
    #[error("unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Signature does not match the signing key.
    #[error("invalid token signature")]
    BadSignature,

    /// Token `exp` is in the past.
    #[error("token expired")]
    Expired,

    /// Claims could not be serialized.
    #[error("failed to encode token: {0}")]
    Encode(#[from] serde_json::Error),

    /// The signing key was rejected by the MAC.
    #[error("invalid signing key")]
    InvalidKey,

    /// Argon2 failed to hash.
    #[error("password hashing error")]
    PasswordHash,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch. Absent means the token never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Issues and verifies HMAC-SHA256 bearer tokens.
#[derive(Clone)]
pub struct TokenCodec {
    secret: SecretString,
    ttl: Option<Duration>,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenCodec {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            ttl: config.token_ttl,
        }
    }

    /// Issue a token for `username`, valid from now.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError` if the claims cannot be encoded or signed.
    pub fn issue(&self, username: &str) -> Result<String, CredentialError> {
        self.issue_at(username, Utc::now().timestamp())
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError` if the token is malformed, signed with a
    /// different key or algorithm, or expired.
    pub fn verify(&self, token: &str) -> Result<Claims, CredentialError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    fn issue_at(&self, username: &str, now: i64) -> Result<String, CredentialError> {
        let exp = self
            .ttl
            .map(|ttl| now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)));
        let claims = Claims {
            username: username.to_owned(),
            iat: now,
            exp,
        };
        let header = Header {
            alg: ALGORITHM.to_owned(),
            typ: Some("JWT".to_owned()),
        };

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature}"))
    }

    fn verify_at(&self, token: &str, now: i64) -> Result<Claims, CredentialError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(CredentialError::Malformed);
        };

        let header: Header = decode_segment(header_b64)?;
        if header.alg != ALGORITHM {
            return Err(CredentialError::UnsupportedAlgorithm(header.alg));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| CredentialError::Malformed)?;

        // Signing input is the token up to the last '.', exactly as received.
        let signing_input_len = header_b64.len() + 1 + claims_b64.len();
        let signing_input = token
            .get(..signing_input_len)
            .ok_or(CredentialError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| CredentialError::BadSignature)?;

        let claims: Claims = decode_segment(claims_b64)?;
        if claims.exp.is_some_and(|exp| exp <= now) {
            return Err(CredentialError::Expired);
        }

        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256, CredentialError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| CredentialError::InvalidKey)
    }
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, CredentialError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| CredentialError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| CredentialError::Malformed)
}

/// Argon2id password hasher.
#[derive(Clone, Default)]
pub struct PasswordHashing {
    argon2: Argon2<'static>,
}

impl std::fmt::Debug for PasswordHashing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHashing").finish_non_exhaustive()
    }
}

impl PasswordHashing {
    /// Minimum-cost parameters so tests don't spend seconds hashing.
    #[cfg(any(test, feature = "test-support"))]
    #[must_use]
    pub fn low_cost() -> Self {
        use argon2::{Algorithm, Params, Version};

        let params = Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None)
            .unwrap_or_default();
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hash a password into a PHC string with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::PasswordHash` if Argon2 fails.
    pub fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| CredentialError::PasswordHash)
    }

    /// Check a password against a stored PHC string.
    ///
    /// A stored value that is not a PHC string never matches.
    #[must_use]
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        PasswordHash::new(hash).is_ok_and(|parsed| {
            self.argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }
}
