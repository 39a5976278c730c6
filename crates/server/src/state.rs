//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AuthConfig;
use crate::db::Repositories;
use crate::services::{
    OrderService, PasswordHashing, PetService, ServiceError, TokenCodec, UserService,
};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; built once at startup and never mutated.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: Option<PgPool>,
    tokens: TokenCodec,
    pets: PetService,
    orders: OrderService,
    users: UserService,
}

impl AppState {
    /// Create state backed by `PostgreSQL`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Credential` if the password hasher cannot be
    /// primed.
    pub fn new(auth: &AuthConfig, pool: PgPool) -> Result<Self, ServiceError> {
        let repositories = Repositories::postgres(&pool);
        Self::build(auth, repositories, PasswordHashing::default(), Some(pool))
    }

    /// Create state over arbitrary repositories, with no database pool.
    ///
    /// Readiness always reports healthy for such state.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Credential` if the password hasher cannot be
    /// primed.
    pub fn from_repositories(
        auth: &AuthConfig,
        repositories: Repositories,
        passwords: PasswordHashing,
    ) -> Result<Self, ServiceError> {
        Self::build(auth, repositories, passwords, None)
    }

    fn build(
        auth: &AuthConfig,
        repositories: Repositories,
        passwords: PasswordHashing,
        pool: Option<PgPool>,
    ) -> Result<Self, ServiceError> {
        let tokens = TokenCodec::new(auth);
        let users = UserService::new(repositories.users, tokens.clone(), passwords)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                pool,
                tokens,
                pets: PetService::new(repositories.pets),
                orders: OrderService::new(repositories.orders),
                users,
            }),
        })
    }

    /// Database pool, when running against `PostgreSQL`.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenCodec {
        &self.inner.tokens
    }

    #[must_use]
    pub fn pets(&self) -> &PetService {
        &self.inner.pets
    }

    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }

    #[must_use]
    pub fn users(&self) -> &UserService {
        &self.inner.users
    }
}
