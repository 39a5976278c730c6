//! Database operations for the petstore `PostgreSQL` store.
//!
//! # Tables
//!
//! - `pets` - Flat pet rows; `category`, `photo_urls` and `tags` hold JSON text
//! - `orders` - Purchase orders
//! - `users` - Registered users (password column holds an Argon2 hash)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p petstore-cli -- migrate
//! ```
//!
//! # Repositories
//!
//! Each entity has a capability trait ([`PetRepository`], [`OrderRepository`],
//! [`UserRepository`]) with a `PostgreSQL` implementation. With the
//! `test-support` feature an in-memory implementation is also available.
//!
//! The `PostgreSQL` implementations are tested with `#[sqlx::test]` against a
//! fresh migrated database per test. Those tests are `#[ignore]`d; run them
//! with `DATABASE_URL` set and `cargo test -p petstore-server -- --ignored`.

pub mod mapper;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod orders;
pub mod pets;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use mapper::{MappingError, PetRow};
pub use orders::{OrderRepository, PgOrderRepository};
pub use pets::{PetRepository, PgPetRepository};
pub use users::{PgUserRepository, UserRepository};

/// Errors surfaced by repositories.
///
/// `NotFound` is an expected outcome and is kept apart from store failures so
/// callers can answer 404 instead of 500.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped back to its entity.
    #[error("data corruption: {0}")]
    DataCorruption(#[from] MappingError),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// A guard or constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Map a unique violation to `Conflict`, anything else to `Database`.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(err)
}

/// The set of repositories the services are built from.
#[derive(Clone)]
pub struct Repositories {
    pub pets: Arc<dyn PetRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// Repositories backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            pets: Arc::new(PgPetRepository::new(pool.clone())),
            orders: Arc::new(PgOrderRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
        }
    }

    /// Fresh, empty in-memory repositories.
    #[cfg(any(test, feature = "test-support"))]
    #[must_use]
    pub fn in_memory() -> Self {
        memory::MemoryStore::default().repositories()
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
