//! User repository for database operations.
//!
//! Users are addressed by `username` everywhere except the surrogate id the
//! store assigns on insert. The `password` column holds whatever the service
//! layer hands in; the service always hashes before calling here.

use async_trait::async_trait;
use sqlx::PgPool;

use petstore_core::{User, UserId};

use super::{RepositoryError, conflict_on_unique};

const USERNAME_TAKEN: &str = "username already exists";

/// Storage capability for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; the returned user carries the store-assigned id.
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    async fn create(&self, user: &User) -> Result<User, RepositoryError>;

    /// Insert users one at a time, stopping at the first failure.
    ///
    /// Not atomic: users inserted before the failing element stay committed.
    async fn create_batch(&self, users: &[User]) -> Result<Vec<User>, RepositoryError> {
        let mut created = Vec::with_capacity(users.len());
        for user in users {
            created.push(self.create(user).await?);
        }
        Ok(created)
    }

    async fn find_by_username(&self, username: &str) -> Result<User, RepositoryError>;

    /// Overwrite every field except `username` and `id`.
    ///
    /// An empty `user.password` keeps the stored password.
    async fn update(&self, username: &str, user: &User) -> Result<User, RepositoryError>;

    async fn delete(&self, username: &str) -> Result<(), RepositoryError>;
}

/// `PostgreSQL` user repository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: &User) -> Result<User, RepositoryError> {
        let id: UserId = sqlx::query_scalar(
            r"
            INSERT INTO users (username, first_name, last_name, email, password, phone, user_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.phone)
        .bind(user.user_status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, USERNAME_TAKEN))?;

        Ok(User {
            id,
            ..user.clone()
        })
    }

    async fn find_by_username(&self, username: &str) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            SELECT id, username, first_name, last_name, email, password, phone, user_status
            FROM users
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, username: &str, user: &User) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            UPDATE users
            SET first_name = $1,
                last_name = $2,
                email = $3,
                password = COALESCE(NULLIF($4, ''), password),
                phone = $5,
                user_status = $6
            WHERE username = $7
            RETURNING id, username, first_name, last_name, email, password, phone, user_status
            ",
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.phone)
        .bind(user.user_status)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, username: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
