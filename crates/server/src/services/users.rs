//! User service: registration, profile updates and login.

use std::sync::Arc;

use petstore_core::User;

use super::ServiceError;
use super::credentials::{PasswordHashing, TokenCodec};
use crate::db::{RepositoryError, UserRepository};

const ENTITY: &str = "user";

/// Verified against when the username is unknown, so a miss costs the same
/// as a wrong password.
const DUMMY_PASSWORD: &str = "petstore-login-timing-equaliser";

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    tokens: TokenCodec,
    passwords: PasswordHashing,
    dummy_hash: Arc<str>,
}

impl UserService {
    /// # Errors
    ///
    /// Returns `ServiceError::Credential` if the dummy login hash cannot be
    /// computed.
    pub fn new(
        repo: Arc<dyn UserRepository>,
        tokens: TokenCodec,
        passwords: PasswordHashing,
    ) -> Result<Self, ServiceError> {
        let dummy_hash = passwords.hash(DUMMY_PASSWORD)?.into();
        Ok(Self {
            repo,
            tokens,
            passwords,
            dummy_hash,
        })
    }

    /// Register a user. The stored password is an Argon2 hash.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an empty username and
    /// `ServiceError::Conflict` if the username is taken.
    pub async fn create_user(&self, user: &User) -> Result<User, ServiceError> {
        self.ensure_username_available(&user.username).await?;
        let created = self
            .repo
            .create(&self.with_hashed_password(user)?)
            .await
            .map_err(ServiceError::for_entity(ENTITY))?;

        tracing::info!(username = %created.username, "user created");
        Ok(created)
    }

    /// Register several users in order.
    ///
    /// Every element is validated and hashed before anything is written.
    /// Inserts are not atomic: the first failing insert stops the batch and
    /// users inserted before it stay committed.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing element.
    pub async fn create_users(&self, users: &[User]) -> Result<Vec<User>, ServiceError> {
        let mut prepared = Vec::with_capacity(users.len());
        for user in users {
            self.ensure_username_available(&user.username).await?;
            prepared.push(self.with_hashed_password(user)?);
        }

        let created = self
            .repo
            .create_batch(&prepared)
            .await
            .map_err(ServiceError::for_entity(ENTITY))?;

        tracing::info!(count = created.len(), "users created");
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no user has this username.
    pub async fn find_user_by_username(&self, username: &str) -> Result<User, ServiceError> {
        self.repo
            .find_by_username(username)
            .await
            .map_err(ServiceError::for_entity(ENTITY))
    }

    /// Overwrite the profile of `username`. A non-empty password is hashed;
    /// an empty one leaves the stored hash untouched.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no user has this username.
    pub async fn update_user(&self, username: &str, user: &User) -> Result<User, ServiceError> {
        let changes = if user.password.is_empty() {
            user.clone()
        } else {
            self.with_hashed_password(user)?
        };

        self.repo
            .update(username, &changes)
            .await
            .map_err(ServiceError::for_entity(ENTITY))
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no user has this username.
    pub async fn delete_user(&self, username: &str) -> Result<(), ServiceError> {
        self.repo
            .delete(username)
            .await
            .map_err(ServiceError::for_entity(ENTITY))?;

        tracing::info!(username, "user deleted");
        Ok(())
    }

    /// Check credentials and issue a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidCredentials` for an unknown user or a
    /// wrong password alike.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ServiceError> {
        let stored_hash = match self.repo.find_by_username(username).await {
            Ok(user) => Some(user.password),
            Err(RepositoryError::NotFound) => None,
            Err(e) => return Err(ServiceError::Repository(e)),
        };

        let hash = stored_hash.as_deref().unwrap_or(&self.dummy_hash);
        let matches = self.passwords.verify(password, hash);
        if !matches || stored_hash.is_none() {
            tracing::debug!(username, "login rejected");
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(self.tokens.issue(username)?)
    }

    /// Tokens are stateless, so there is nothing to revoke.
    pub const fn logout(&self) {}

    /// Only a definite not-found means the name is free.
    async fn ensure_username_available(&self, username: &str) -> Result<(), ServiceError> {
        if username.is_empty() {
            return Err(ServiceError::Validation("username cannot be empty".to_owned()));
        }
        match self.repo.find_by_username(username).await {
            Err(RepositoryError::NotFound) => Ok(()),
            Ok(_) => Err(ServiceError::Conflict("username already exists".to_owned())),
            Err(e) => Err(ServiceError::Repository(e)),
        }
    }

    fn with_hashed_password(&self, user: &User) -> Result<User, ServiceError> {
        Ok(User {
            password: self.passwords.hash(&user.password)?,
            ..user.clone()
        })
    }
}
