//! Service-layer error type.

use thiserror::Error;

use super::credentials::CredentialError;
use crate::db::RepositoryError;

/// Coarse classification the HTTP layer maps to status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    Conflict,
    Internal,
}

/// Errors returned by the pet, order and user services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed a domain rule.
    #[error("{0}")]
    Validation(String),

    /// Referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Login failed. Deliberately does not say which part was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Write rejected by a uniqueness rule or state guard.
    #[error("{0}")]
    Conflict(String),

    /// Store failure or corrupt stored data.
    #[error("repository error: {0}")]
    Repository(#[source] RepositoryError),

    /// Hashing or token signing failed.
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),
}

impl ServiceError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidCredentials => ErrorKind::Unauthorized,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Repository(_) | Self::Credential(_) => ErrorKind::Internal,
        }
    }

    /// Build a mapper from repository errors that names `entity` in the
    /// not-found message.
    pub(crate) fn for_entity(entity: &'static str) -> impl Fn(RepositoryError) -> Self {
        move |err| match err {
            RepositoryError::NotFound => Self::NotFound(format!("{entity} not found")),
            RepositoryError::Conflict(message) => Self::Conflict(message),
            other => Self::Repository(other),
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        Self::for_entity("resource")(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_errors_keep_their_class() {
        let not_found = ServiceError::for_entity("pet")(RepositoryError::NotFound);
        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        assert_eq!(not_found.to_string(), "pet not found");

        let conflict = ServiceError::from(RepositoryError::Conflict("taken".to_owned()));
        assert_eq!(conflict.kind(), ErrorKind::Conflict);

        let store = ServiceError::from(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(store.kind(), ErrorKind::Internal);
    }
}
