//! Business logic services.
//!
//! # Services
//!
//! - [`PetService`] - Pet validation and lifecycle
//! - [`OrderService`] - Orders and inventory
//! - [`UserService`] - Accounts, password hashing, login
//!
//! Services hold repositories as trait objects, so the same logic runs
//! against `PostgreSQL` in production and the in-memory store in tests.

pub mod credentials;
mod error;
pub mod orders;
pub mod pets;
pub mod users;

pub use credentials::{Claims, CredentialError, PasswordHashing, TokenCodec};
pub use error::{ErrorKind, ServiceError};
pub use orders::OrderService;
pub use pets::PetService;
pub use users::UserService;
