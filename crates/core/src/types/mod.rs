//! Core types for the petstore.
//!
//! This module provides type-safe wrappers and entity shapes for the domain.

pub mod id;
pub mod order;
pub mod pet;
pub mod response;
pub mod status;
pub mod user;

pub use id::*;
pub use order::Order;
pub use pet::{Category, Pet, Tag};
pub use response::ApiResponse;
pub use status::*;
pub use user::User;
