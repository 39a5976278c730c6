//! Petstore Core - Shared domain types.
//!
//! This crate provides the types exchanged by every petstore component:
//! - `server` - HTTP gateway (handlers, services, repositories)
//! - `cli` - Command-line tools for migrations and token issuance
//!
//! # Architecture
//!
//! The core crate contains only types and their invariants - no I/O, no
//! database access, no HTTP. The optional `postgres` feature adds the `sqlx`
//! encode/decode impls needed to bind ids and read flat rows.
//!
//! # Modules
//!
//! - [`types`] - Typed ids, pet status, and the pet/order/user entities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
