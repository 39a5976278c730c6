//! Petstore gateway library.
//!
//! Pets, orders and users over HTTP, backed by `PostgreSQL` and gated by
//! bearer tokens. The binary in `main.rs` wires configuration, Sentry and
//! the pool around [`routes::app`]; tests build the same router over
//! in-memory repositories.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
