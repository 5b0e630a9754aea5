//! Emporium Core - Shared types library.
//!
//! This crate provides the common types used across the Emporium components:
//! - `api` - The JSON REST backend (catalog, cart, orders, images, auth)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. Database support is limited to optional `sqlx` trait impls behind
//! the `postgres` feature so the newtypes can be bound directly in queries.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, roles, statuses,
//!   and decimal money arithmetic

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
