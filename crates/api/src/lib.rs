//! Emporium API - JSON REST backend library.
//!
//! Everything the binary wires together lives here so the integration
//! tests can build the same router over the in-memory stores.
//!
//! # Architecture
//!
//! - [`routes`] - Thin axum handlers speaking the `{"message", "data"}` envelope
//! - [`services`] - The engines: cart pricing, order placement, image ledger,
//!   catalog, users, auth
//! - [`store`] - Persistence seam with `PostgreSQL` and in-memory implementations
//! - [`models`] - Domain types, separate from rows and wire DTOs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use config::ApiConfig;
pub use error::AppError;
pub use routes::router;
pub use state::{AppState, Stores};
