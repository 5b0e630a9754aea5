//! Service layer: the engines behind the HTTP handlers.
//!
//! Each service owns one aggregate and is the only code that mutates it.
//! Services speak [`ServiceError`]; the HTTP layer maps the kinds to status
//! codes and stays out of the domain logic.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod files;
pub mod images;
pub mod orders;
pub mod users;

pub use auth::{AuthError, AuthService, AuthTokens, AuthenticatedUser};
pub use cart::CartService;
pub use catalog::CatalogService;
pub use files::{FileStore, LocalFileStore, MemoryFileStore};
pub use images::{ImageService, ImageUpload};
pub use orders::{OrderLine, OrderService};
pub use users::UserService;

use thiserror::Error;

use crate::store::StoreError;

/// Failure taxonomy shared by every service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A unique field is already taken.
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// The caller supplied a malformed or out-of-range argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The backing store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The file store failed.
    #[error("file storage error: {0}")]
    Files(#[from] std::io::Error),
}

impl ServiceError {
    /// `NotFound` with a `"{entity} {id}"` subject.
    pub(crate) fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{entity} {id}"))
    }
}

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
