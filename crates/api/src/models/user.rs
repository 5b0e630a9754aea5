//! User domain types.

use serde::Serialize;

use emporium_core::{Email, Role, UserId};

/// A registered account.
///
/// Carries the argon2 password hash, so it is never serialized directly;
/// the API returns [`UserProfile`] instead.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address (unique across accounts).
    pub email: Email,
    /// Account role.
    pub role: Role,
    /// Argon2 PHC-format password hash.
    pub password_hash: String,
}

/// Parameters for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub role: Role,
    pub password_hash: String,
}

/// Partial user update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<Email>,
}

/// The public view of a [`User`].
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}
