//! User management (admin surface). Registration lives in the auth service.

use std::sync::Arc;

use tracing::instrument;

use emporium_core::UserId;

use crate::models::{User, UserUpdate};
use crate::store::{StoreError, UserStore};

use super::{Result, ServiceError};

/// User reads, updates, and deletion.
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub async fn user_by_id(&self, id: UserId) -> Result<User> {
        self.users
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", id))
    }

    /// # Errors
    ///
    /// Returns `Store` errors only.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.users.list().await?)
    }

    /// Update name and/or email.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist and `AlreadyExists`
    /// if the new email is taken.
    #[instrument(skip(self, update))]
    pub async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User> {
        match self.users.update(id, update).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(ServiceError::not_found("user", id)),
            Err(StoreError::Conflict(_)) => {
                Err(ServiceError::AlreadyExists("email".to_owned()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: UserId) -> Result<()> {
        if self.users.delete(id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found("user", id))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use emporium_core::{Email, Role};

    use crate::models::NewUser;
    use crate::store::memory::MemoryStore;

    use super::*;

    async fn fixture() -> (UserService, UserId) {
        let store = Arc::new(MemoryStore::new());
        let service = UserService::new(store.clone());

        let user = UserStore::create(
            store.as_ref(),
            NewUser {
                name: "Ada".to_owned(),
                email: Email::parse("ada@example.com").unwrap(),
                role: Role::Customer,
                password_hash: "hash".to_owned(),
            },
        )
        .await
        .unwrap();

        (service, user.id)
    }

    #[tokio::test]
    async fn test_update_user_name() {
        let (service, id) = fixture().await;

        let updated = service
            .update_user(
                id,
                UserUpdate {
                    name: Some("Ada Lovelace".to_owned()),
                    email: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Ada Lovelace");
        assert_eq!(updated.email.as_str(), "ada@example.com");
    }

    #[tokio::test]
    async fn test_delete_then_lookup_is_not_found() {
        let (service, id) = fixture().await;

        service.delete_user(id).await.unwrap();

        let err = service.user_by_id(id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = service.delete_user(id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
