//! Auth Gateway.
//!
//! Issues and validates the bearer tokens the rest of the core trusts.
//! Registration and login hash passwords with argon2; tokens are HS256
//! JWTs carrying the user id, role, and a token kind so a refresh token
//! can never be used as an access token. Verification is stateless: the
//! extractors trust the validated claims without a store round-trip.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use emporium_core::{Email, Role, UserId};

use crate::models::NewUser;
use crate::store::UserStore;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Access tokens live 15 minutes.
const ACCESS_TOKEN_TTL_MINUTES: i64 = 15;

/// Refresh tokens live 2 days.
const REFRESH_TOKEN_TTL_DAYS: i64 = 2;

/// What a token is good for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id.
    sub: i64,
    role: Role,
    kind: TokenKind,
    iat: i64,
    exp: i64,
}

/// The identity resolved from a validated access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub role: Role,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Tokens and identity returned by register/login.
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: UserId,
    pub email: Email,
    pub role: Role,
}

/// Authentication service.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: &SecretString) -> Self {
        let secret = jwt_secret.expose_secret().as_bytes();
        Self {
            users,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Register a new account and issue its first token pair.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEmail`, `WeakPassword`, or `UserAlreadyExists`.
    #[instrument(skip(self, email, password), fields(email))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<AuthTokens, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(NewUser {
                name: name.to_owned(),
                email,
                role: role.unwrap_or_default(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                crate::store::StoreError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Store(other),
            })?;

        tracing::info!(user_id = %user.id, "user registered");
        self.issue_tokens(user.id, &user.email, user.role)
    }

    /// Verify credentials and issue a token pair.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` for an unknown email or wrong password.
    #[instrument(skip(self, email, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthTokens, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        self.issue_tokens(user.id, &user.email, user.role)
    }

    /// Exchange a refresh token for a fresh access token.
    ///
    /// # Errors
    ///
    /// Returns `TokenInvalid`/`TokenExpired` for a bad token and
    /// `InvalidCredentials` if the account no longer exists.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.decode(refresh_token)?;
        if claims.kind != TokenKind::Refresh {
            return Err(AuthError::TokenInvalid);
        }

        // Re-read the account so a deleted user or changed role cannot keep
        // minting access tokens from an old refresh token.
        let user = self
            .users
            .get(UserId::new(claims.sub))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.encode(user.id, user.role, TokenKind::Access)
    }

    /// Validate an access token and return the caller identity.
    ///
    /// # Errors
    ///
    /// Returns `TokenInvalid` or `TokenExpired`.
    pub fn verify_access(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.decode(token)?;
        if claims.kind != TokenKind::Access {
            return Err(AuthError::TokenInvalid);
        }

        Ok(AuthenticatedUser {
            id: UserId::new(claims.sub),
            role: claims.role,
        })
    }

    fn issue_tokens(
        &self,
        user_id: UserId,
        email: &Email,
        role: Role,
    ) -> Result<AuthTokens, AuthError> {
        Ok(AuthTokens {
            access_token: self.encode(user_id, role, TokenKind::Access)?,
            refresh_token: self.encode(user_id, role, TokenKind::Refresh)?,
            user_id,
            email: email.clone(),
            role,
        })
    }

    fn encode(&self, user_id: UserId, role: Role, kind: TokenKind) -> Result<String, AuthError> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => Duration::minutes(ACCESS_TOKEN_TTL_MINUTES),
            TokenKind::Refresh => Duration::days(REFRESH_TOKEN_TTL_DAYS),
        };

        let claims = Claims {
            sub: user_id.as_i64(),
            role,
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenInvalid)
    }

    fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            })
    }
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthError::PasswordHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::store::memory::MemoryStore;

    use super::*;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryStore::new()),
            &SecretString::from("kD93mQ7xLapR2vN8wZc4yTb6hJf1sGu0"),
        )
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = service();

        let registered = auth
            .register("Ada", "ada@example.com", "correct horse battery", None)
            .await
            .unwrap();
        assert_eq!(registered.role, Role::Customer);

        let tokens = auth
            .login("ada@example.com", "correct horse battery")
            .await
            .unwrap();
        assert_eq!(tokens.user_id, registered.user_id);

        let identity = auth.verify_access(&tokens.access_token).unwrap();
        assert_eq!(identity.id, registered.user_id);
        assert_eq!(identity.role, Role::Customer);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let auth = service();
        auth.register("Ada", "ada@example.com", "correct horse battery", None)
            .await
            .unwrap();

        let err = auth.login("ada@example.com", "wrong password").await;
        assert!(matches!(err, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_unknown_email_rejected() {
        let auth = service();
        let err = auth.login("ghost@example.com", "whatever!").await;
        assert!(matches!(err, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let auth = service();
        auth.register("Ada", "ada@example.com", "correct horse battery", None)
            .await
            .unwrap();

        let err = auth
            .register("Ada II", "ada@example.com", "another password", None)
            .await;
        assert!(matches!(err, Err(AuthError::UserAlreadyExists)));
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let auth = service();
        let err = auth.register("Ada", "ada@example.com", "short", None).await;
        assert!(matches!(err, Err(AuthError::WeakPassword(_))));
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_an_access_token() {
        let auth = service();
        let tokens = auth
            .register("Ada", "ada@example.com", "correct horse battery", None)
            .await
            .unwrap();

        let err = auth.verify_access(&tokens.refresh_token);
        assert!(matches!(err, Err(AuthError::TokenInvalid)));
    }

    #[tokio::test]
    async fn test_refresh_issues_access_token() {
        let auth = service();
        let tokens = auth
            .register("Ada", "ada@example.com", "correct horse battery", None)
            .await
            .unwrap();

        let access = auth.refresh(&tokens.refresh_token).await.unwrap();
        let identity = auth.verify_access(&access).unwrap();
        assert_eq!(identity.id, tokens.user_id);
    }

    #[tokio::test]
    async fn test_access_token_cannot_refresh() {
        let auth = service();
        let tokens = auth
            .register("Ada", "ada@example.com", "correct horse battery", None)
            .await
            .unwrap();

        let err = auth.refresh(&tokens.access_token).await;
        assert!(matches!(err, Err(AuthError::TokenInvalid)));
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let auth = service();
        assert!(matches!(
            auth.verify_access("not-a-token"),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[tokio::test]
    async fn test_admin_role_carried_in_claims() {
        let auth = service();
        let tokens = auth
            .register("Root", "root@example.com", "correct horse battery", Some(Role::Admin))
            .await
            .unwrap();

        let identity = auth.verify_access(&tokens.access_token).unwrap();
        assert!(identity.is_admin());
    }
}
