//! Domain service for accounts and bearer-token sessions.
//!
//! Handles registration, role-restricted login, logout through the token
//! blacklist, and resolving a presented token to an [`Identity`].

use serde::Serialize;
use thiserror::Error;

use crate::db::User;
use crate::domain::{Identity, Role, UserId};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Access token required")]
    MissingCredentials,

    #[error("Token has been invalidated")]
    InvalidatedToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Access denied. This account is not {} account.", article(.expected))]
    WrongAccountType { expected: Role },

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

const fn article(role: &Role) -> &'static str {
    match role {
        Role::User => "a user",
        Role::Admin => "an admin",
    }
}

/// Registration input. `role` is chosen by the endpoint, never the client.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub profile_photo: Option<String>,
}

/// A freshly issued token together with the account it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account with the given role and signs it in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateUsername`] if the username is taken.
    async fn register(&self, registration: Registration, role: Role)
    -> Result<AuthSession, AuthError>;

    /// Verifies credentials. With `required_role`, an account of another
    /// role fails with [`AuthError::WrongAccountType`] before the password
    /// is checked.
    async fn login(
        &self,
        username: &str,
        password: &str,
        required_role: Option<Role>,
    ) -> Result<AuthSession, AuthError>;

    /// Revokes `token` until its natural expiry. Idempotent.
    async fn logout(&self, token: &str, user_id: UserId) -> Result<(), AuthError>;

    /// Resolves a bearer token: blacklist first, then signature and expiry.
    async fn authenticate(&self, token: &str) -> Result<Identity, AuthError>;

    async fn profile(&self, user_id: UserId) -> Result<User, AuthError>;

    async fn update_profile_photo(
        &self,
        user_id: UserId,
        profile_photo: Option<String>,
    ) -> Result<User, AuthError>;
}
