//! `SeaORM` implementation of the `AuthService` trait.

use crate::config::SecurityConfig;
use crate::db::repositories::user::verify_password;
use crate::db::{NewUser, Store, User};
use crate::domain::{ActivityAction, Identity, Role, UserId};
use crate::services::activity::ActivityLogger;
use crate::services::auth_service::{AuthError, AuthService, AuthSession, Registration};
use crate::services::token::TokenService;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

pub struct SeaOrmAuthService {
    store: Store,
    tokens: TokenService,
    activity: ActivityLogger,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(
        store: Store,
        tokens: TokenService,
        activity: ActivityLogger,
        security: SecurityConfig,
    ) -> Self {
        Self {
            store,
            tokens,
            activity,
            security,
        }
    }

    fn open_session(&self, user: User) -> Result<AuthSession, AuthError> {
        let identity = Identity {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        };
        let token = self
            .tokens
            .issue(&identity)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(AuthSession { token, user })
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        registration: Registration,
        role: Role,
    ) -> Result<AuthSession, AuthError> {
        let username = registration.username.trim().to_string();
        if username.is_empty() || registration.password.is_empty() {
            return Err(AuthError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let user = self
            .store
            .create_user(
                NewUser {
                    username,
                    email: registration.email.filter(|e| !e.trim().is_empty()),
                    password: registration.password,
                    role,
                    profile_photo: registration.profile_photo,
                },
                Some(&self.security),
            )
            .await?
            .ok_or(AuthError::DuplicateUsername)?;

        info!(user_id = %user.id, role = role.as_str(), "Account registered");
        metrics::counter!("accounts_registered_total", "role" => role.as_str()).increment(1);

        self.open_session(user)
    }

    async fn login(
        &self,
        username: &str,
        password: &str,
        required_role: Option<Role>,
    ) -> Result<AuthSession, AuthError> {
        let Some((user, password_hash)) = self
            .store
            .get_user_by_username_with_password(username)
            .await?
        else {
            return Err(AuthError::InvalidCredentials);
        };

        if let Some(expected) = required_role
            && user.role != expected
        {
            return Err(AuthError::WrongAccountType { expected });
        }

        if !verify_password(password, password_hash).await? {
            debug!(user_id = %user.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        if user.role == Role::User {
            self.activity
                .record(
                    user.id,
                    ActivityAction::Login,
                    Some("User logged in".to_string()),
                )
                .await;
        }

        self.open_session(user)
    }

    async fn logout(&self, token: &str, user_id: UserId) -> Result<(), AuthError> {
        let expires_at = match self.tokens.decode_expiry(token) {
            Ok(exp) => exp,
            Err(e) => {
                warn!(error = %e, "Could not read token expiry, keeping it for a full TTL");
                let ttl_hours = i64::try_from(self.security.token_ttl_hours).unwrap_or(24);
                Utc::now() + chrono::Duration::hours(ttl_hours)
            }
        };

        self.store
            .blacklist_token(token, user_id, expires_at)
            .await?;
        debug!(user_id = %user_id, "Token blacklisted");

        Ok(())
    }

    async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        if self.store.is_token_blacklisted(token).await? {
            return Err(AuthError::InvalidatedToken);
        }

        self.tokens.verify(token).map_err(|e| {
            debug!(error = %e, "Token rejected");
            AuthError::InvalidToken
        })
    }

    async fn profile(&self, user_id: UserId) -> Result<User, AuthError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn update_profile_photo(
        &self,
        user_id: UserId,
        profile_photo: Option<String>,
    ) -> Result<User, AuthError> {
        self.store
            .update_user_photo(user_id, profile_photo)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn service() -> SeaOrmAuthService {
        let db_path =
            std::env::temp_dir().join(format!("cinelist-auth-test-{}.db", uuid::Uuid::new_v4()));
        let store = Store::new(&format!("sqlite:{}", db_path.display()))
            .await
            .unwrap();
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };
        SeaOrmAuthService::new(
            store.clone(),
            TokenService::new(b"unit-test-secret", Duration::hours(24)),
            ActivityLogger::new(store),
            security,
        )
    }

    fn registration(username: &str, password: &str) -> Registration {
        Registration {
            username: username.to_string(),
            password: password.to_string(),
            email: None,
            profile_photo: None,
        }
    }

    #[tokio::test]
    async fn test_register_then_login_roundtrip() {
        let auth = service().await;
        let registered = auth
            .register(registration("alice", "pw123"), Role::User)
            .await
            .unwrap();

        let session = auth.login("alice", "pw123", None).await.unwrap();
        let identity = auth.authenticate(&session.token).await.unwrap();

        assert_eq!(identity.id, registered.user.id);
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.role, Role::User);
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let auth = service().await;
        auth.register(registration("alice", "pw123"), Role::User)
            .await
            .unwrap();

        let err = auth
            .register(registration("alice", "other"), Role::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUsername));
    }

    #[tokio::test]
    async fn test_register_requires_fields() {
        let auth = service().await;
        let err = auth
            .register(registration("  ", "pw"), Role::User)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user() {
        let auth = service().await;
        auth.register(registration("alice", "pw123"), Role::User)
            .await
            .unwrap();

        assert!(matches!(
            auth.login("alice", "nope", None).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody", "pw123", None).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_wrong_account_type_precedes_password_check() {
        let auth = service().await;
        auth.register(registration("alice", "pw123"), Role::User)
            .await
            .unwrap();

        // Wrong password too, but the role mismatch wins.
        assert!(matches!(
            auth.login("alice", "bad", Some(Role::Admin)).await,
            Err(AuthError::WrongAccountType {
                expected: Role::Admin
            })
        ));
        assert!(matches!(
            auth.login("admin", "admin123", Some(Role::User)).await,
            Err(AuthError::WrongAccountType {
                expected: Role::User
            })
        ));
        assert!(
            auth.login("admin", "admin123", Some(Role::Admin))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_only_user_logins_are_logged() {
        let auth = service().await;
        auth.register(registration("alice", "pw123"), Role::User)
            .await
            .unwrap();

        auth.login("alice", "pw123", Some(Role::User))
            .await
            .unwrap();
        auth.login("admin", "admin123", Some(Role::Admin))
            .await
            .unwrap();

        let entries = auth.store.recent_activity(10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, ActivityAction::Login);
        assert_eq!(
            entries[0].user.as_ref().map(|u| u.username.as_str()),
            Some("alice")
        );
    }

    #[tokio::test]
    async fn test_logout_invalidates_token() {
        let auth = service().await;
        let session = auth
            .register(registration("alice", "pw123"), Role::User)
            .await
            .unwrap();

        auth.logout(&session.token, session.user.id).await.unwrap();
        // Idempotent.
        auth.logout(&session.token, session.user.id).await.unwrap();

        assert!(matches!(
            auth.authenticate(&session.token).await,
            Err(AuthError::InvalidatedToken)
        ));
        assert!(auth.tokens.verify(&session.token).is_ok());
    }

    #[tokio::test]
    async fn test_authenticate_rejects_forged_token() {
        let auth = service().await;
        let forged = TokenService::new(b"someone-else", Duration::hours(1))
            .issue(&Identity {
                id: UserId::new(1),
                username: "admin".to_string(),
                role: Role::Admin,
            })
            .unwrap();

        assert!(matches!(
            auth.authenticate(&forged).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_profile_photo_update() {
        let auth = service().await;
        let session = auth
            .register(registration("alice", "pw123"), Role::User)
            .await
            .unwrap();

        let updated = auth
            .update_profile_photo(
                session.user.id,
                Some("data:image/png;base64,AAAA".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(
            updated.profile_photo.as_deref(),
            Some("data:image/png;base64,AAAA")
        );

        assert!(matches!(
            auth.profile(UserId::new(4242)).await,
            Err(AuthError::UserNotFound)
        ));
    }
}
