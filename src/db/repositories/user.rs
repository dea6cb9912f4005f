use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use serde::Serialize;
use tokio::task;

use crate::config::SecurityConfig;
use crate::domain::{Role, UserId};
use crate::entities::{prelude::*, users};

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub role: Role,
    pub profile_photo: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: UserId::new(model.id),
            username: model.username,
            email: model.email,
            role: model.role,
            profile_photo: model.profile_photo,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Fields needed to create an account. The password is plaintext here and
/// hashed before it reaches the database.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    pub role: Role,
    pub profile_photo: Option<String>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts a new account. Returns `None` when the username is taken,
    /// including the case where a concurrent insert won the race.
    pub async fn create(
        &self,
        new_user: NewUser,
        security: Option<&SecurityConfig>,
    ) -> Result<Option<User>> {
        if self.username_exists(&new_user.username).await? {
            return Ok(None);
        }

        let password = new_user.password;
        let security = security.cloned();
        let password_hash =
            task::spawn_blocking(move || hash_password(&password, security.as_ref()))
                .await
                .context("Password hashing task panicked")??;

        let now = crate::db::now();
        let active = users::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(password_hash),
            role: Set(new_user.role),
            profile_photo: Set(new_user.profile_photo),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(Some(User::from(model))),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(None)
            }
            Err(e) => Err(e).context("Failed to insert user"),
        }
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let count = Users::find()
            .filter(users::Column::Username.eq(username))
            .count(&self.conn)
            .await
            .context("Failed to check username")?;

        Ok(count > 0)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        let user = Users::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// Get user by username with password hash (for credential checks)
    pub async fn get_by_username_with_password(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    pub async fn update_profile_photo(
        &self,
        id: UserId,
        profile_photo: Option<String>,
    ) -> Result<Option<User>> {
        let Some(user) = Users::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query user for photo update")?
        else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        active.profile_photo = Set(profile_photo);
        active.updated_at = Set(crate::db::now());
        let updated = active.update(&self.conn).await?;

        Ok(Some(User::from(updated)))
    }

    /// Updates username and/or email. Fields left as `None` are untouched.
    pub async fn update_account(
        &self,
        id: UserId,
        username: Option<String>,
        email: Option<String>,
    ) -> Result<Option<User>> {
        let Some(user) = Users::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query user for update")?
        else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        if let Some(username) = username {
            active.username = Set(username);
        }
        if let Some(email) = email {
            active.email = Set(Some(email));
        }
        active.updated_at = Set(crate::db::now());
        let updated = active.update(&self.conn).await?;

        Ok(Some(User::from(updated)))
    }

    /// Deletes the account; watchlist, activity and token rows cascade.
    pub async fn delete(&self, id: UserId) -> Result<bool> {
        let result = Users::delete_by_id(id.value())
            .exec(&self.conn)
            .await
            .context("Failed to delete user")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_by_role(&self, role: Role) -> Result<u64> {
        let count = Users::find()
            .filter(users::Column::Role.eq(role))
            .count(&self.conn)
            .await?;

        Ok(count)
    }

    /// Newest accounts first. `page` is 1-based.
    pub async fn list(&self, page: u64, page_size: u64) -> Result<(Vec<User>, u64)> {
        let paginator = Users::find()
            .order_by_desc(users::Column::CreatedAt)
            .order_by_desc(users::Column::Id)
            .paginate(&self.conn, page_size);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items.into_iter().map(User::from).collect(), total))
    }
}

/// Verify a plaintext password against a stored PHC hash string.
/// Note: Argon2 is CPU-intensive, so this runs on the blocking pool.
pub async fn verify_password(password: &str, password_hash: String) -> Result<bool> {
    let password = password.to_string();

    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        Ok::<bool, anyhow::Error>(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the crate's default params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
