use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

use crate::domain::UserId;
use crate::entities::{prelude::*, tokens};

pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Adds a token to the blacklist. Adding the same token twice is a no-op.
    pub async fn blacklist(&self, token: &str, user_id: UserId, expires_at: &str) -> Result<()> {
        if self.is_blacklisted(token).await? {
            return Ok(());
        }

        let active = tokens::ActiveModel {
            token: Set(token.to_string()),
            user_id: Set(user_id.value()),
            expires_at: Set(expires_at.to_string()),
            created_at: Set(crate::db::now()),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to blacklist token")?;
        Ok(())
    }

    /// Presence alone revokes the token; `expires_at` is not consulted.
    pub async fn is_blacklisted(&self, token: &str) -> Result<bool> {
        let count = Tokens::find()
            .filter(tokens::Column::Token.eq(token))
            .count(&self.conn)
            .await
            .context("Failed to query token blacklist")?;

        Ok(count > 0)
    }

    /// Drops rows whose token expired before `now`. Those tokens fail
    /// signature-time validation anyway.
    pub async fn prune_expired(&self, now: &str) -> Result<u64> {
        let result = Tokens::delete_many()
            .filter(tokens::Column::ExpiresAt.lt(now))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }
}
