//! Domain service behind the admin dashboard: global counters, user
//! management and the activity feed.

use serde::Serialize;
use thiserror::Error;

use crate::db::{ActivityEntry, PopularMovie, User};
use crate::domain::UserId;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("User not found")]
    UserNotFound,

    #[error("Cannot delete admin user")]
    ProtectedAdmin,

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AdminError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AdminError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Accounts with role `user`; admins are not counted.
    pub total_users: u64,
    pub total_watchlist_items: u64,
    pub total_watched: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserWithCounts {
    #[serde(flatten)]
    pub user: User,
    #[serde(rename = "watchlistCount")]
    pub watchlist_count: u64,
    #[serde(rename = "watchedCount")]
    pub watched_count: u64,
}

#[derive(Debug, Clone)]
pub struct UsersPage {
    pub users: Vec<UserWithCounts>,
    pub total: u64,
}

/// Fields an admin may change on an account. `None` leaves the field as is.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[async_trait::async_trait]
pub trait AdminService: Send + Sync {
    async fn dashboard_stats(&self) -> Result<DashboardStats, AdminError>;

    /// Movies saved by the most users, ties broken by ascending movie id.
    async fn popular_movies(&self, limit: u64) -> Result<Vec<PopularMovie>, AdminError>;

    async fn list_users(&self, page: u64, page_size: u64) -> Result<UsersPage, AdminError>;

    async fn update_user(&self, user_id: UserId, update: UserUpdate) -> Result<User, AdminError>;

    /// # Errors
    ///
    /// Returns [`AdminError::ProtectedAdmin`] if the target is an admin,
    /// including the caller's own account.
    async fn delete_user(&self, user_id: UserId) -> Result<(), AdminError>;

    async fn activity_logs(&self, limit: u64) -> Result<Vec<ActivityEntry>, AdminError>;
}
