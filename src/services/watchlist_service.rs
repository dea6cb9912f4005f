//! Domain service for a user's saved movies.

use serde::Serialize;
use thiserror::Error;

use crate::db::{NewWatchlistEntry, WatchlistEntry};
use crate::domain::{UserId, WatchStatus};

#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error("Movie already in watchlist")]
    AlreadyInWatchlist,

    #[error("Movie not found in watchlist")]
    NotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for WatchlistError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for WatchlistError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Per-user counters shown on the user dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistStats {
    pub total_movies: u64,
    pub watchlist: u64,
    pub watched: u64,
}

#[derive(Debug, Clone)]
pub struct WatchlistPage {
    pub items: Vec<WatchlistEntry>,
    pub total: u64,
}

#[async_trait::async_trait]
pub trait WatchlistService: Send + Sync {
    /// Newest first. `page` is 1-based.
    async fn list(
        &self,
        user_id: UserId,
        status: Option<WatchStatus>,
        page: u64,
        page_size: u64,
    ) -> Result<WatchlistPage, WatchlistError>;

    /// Saves a movie with status `watchlist`.
    ///
    /// # Errors
    ///
    /// Returns [`WatchlistError::AlreadyInWatchlist`] if the user already
    /// saved this movie, including when a concurrent insert won the race.
    async fn add(
        &self,
        user_id: UserId,
        entry: NewWatchlistEntry,
    ) -> Result<WatchlistEntry, WatchlistError>;

    /// Removes the caller's own entry.
    async fn remove(&self, user_id: UserId, movie_id: i64) -> Result<(), WatchlistError>;

    async fn update_status(
        &self,
        user_id: UserId,
        movie_id: i64,
        status: WatchStatus,
    ) -> Result<WatchlistEntry, WatchlistError>;

    async fn stats(&self, user_id: UserId) -> Result<WatchlistStats, WatchlistError>;

    /// Status of the movie in the user's list, if saved.
    async fn status_for(
        &self,
        user_id: UserId,
        movie_id: i64,
    ) -> Result<Option<WatchStatus>, WatchlistError>;
}
