use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::domain::{UserId, WatchStatus};
use crate::entities::{prelude::*, watchlist};

/// Catalog metadata captured when a movie is saved.
#[derive(Debug, Clone)]
pub struct NewWatchlistEntry {
    pub movie_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub overview: Option<String>,
}

/// A movie ranked by how many distinct users saved it.
#[derive(Debug, Clone, Serialize)]
pub struct PopularMovie {
    pub movie_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub overview: Option<String>,
    pub save_count: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub watchlist: u64,
    pub watched: u64,
}

pub struct WatchlistRepository {
    conn: DatabaseConnection,
}

impl WatchlistRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Newest entries first, optionally filtered by status. `page` is 1-based.
    pub async fn list(
        &self,
        user_id: UserId,
        status: Option<WatchStatus>,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<watchlist::Model>, u64)> {
        let mut query = Watchlist::find().filter(watchlist::Column::UserId.eq(user_id.value()));

        if let Some(status) = status {
            query = query.filter(watchlist::Column::Status.eq(status));
        }

        let paginator = query
            .order_by_desc(watchlist::Column::CreatedAt)
            .order_by_desc(watchlist::Column::Id)
            .paginate(&self.conn, page_size);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total))
    }

    pub async fn find(&self, user_id: UserId, movie_id: i64) -> Result<Option<watchlist::Model>> {
        let entry = Watchlist::find()
            .filter(watchlist::Column::UserId.eq(user_id.value()))
            .filter(watchlist::Column::MovieId.eq(movie_id))
            .one(&self.conn)
            .await
            .context("Failed to query watchlist entry")?;

        Ok(entry)
    }

    /// Inserts with status `watchlist`. Returns `None` if the unique index on
    /// `(user_id, movie_id)` rejected the row.
    pub async fn insert(
        &self,
        user_id: UserId,
        entry: NewWatchlistEntry,
    ) -> Result<Option<watchlist::Model>> {
        let now = crate::db::now();
        let active = watchlist::ActiveModel {
            user_id: Set(user_id.value()),
            movie_id: Set(entry.movie_id),
            title: Set(entry.title),
            poster_path: Set(entry.poster_path),
            release_date: Set(entry.release_date),
            vote_average: Set(entry.vote_average),
            overview: Set(entry.overview),
            status: Set(WatchStatus::Watchlist),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(Some(model)),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(None)
            }
            Err(e) => Err(e).context("Failed to insert watchlist entry"),
        }
    }

    /// Deletes the caller's own entry only. Returns rows removed.
    pub async fn delete(&self, user_id: UserId, movie_id: i64) -> Result<u64> {
        let result = Watchlist::delete_many()
            .filter(watchlist::Column::UserId.eq(user_id.value()))
            .filter(watchlist::Column::MovieId.eq(movie_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete watchlist entry")?;

        Ok(result.rows_affected)
    }

    pub async fn update_status(
        &self,
        user_id: UserId,
        movie_id: i64,
        status: WatchStatus,
    ) -> Result<Option<watchlist::Model>> {
        let Some(entry) = self.find(user_id, movie_id).await? else {
            return Ok(None);
        };

        let mut active: watchlist::ActiveModel = entry.into();
        active.status = Set(status);
        active.updated_at = Set(crate::db::now());
        let updated = active.update(&self.conn).await?;

        Ok(Some(updated))
    }

    /// Counts rows, optionally scoped to one user and/or one status.
    pub async fn count(&self, user_id: Option<UserId>, status: Option<WatchStatus>) -> Result<u64> {
        let mut query = Watchlist::find();

        if let Some(user_id) = user_id {
            query = query.filter(watchlist::Column::UserId.eq(user_id.value()));
        }
        if let Some(status) = status {
            query = query.filter(watchlist::Column::Status.eq(status));
        }

        Ok(query.count(&self.conn).await?)
    }

    /// Per-user status counts for a page of users, in one grouped query.
    pub async fn status_counts_for_users(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, StatusCounts>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<i32> = user_ids.iter().map(UserId::value).collect();
        let rows: Vec<(i32, String, i64)> = Watchlist::find()
            .select_only()
            .column(watchlist::Column::UserId)
            .column(watchlist::Column::Status)
            .column_as(watchlist::Column::Id.count(), "count")
            .filter(watchlist::Column::UserId.is_in(ids))
            .group_by(watchlist::Column::UserId)
            .group_by(watchlist::Column::Status)
            .into_tuple()
            .all(&self.conn)
            .await?;

        let mut map: HashMap<UserId, StatusCounts> = HashMap::new();
        for (user_id, status, count) in rows {
            let counts = map.entry(UserId::new(user_id)).or_default();
            let count = u64::try_from(count).unwrap_or_default();
            match status.parse::<WatchStatus>() {
                Ok(WatchStatus::Watchlist) => counts.watchlist = count,
                Ok(WatchStatus::Watched) => counts.watched = count,
                Err(_) => {}
            }
        }

        Ok(map)
    }

    /// Movies ordered by number of distinct savers, ties broken by
    /// ascending movie id. Metadata comes from the most recently updated row.
    pub async fn popular(&self, limit: u64) -> Result<Vec<PopularMovie>> {
        // (user_id, movie_id) is unique, so COUNT(user_id) counts distinct users.
        let ranked: Vec<(i64, i64)> = Watchlist::find()
            .select_only()
            .column(watchlist::Column::MovieId)
            .column_as(watchlist::Column::UserId.count(), "save_count")
            .group_by(watchlist::Column::MovieId)
            .order_by(watchlist::Column::UserId.count(), Order::Desc)
            .order_by_asc(watchlist::Column::MovieId)
            .limit(limit)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to rank popular movies")?;

        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let movie_ids: Vec<i64> = ranked.iter().map(|(id, _)| *id).collect();
        let rows = Watchlist::find()
            .filter(watchlist::Column::MovieId.is_in(movie_ids))
            .order_by_desc(watchlist::Column::UpdatedAt)
            .all(&self.conn)
            .await?;

        let mut latest: HashMap<i64, watchlist::Model> = HashMap::new();
        for row in rows {
            latest.entry(row.movie_id).or_insert(row);
        }

        let movies = ranked
            .into_iter()
            .filter_map(|(movie_id, save_count)| {
                latest.remove(&movie_id).map(|row| PopularMovie {
                    movie_id,
                    title: row.title,
                    poster_path: row.poster_path,
                    release_date: row.release_date,
                    vote_average: row.vote_average,
                    overview: row.overview,
                    save_count,
                })
            })
            .collect();

        Ok(movies)
    }
}
