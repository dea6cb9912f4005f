//! `SeaORM` implementation of the `WatchlistService` trait.

use crate::db::{NewWatchlistEntry, Store, WatchlistEntry};
use crate::domain::{ActivityAction, UserId, WatchStatus};
use crate::services::activity::ActivityLogger;
use crate::services::watchlist_service::{
    WatchlistError, WatchlistPage, WatchlistService, WatchlistStats,
};
use async_trait::async_trait;
use tracing::debug;

pub struct SeaOrmWatchlistService {
    store: Store,
    activity: ActivityLogger,
}

impl SeaOrmWatchlistService {
    #[must_use]
    pub const fn new(store: Store, activity: ActivityLogger) -> Self {
        Self { store, activity }
    }
}

#[async_trait]
impl WatchlistService for SeaOrmWatchlistService {
    async fn list(
        &self,
        user_id: UserId,
        status: Option<WatchStatus>,
        page: u64,
        page_size: u64,
    ) -> Result<WatchlistPage, WatchlistError> {
        let (items, total) = self
            .store
            .list_watchlist(user_id, status, page.max(1), page_size.max(1))
            .await?;

        Ok(WatchlistPage { items, total })
    }

    async fn add(
        &self,
        user_id: UserId,
        entry: NewWatchlistEntry,
    ) -> Result<WatchlistEntry, WatchlistError> {
        if entry.title.trim().is_empty() {
            return Err(WatchlistError::Validation("title is required".to_string()));
        }

        if self
            .store
            .get_watchlist_entry(user_id, entry.movie_id)
            .await?
            .is_some()
        {
            return Err(WatchlistError::AlreadyInWatchlist);
        }

        // The unique index catches a concurrent insert that passed the check above.
        let saved = self
            .store
            .add_watchlist_entry(user_id, entry)
            .await?
            .ok_or(WatchlistError::AlreadyInWatchlist)?;

        debug!(user_id = %user_id, movie_id = saved.movie_id, "Movie added to watchlist");
        self.activity
            .record(
                user_id,
                ActivityAction::AddWatchlist,
                Some(format!("Added \"{}\" to watchlist", saved.title)),
            )
            .await;

        Ok(saved)
    }

    async fn remove(&self, user_id: UserId, movie_id: i64) -> Result<(), WatchlistError> {
        let removed = self
            .store
            .remove_watchlist_entry(user_id, movie_id)
            .await?;
        if removed == 0 {
            return Err(WatchlistError::NotFound);
        }

        self.activity
            .record(
                user_id,
                ActivityAction::RemoveWatchlist,
                Some("Removed a movie from watchlist".to_string()),
            )
            .await;

        Ok(())
    }

    async fn update_status(
        &self,
        user_id: UserId,
        movie_id: i64,
        status: WatchStatus,
    ) -> Result<WatchlistEntry, WatchlistError> {
        let updated = self
            .store
            .update_watchlist_status(user_id, movie_id, status)
            .await?
            .ok_or(WatchlistError::NotFound)?;

        if status == WatchStatus::Watched {
            self.activity
                .record(
                    user_id,
                    ActivityAction::Watched,
                    Some(format!("Marked \"{}\" as watched", updated.title)),
                )
                .await;
        }

        Ok(updated)
    }

    async fn stats(&self, user_id: UserId) -> Result<WatchlistStats, WatchlistError> {
        let watchlist = self
            .store
            .count_watchlist(Some(user_id), Some(WatchStatus::Watchlist))
            .await?;
        let watched = self
            .store
            .count_watchlist(Some(user_id), Some(WatchStatus::Watched))
            .await?;

        Ok(WatchlistStats {
            total_movies: watchlist + watched,
            watchlist,
            watched,
        })
    }

    async fn status_for(
        &self,
        user_id: UserId,
        movie_id: i64,
    ) -> Result<Option<WatchStatus>, WatchlistError> {
        let entry = self.store.get_watchlist_entry(user_id, movie_id).await?;
        Ok(entry.map(|e| e.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use crate::db::NewUser;
    use crate::domain::Role;

    async fn setup() -> (SeaOrmWatchlistService, Store, UserId) {
        let db_path = std::env::temp_dir().join(format!(
            "cinelist-watchlist-test-{}.db",
            uuid::Uuid::new_v4()
        ));
        let store = Store::new(&format!("sqlite:{}", db_path.display()))
            .await
            .unwrap();
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };
        let user = store
            .create_user(
                NewUser {
                    username: "alice".to_string(),
                    email: None,
                    password: "pw123".to_string(),
                    role: Role::User,
                    profile_photo: None,
                },
                Some(&security),
            )
            .await
            .unwrap()
            .unwrap();

        let service = SeaOrmWatchlistService::new(store.clone(), ActivityLogger::new(store.clone()));
        (service, store, user.id)
    }

    fn fight_club() -> NewWatchlistEntry {
        NewWatchlistEntry {
            movie_id: 550,
            title: "Fight Club".to_string(),
            poster_path: Some("/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg".to_string()),
            release_date: Some("1999-10-15".to_string()),
            vote_average: Some(8.4),
            overview: None,
        }
    }

    #[tokio::test]
    async fn test_add_twice_keeps_one_row() {
        let (service, store, alice) = setup().await;

        service.add(alice, fight_club()).await.unwrap();
        let err = service.add(alice, fight_club()).await.unwrap_err();

        assert!(matches!(err, WatchlistError::AlreadyInWatchlist));
        assert_eq!(store.count_watchlist(Some(alice), None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove_then_add_resets_status() {
        let (service, _store, alice) = setup().await;

        service.add(alice, fight_club()).await.unwrap();
        service
            .update_status(alice, 550, WatchStatus::Watched)
            .await
            .unwrap();
        service.remove(alice, 550).await.unwrap();

        let fresh = service.add(alice, fight_club()).await.unwrap();
        assert_eq!(fresh.status, WatchStatus::Watchlist);
    }

    #[tokio::test]
    async fn test_remove_missing_is_not_found() {
        let (service, _store, alice) = setup().await;
        assert!(matches!(
            service.remove(alice, 1).await,
            Err(WatchlistError::NotFound)
        ));
        assert!(matches!(
            service.update_status(alice, 1, WatchStatus::Watched).await,
            Err(WatchlistError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_only_watched_transition_is_logged() {
        let (service, store, alice) = setup().await;

        service.add(alice, fight_club()).await.unwrap();
        service
            .update_status(alice, 550, WatchStatus::Watched)
            .await
            .unwrap();
        service
            .update_status(alice, 550, WatchStatus::Watchlist)
            .await
            .unwrap();

        let actions: Vec<ActivityAction> = store
            .recent_activity(10)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.action)
            .collect();
        assert_eq!(actions.len(), 2);
        assert!(actions.contains(&ActivityAction::AddWatchlist));
        assert!(actions.contains(&ActivityAction::Watched));
    }

    #[tokio::test]
    async fn test_stats_and_filtered_list() {
        let (service, _store, alice) = setup().await;

        service.add(alice, fight_club()).await.unwrap();
        service
            .add(
                alice,
                NewWatchlistEntry {
                    movie_id: 603,
                    title: "The Matrix".to_string(),
                    poster_path: None,
                    release_date: None,
                    vote_average: None,
                    overview: None,
                },
            )
            .await
            .unwrap();
        service
            .update_status(alice, 550, WatchStatus::Watched)
            .await
            .unwrap();

        assert_eq!(
            service.stats(alice).await.unwrap(),
            WatchlistStats {
                total_movies: 2,
                watchlist: 1,
                watched: 1
            }
        );

        let watched = service
            .list(alice, Some(WatchStatus::Watched), 1, 20)
            .await
            .unwrap();
        assert_eq!(watched.total, 1);
        assert_eq!(watched.items[0].movie_id, 550);

        let all = service.list(alice, None, 1, 20).await.unwrap();
        assert_eq!(all.total, 2);
        // Newest first.
        assert_eq!(all.items[0].movie_id, 603);

        assert_eq!(
            service.status_for(alice, 550).await.unwrap(),
            Some(WatchStatus::Watched)
        );
        assert_eq!(service.status_for(alice, 1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entries_are_scoped_to_owner() {
        let (service, store, alice) = setup().await;
        service.add(alice, fight_club()).await.unwrap();

        let bob = UserId::new(alice.value() + 100);
        assert!(matches!(
            service.remove(bob, 550).await,
            Err(WatchlistError::NotFound)
        ));
        assert_eq!(store.count_watchlist(Some(alice), None).await.unwrap(), 1);
    }
}
