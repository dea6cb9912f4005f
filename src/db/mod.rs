use crate::config::SecurityConfig;
use crate::domain::{ActivityAction, Role, UserId, WatchStatus};
use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use crate::entities::watchlist::Model as WatchlistEntry;
pub use repositories::activity::{ActivityEntry, ActivityUser};
pub use repositories::user::{NewUser, User};
pub use repositories::watchlist::{NewWatchlistEntry, PopularMovie, StatusCounts};

/// Timestamp format used for every `*_at` column. Fixed-width micros in UTC
/// so lexicographic order matches chronological order.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[must_use]
pub fn now() -> String {
    format_timestamp(Utc::now())
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn watchlist_repo(&self) -> repositories::watchlist::WatchlistRepository {
        repositories::watchlist::WatchlistRepository::new(self.conn.clone())
    }

    fn activity_repo(&self) -> repositories::activity::ActivityRepository {
        repositories::activity::ActivityRepository::new(self.conn.clone())
    }

    fn token_repo(&self) -> repositories::token::TokenRepository {
        repositories::token::TokenRepository::new(self.conn.clone())
    }

    // Users

    pub async fn create_user(
        &self,
        new_user: NewUser,
        security: Option<&SecurityConfig>,
    ) -> Result<Option<User>> {
        self.user_repo().create(new_user, security).await
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        self.user_repo().username_exists(username).await
    }

    pub async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username_with_password(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>> {
        self.user_repo()
            .get_by_username_with_password(username)
            .await
    }

    pub async fn update_user_photo(
        &self,
        id: UserId,
        profile_photo: Option<String>,
    ) -> Result<Option<User>> {
        self.user_repo()
            .update_profile_photo(id, profile_photo)
            .await
    }

    pub async fn update_user_account(
        &self,
        id: UserId,
        username: Option<String>,
        email: Option<String>,
    ) -> Result<Option<User>> {
        self.user_repo().update_account(id, username, email).await
    }

    pub async fn delete_user(&self, id: UserId) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    pub async fn count_users_by_role(&self, role: Role) -> Result<u64> {
        self.user_repo().count_by_role(role).await
    }

    pub async fn list_users(&self, page: u64, page_size: u64) -> Result<(Vec<User>, u64)> {
        self.user_repo().list(page, page_size).await
    }

    // Watchlist

    pub async fn list_watchlist(
        &self,
        user_id: UserId,
        status: Option<WatchStatus>,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<WatchlistEntry>, u64)> {
        self.watchlist_repo()
            .list(user_id, status, page, page_size)
            .await
    }

    pub async fn get_watchlist_entry(
        &self,
        user_id: UserId,
        movie_id: i64,
    ) -> Result<Option<WatchlistEntry>> {
        self.watchlist_repo().find(user_id, movie_id).await
    }

    pub async fn add_watchlist_entry(
        &self,
        user_id: UserId,
        entry: NewWatchlistEntry,
    ) -> Result<Option<WatchlistEntry>> {
        self.watchlist_repo().insert(user_id, entry).await
    }

    pub async fn remove_watchlist_entry(&self, user_id: UserId, movie_id: i64) -> Result<u64> {
        self.watchlist_repo().delete(user_id, movie_id).await
    }

    pub async fn update_watchlist_status(
        &self,
        user_id: UserId,
        movie_id: i64,
        status: WatchStatus,
    ) -> Result<Option<WatchlistEntry>> {
        self.watchlist_repo()
            .update_status(user_id, movie_id, status)
            .await
    }

    pub async fn count_watchlist(
        &self,
        user_id: Option<UserId>,
        status: Option<WatchStatus>,
    ) -> Result<u64> {
        self.watchlist_repo().count(user_id, status).await
    }

    pub async fn watchlist_counts_for_users(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, StatusCounts>> {
        self.watchlist_repo()
            .status_counts_for_users(user_ids)
            .await
    }

    pub async fn popular_movies(&self, limit: u64) -> Result<Vec<PopularMovie>> {
        self.watchlist_repo().popular(limit).await
    }

    // Activity log

    pub async fn add_activity(
        &self,
        user_id: UserId,
        action: ActivityAction,
        details: Option<String>,
    ) -> Result<()> {
        self.activity_repo().add(user_id, action, details).await
    }

    pub async fn recent_activity(&self, limit: u64) -> Result<Vec<ActivityEntry>> {
        self.activity_repo().recent(limit).await
    }

    // Token blacklist

    pub async fn blacklist_token(
        &self,
        token: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        self.token_repo()
            .blacklist(token, user_id, &format_timestamp(expires_at))
            .await
    }

    pub async fn is_token_blacklisted(&self, token: &str) -> Result<bool> {
        self.token_repo().is_blacklisted(token).await
    }

    pub async fn prune_expired_tokens(&self) -> Result<u64> {
        self.token_repo().prune_expired(&now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::user::NewUser;

    async fn test_store() -> Store {
        let db_path =
            std::env::temp_dir().join(format!("cinelist-store-test-{}.db", uuid::Uuid::new_v4()));
        Store::new(&format!("sqlite:{}", db_path.display()))
            .await
            .unwrap()
    }

    fn fast_security() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        }
    }

    async fn create_user(store: &Store, username: &str) -> User {
        store
            .create_user(
                NewUser {
                    username: username.to_string(),
                    email: None,
                    password: "pw123".to_string(),
                    role: Role::User,
                    profile_photo: None,
                },
                Some(&fast_security()),
            )
            .await
            .unwrap()
            .unwrap()
    }

    fn movie(movie_id: i64, title: &str) -> NewWatchlistEntry {
        NewWatchlistEntry {
            movie_id,
            title: title.to_string(),
            poster_path: None,
            release_date: None,
            vote_average: Some(8.0),
            overview: None,
        }
    }

    #[test]
    fn test_timestamps_sort_chronologically() {
        let earlier = DateTime::parse_from_rfc3339("2026-01-10T09:59:59.5Z")
            .unwrap()
            .with_timezone(&Utc);
        let later = DateTime::parse_from_rfc3339("2026-01-10T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let a = format_timestamp(earlier);
        let b = format_timestamp(later);
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }

    #[tokio::test]
    async fn test_seeded_admin_exists() {
        let store = test_store().await;
        let (admin, _) = store
            .get_user_by_username_with_password("admin")
            .await
            .unwrap()
            .expect("seeded admin");
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(store.count_users_by_role(Role::User).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let store = test_store().await;
        create_user(&store, "alice").await;

        let again = store
            .create_user(
                NewUser {
                    username: "alice".to_string(),
                    email: None,
                    password: "other".to_string(),
                    role: Role::User,
                    profile_photo: None,
                },
                Some(&fast_security()),
            )
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_unique_index_rejects_second_save() {
        let store = test_store().await;
        let alice = create_user(&store, "alice").await;

        let first = store
            .add_watchlist_entry(alice.id, movie(550, "Fight Club"))
            .await
            .unwrap();
        assert!(first.is_some());

        let second = store
            .add_watchlist_entry(alice.id, movie(550, "Fight Club"))
            .await
            .unwrap();
        assert!(second.is_none());
        assert_eq!(store.count_watchlist(Some(alice.id), None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_popular_movies_ranking_and_ties() {
        let store = test_store().await;
        let alice = create_user(&store, "alice").await;
        let bob = create_user(&store, "bob").await;

        store
            .add_watchlist_entry(alice.id, movie(27205, "Inception"))
            .await
            .unwrap();
        store
            .add_watchlist_entry(bob.id, movie(27205, "Inception"))
            .await
            .unwrap();
        store
            .add_watchlist_entry(alice.id, movie(603, "The Matrix"))
            .await
            .unwrap();
        store
            .add_watchlist_entry(bob.id, movie(550, "Fight Club"))
            .await
            .unwrap();

        let popular = store.popular_movies(10).await.unwrap();
        let ranking: Vec<(i64, i64)> = popular.iter().map(|m| (m.movie_id, m.save_count)).collect();
        assert_eq!(ranking, vec![(27205, 2), (550, 1), (603, 1)]);
        assert_eq!(popular[0].title, "Inception");

        let top = store.popular_movies(1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].movie_id, 27205);
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let store = test_store().await;
        let alice = create_user(&store, "alice").await;
        store
            .add_watchlist_entry(alice.id, movie(550, "Fight Club"))
            .await
            .unwrap();
        store
            .add_activity(alice.id, ActivityAction::Login, None)
            .await
            .unwrap();
        store
            .blacklist_token("some.token", alice.id, Utc::now())
            .await
            .unwrap();

        assert!(store.delete_user(alice.id).await.unwrap());
        assert_eq!(store.count_watchlist(None, None).await.unwrap(), 0);
        assert!(store.recent_activity(10).await.unwrap().is_empty());
        assert!(!store.is_token_blacklisted("some.token").await.unwrap());
    }

    #[tokio::test]
    async fn test_prune_keeps_unexpired_tokens() {
        let store = test_store().await;
        let alice = create_user(&store, "alice").await;

        store
            .blacklist_token("old", alice.id, Utc::now() - chrono::Duration::hours(1))
            .await
            .unwrap();
        store
            .blacklist_token("fresh", alice.id, Utc::now() + chrono::Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(store.prune_expired_tokens().await.unwrap(), 1);
        assert!(!store.is_token_blacklisted("old").await.unwrap());
        assert!(store.is_token_blacklisted("fresh").await.unwrap());
    }

    #[tokio::test]
    async fn test_status_counts_for_users() {
        let store = test_store().await;
        let alice = create_user(&store, "alice").await;
        let bob = create_user(&store, "bob").await;

        store
            .add_watchlist_entry(alice.id, movie(1, "One"))
            .await
            .unwrap();
        store
            .add_watchlist_entry(alice.id, movie(2, "Two"))
            .await
            .unwrap();
        store
            .update_watchlist_status(alice.id, 2, WatchStatus::Watched)
            .await
            .unwrap();

        let counts = store
            .watchlist_counts_for_users(&[alice.id, bob.id])
            .await
            .unwrap();
        assert_eq!(
            counts.get(&alice.id).copied(),
            Some(StatusCounts {
                watchlist: 1,
                watched: 1
            })
        );
        assert!(!counts.contains_key(&bob.id));
    }
}
