//! `SeaORM` implementation of the `AdminService` trait.

use crate::db::{ActivityEntry, PopularMovie, Store, User};
use crate::domain::{Role, UserId, WatchStatus};
use crate::services::admin_service::{
    AdminError, AdminService, DashboardStats, UserUpdate, UserWithCounts, UsersPage,
};
use async_trait::async_trait;
use tracing::info;

pub struct SeaOrmAdminService {
    store: Store,
}

impl SeaOrmAdminService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AdminService for SeaOrmAdminService {
    async fn dashboard_stats(&self) -> Result<DashboardStats, AdminError> {
        let total_users = self.store.count_users_by_role(Role::User).await?;
        let total_watchlist_items = self.store.count_watchlist(None, None).await?;
        let total_watched = self
            .store
            .count_watchlist(None, Some(WatchStatus::Watched))
            .await?;

        Ok(DashboardStats {
            total_users,
            total_watchlist_items,
            total_watched,
        })
    }

    async fn popular_movies(&self, limit: u64) -> Result<Vec<PopularMovie>, AdminError> {
        Ok(self.store.popular_movies(limit).await?)
    }

    async fn list_users(&self, page: u64, page_size: u64) -> Result<UsersPage, AdminError> {
        let (users, total) = self.store.list_users(page.max(1), page_size.max(1)).await?;

        let ids: Vec<UserId> = users.iter().map(|u| u.id).collect();
        let counts = self.store.watchlist_counts_for_users(&ids).await?;

        let users = users
            .into_iter()
            .map(|user| {
                let c = counts.get(&user.id).copied().unwrap_or_default();
                UserWithCounts {
                    user,
                    watchlist_count: c.watchlist,
                    watched_count: c.watched,
                }
            })
            .collect();

        Ok(UsersPage { users, total })
    }

    async fn update_user(&self, user_id: UserId, update: UserUpdate) -> Result<User, AdminError> {
        let existing = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(AdminError::UserNotFound)?;

        let username = match update.username.map(|u| u.trim().to_string()) {
            Some(u) if u.is_empty() => {
                return Err(AdminError::Validation("username cannot be empty".to_string()));
            }
            Some(u) if u == existing.username => None,
            Some(u) => {
                if self.store.username_exists(&u).await? {
                    return Err(AdminError::DuplicateUsername);
                }
                Some(u)
            }
            None => None,
        };

        let updated = self
            .store
            .update_user_account(user_id, username, update.email)
            .await?
            .ok_or(AdminError::UserNotFound)?;

        info!(user_id = %user_id, "User updated by admin");
        Ok(updated)
    }

    async fn delete_user(&self, user_id: UserId) -> Result<(), AdminError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(AdminError::UserNotFound)?;

        if user.role == Role::Admin {
            return Err(AdminError::ProtectedAdmin);
        }

        if !self.store.delete_user(user_id).await? {
            return Err(AdminError::UserNotFound);
        }

        info!(user_id = %user_id, username = %user.username, "User deleted by admin");
        Ok(())
    }

    async fn activity_logs(&self, limit: u64) -> Result<Vec<ActivityEntry>, AdminError> {
        Ok(self.store.recent_activity(limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use crate::db::{NewUser, NewWatchlistEntry};

    async fn setup() -> (SeaOrmAdminService, Store) {
        let db_path =
            std::env::temp_dir().join(format!("cinelist-admin-test-{}.db", uuid::Uuid::new_v4()));
        let store = Store::new(&format!("sqlite:{}", db_path.display()))
            .await
            .unwrap();
        (SeaOrmAdminService::new(store.clone()), store)
    }

    async fn add_user(store: &Store, username: &str) -> User {
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };
        store
            .create_user(
                NewUser {
                    username: username.to_string(),
                    email: Some(format!("{username}@example.com")),
                    password: "pw123".to_string(),
                    role: Role::User,
                    profile_photo: None,
                },
                Some(&security),
            )
            .await
            .unwrap()
            .unwrap()
    }

    async fn admin_id(store: &Store) -> UserId {
        store
            .get_user_by_username_with_password("admin")
            .await
            .unwrap()
            .unwrap()
            .0
            .id
    }

    #[tokio::test]
    async fn test_admin_cannot_be_deleted() {
        let (service, store) = setup().await;
        let admin = admin_id(&store).await;
        let before = store.list_users(1, 50).await.unwrap().1;

        assert!(matches!(
            service.delete_user(admin).await,
            Err(AdminError::ProtectedAdmin)
        ));
        assert_eq!(store.list_users(1, 50).await.unwrap().1, before);
    }

    #[tokio::test]
    async fn test_delete_user_and_missing_user() {
        let (service, store) = setup().await;
        let bob = add_user(&store, "bob").await;

        service.delete_user(bob.id).await.unwrap();
        assert!(matches!(
            service.delete_user(bob.id).await,
            Err(AdminError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_dashboard_counts_only_regular_users() {
        let (service, store) = setup().await;
        let alice = add_user(&store, "alice").await;
        store
            .add_watchlist_entry(
                alice.id,
                NewWatchlistEntry {
                    movie_id: 550,
                    title: "Fight Club".to_string(),
                    poster_path: None,
                    release_date: None,
                    vote_average: Some(8.4),
                    overview: None,
                },
            )
            .await
            .unwrap();
        store
            .update_watchlist_status(alice.id, 550, WatchStatus::Watched)
            .await
            .unwrap();

        assert_eq!(
            service.dashboard_stats().await.unwrap(),
            DashboardStats {
                total_users: 1,
                total_watchlist_items: 1,
                total_watched: 1
            }
        );
    }

    #[tokio::test]
    async fn test_list_users_includes_counts() {
        let (service, store) = setup().await;
        let alice = add_user(&store, "alice").await;
        store
            .add_watchlist_entry(
                alice.id,
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

        let page = service.list_users(1, 50).await.unwrap();
        // Seeded admin plus alice.
        assert_eq!(page.total, 2);
        let row = page
            .users
            .iter()
            .find(|u| u.user.id == alice.id)
            .unwrap();
        assert_eq!(row.watchlist_count, 1);
        assert_eq!(row.watched_count, 0);

        let json = serde_json::to_value(row).unwrap();
        assert_eq!(json["username"], "alice");
        assert_eq!(json["watchlistCount"], 1);
        assert!(json.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_update_user_rejects_taken_username() {
        let (service, store) = setup().await;
        let alice = add_user(&store, "alice").await;
        add_user(&store, "bob").await;

        assert!(matches!(
            service
                .update_user(
                    alice.id,
                    UserUpdate {
                        username: Some("bob".to_string()),
                        email: None,
                    },
                )
                .await,
            Err(AdminError::DuplicateUsername)
        ));

        let updated = service
            .update_user(
                alice.id,
                UserUpdate {
                    username: Some("alice2".to_string()),
                    email: Some("new@example.com".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.username, "alice2");
        assert_eq!(updated.email.as_deref(), Some("new@example.com"));

        assert!(matches!(
            service
                .update_user(UserId::new(9999), UserUpdate::default())
                .await,
            Err(AdminError::UserNotFound)
        ));
    }
}
