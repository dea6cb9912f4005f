use crate::db::Store;
use crate::domain::{ActivityAction, UserId};
use tracing::warn;

/// Best-effort writer for the activity log.
///
/// A failed write is logged and counted, never returned: the operation that
/// triggered it has already succeeded and must not be failed or rolled back.
#[derive(Clone)]
pub struct ActivityLogger {
    store: Store,
}

impl ActivityLogger {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn record(&self, user_id: UserId, action: ActivityAction, details: Option<String>) {
        if let Err(e) = self.store.add_activity(user_id, action, details).await {
            metrics::counter!("activity_log_failures_total", "action" => action.as_str())
                .increment(1);
            warn!(
                error = %e,
                user_id = %user_id,
                action = action.as_str(),
                "Failed to write activity log entry"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewUser;
    use crate::domain::Role;

    #[tokio::test]
    async fn test_record_swallows_failures() {
        let db_path = std::env::temp_dir().join(format!(
            "cinelist-activity-test-{}.db",
            uuid::Uuid::new_v4()
        ));
        let store = Store::new(&format!("sqlite:{}", db_path.display()))
            .await
            .unwrap();
        let logger = ActivityLogger::new(store.clone());

        // Unknown user: the foreign key rejects the row, the call still returns.
        logger
            .record(UserId::new(9999), ActivityAction::Login, None)
            .await;

        let security = crate::config::SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..Default::default()
        };
        let user = store
            .create_user(
                NewUser {
                    username: "carol".to_string(),
                    email: None,
                    password: "pw".to_string(),
                    role: Role::User,
                    profile_photo: None,
                },
                Some(&security),
            )
            .await
            .unwrap()
            .unwrap();

        logger
            .record(
                user.id,
                ActivityAction::AddWatchlist,
                Some("Added \"Up\" to watchlist".to_string()),
            )
            .await;

        let entries = store.recent_activity(10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, ActivityAction::AddWatchlist);
    }
}
