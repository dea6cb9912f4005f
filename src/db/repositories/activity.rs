use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};
use serde::Serialize;

use crate::domain::{ActivityAction, UserId};
use crate::entities::{activity_logs, prelude::*};

/// The acting user's public fields, embedded in each activity row.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityUser {
    pub id: UserId,
    pub username: String,
    pub profile_photo: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub id: i32,
    pub user_id: UserId,
    pub action: ActivityAction,
    pub details: Option<String>,
    pub created_at: String,
    pub user: Option<ActivityUser>,
}

pub struct ActivityRepository {
    conn: DatabaseConnection,
}

impl ActivityRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(
        &self,
        user_id: UserId,
        action: ActivityAction,
        details: Option<String>,
    ) -> Result<()> {
        let active = activity_logs::ActiveModel {
            user_id: Set(user_id.value()),
            action: Set(action),
            details: Set(details),
            created_at: Set(crate::db::now()),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert activity log")?;
        Ok(())
    }

    /// Newest entries first, joined with the acting user.
    pub async fn recent(&self, limit: u64) -> Result<Vec<ActivityEntry>> {
        let rows = ActivityLogs::find()
            .find_also_related(Users)
            .order_by_desc(activity_logs::Column::CreatedAt)
            .order_by_desc(activity_logs::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to query activity logs")?;

        Ok(rows
            .into_iter()
            .map(|(log, user)| ActivityEntry {
                id: log.id,
                user_id: UserId::new(log.user_id),
                action: log.action,
                details: log.details,
                created_at: log.created_at,
                user: user.map(|u| ActivityUser {
                    id: UserId::new(u.id),
                    username: u.username,
                    profile_photo: u.profile_photo,
                }),
            })
            .collect())
    }
}
