use crate::db::DbPool;
use crate::entities::notification;
use crate::errors::ServiceError;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::instrument;

/// Append a notification row on the given connection. Callers performing a
/// state transition pass their open transaction so the notification commits
/// or rolls back together with the transition that produced it.
pub async fn notify<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    message: impl Into<String>,
) -> Result<notification::Model, ServiceError> {
    let record = notification::ActiveModel {
        user_id: Set(user_id),
        message: Set(message.into()),
        is_read: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    record.insert(conn).await.map_err(ServiceError::DatabaseError)
}

/// Read side of the notification sink
#[derive(Clone)]
pub struct NotificationService {
    db_pool: Arc<DbPool>,
}

impl NotificationService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Notifications for a user, newest first
    #[instrument(skip(self))]
    pub async fn list_notifications(
        &self,
        user_id: i32,
    ) -> Result<Vec<notification::Model>, ServiceError> {
        let db = &*self.db_pool;
        let notifications = notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt)
            .order_by_desc(notification::Column::Id)
            .all(db)
            .await?;

        Ok(notifications)
    }

    /// Flip `is_read`; the notification must belong to the caller
    #[instrument(skip(self))]
    pub async fn mark_read(
        &self,
        user_id: i32,
        notification_id: i32,
    ) -> Result<notification::Model, ServiceError> {
        let db = &*self.db_pool;
        let found = notification::Entity::find()
            .filter(notification::Column::Id.eq(notification_id))
            .filter(notification::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Notification not found".to_string()))?;

        let mut active: notification::ActiveModel = found.into();
        active.is_read = Set(true);
        let updated = active.update(db).await?;

        Ok(updated)
    }
}
