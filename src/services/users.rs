use crate::db::DbPool;
use crate::entities::user;
use crate::errors::ServiceError;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLocationRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// User profile operations. Registration and credential checks live in the
/// auth module; everything here acts on an already-authenticated identity.
#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: i32) -> Result<user::Model, ServiceError> {
        let db = &*self.db_pool;
        user::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<user::Model>, ServiceError> {
        let db = &*self.db_pool;
        let users = user::Entity::find().all(db).await?;
        Ok(users)
    }

    /// Set the caller's stored location, used by the proximity query
    #[instrument(skip(self, request))]
    pub async fn update_location(
        &self,
        user_id: i32,
        request: UpdateLocationRequest,
    ) -> Result<user::Model, ServiceError> {
        let (latitude, longitude) = match (request.latitude, request.longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                return Err(ServiceError::ValidationError(
                    "latitude and longitude are required".to_string(),
                ))
            }
        };

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ServiceError::ValidationError(
                "latitude must be within [-90, 90] and longitude within [-180, 180]".to_string(),
            ));
        }

        let found = self.get_user(user_id).await?;
        let mut active: user::ActiveModel = found.into();
        active.latitude = Set(Some(latitude));
        active.longitude = Set(Some(longitude));
        let updated = active.update(&*self.db_pool).await?;

        Ok(updated)
    }

    /// Record a stored profile image URL
    #[instrument(skip(self))]
    pub async fn set_profile_image(
        &self,
        user_id: i32,
        image_url: String,
    ) -> Result<user::Model, ServiceError> {
        let found = self.get_user(user_id).await?;
        let mut active: user::ActiveModel = found.into();
        active.image_url = Set(Some(image_url));
        let updated = active.update(&*self.db_pool).await?;

        Ok(updated)
    }
}
