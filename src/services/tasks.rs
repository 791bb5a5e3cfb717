use crate::{
    db::DbPool,
    entities::quote::{self, QuoteStatus},
    entities::rating,
    entities::task::{self, TaskStatus},
    entities::user,
    errors::ServiceError,
    events::{Event, EventSender},
    services::geo,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, LoaderTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Radius bounds accepted by the proximity query, in kilometers
const MIN_RADIUS_KM: f64 = 0.1;
const MAX_RADIUS_KM: f64 = 50.0;
const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Request/Response types for the task service
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be within [-90, 90]"))]
    pub latitude: Option<f64>,
    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "longitude must be within [-180, 180]"
    ))]
    pub longitude: Option<f64>,
    pub reward: Option<String>,
}

/// A task with its quotes and ratings, as returned by the poster's listing
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskDetailResponse {
    pub task: task::Model,
    pub quotes: Vec<quote::Model>,
    pub ratings: Vec<rating::Model>,
    /// Derived view; "quoted" is never a persisted status
    pub has_pending_quotes: bool,
}

/// Open-task summary with its distance from the caller
#[derive(Debug, Serialize, ToSchema)]
pub struct NearbyTaskResponse {
    pub id: i32,
    pub title: String,
    pub category: String,
    pub reward: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
}

/// Service owning task entities and their status transitions
#[derive(Clone)]
pub struct TaskService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl TaskService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a new open task
    #[instrument(skip(self, request), fields(poster_id = poster_id))]
    pub async fn create_task(
        &self,
        poster_id: i32,
        request: CreateTaskRequest,
    ) -> Result<task::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let (title, description, category, latitude, longitude) = match (
            request.title,
            request.description,
            request.category,
            request.latitude,
            request.longitude,
        ) {
            (Some(t), Some(d), Some(c), Some(lat), Some(lon))
                if !t.is_empty() && !d.is_empty() && !c.is_empty() =>
            {
                (t, d, c, lat, lon)
            }
            _ => {
                return Err(ServiceError::ValidationError(
                    "title, description, category, latitude, and longitude are required"
                        .to_string(),
                ))
            }
        };

        let db = &*self.db_pool;
        let new_task = task::ActiveModel {
            title: Set(title),
            description: Set(description),
            category: Set(category),
            reward: Set(request.reward),
            status: Set(TaskStatus::Open),
            latitude: Set(latitude),
            longitude: Set(longitude),
            poster_id: Set(poster_id),
            helper_id: Set(None),
            charges: Set(None),
            hours: Set(None),
            image_url: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            ..Default::default()
        };

        let model = new_task.insert(db).await?;
        info!(task_id = model.id, poster_id = poster_id, "Task created");

        self.emit(Event::TaskCreated(model.id)).await;

        Ok(model)
    }

    /// All currently open tasks
    #[instrument(skip(self))]
    pub async fn list_open_tasks(&self) -> Result<Vec<task::Model>, ServiceError> {
        let db = &*self.db_pool;
        let tasks = task::Entity::find()
            .filter(task::Column::Status.eq(TaskStatus::Open))
            .order_by_desc(task::Column::CreatedAt)
            .all(db)
            .await?;

        Ok(tasks)
    }

    /// Tasks posted by a user, with quotes and ratings loaded eagerly
    #[instrument(skip(self))]
    pub async fn list_tasks_by_poster(
        &self,
        poster_id: i32,
    ) -> Result<Vec<TaskDetailResponse>, ServiceError> {
        let db = &*self.db_pool;
        let tasks = task::Entity::find()
            .filter(task::Column::PosterId.eq(poster_id))
            .order_by_desc(task::Column::CreatedAt)
            .all(db)
            .await?;

        let quotes = tasks.load_many(quote::Entity, db).await?;
        let ratings = tasks.load_many(rating::Entity, db).await?;

        let details = tasks
            .into_iter()
            .zip(quotes)
            .zip(ratings)
            .map(|((task, quotes), ratings)| {
                let has_pending_quotes =
                    quotes.iter().any(|q| q.status == QuoteStatus::Pending);
                TaskDetailResponse {
                    task,
                    quotes,
                    ratings,
                    has_pending_quotes,
                }
            })
            .collect();

        Ok(details)
    }

    /// Tasks assigned to a user as helper
    #[instrument(skip(self))]
    pub async fn list_tasks_by_helper(
        &self,
        helper_id: i32,
    ) -> Result<Vec<task::Model>, ServiceError> {
        let db = &*self.db_pool;
        let tasks = task::Entity::find()
            .filter(task::Column::HelperId.eq(helper_id))
            .order_by_desc(task::Column::CreatedAt)
            .all(db)
            .await?;

        Ok(tasks)
    }

    /// Completed tasks where the user was the helper
    #[instrument(skip(self))]
    pub async fn list_completed_by_helper(
        &self,
        helper_id: i32,
    ) -> Result<Vec<task::Model>, ServiceError> {
        let db = &*self.db_pool;
        let tasks = task::Entity::find()
            .filter(task::Column::HelperId.eq(helper_id))
            .filter(task::Column::Status.eq(TaskStatus::Completed))
            .order_by_desc(task::Column::CreatedAt)
            .all(db)
            .await?;

        Ok(tasks)
    }

    /// Every task, for the admin listing
    #[instrument(skip(self))]
    pub async fn list_all_tasks(&self) -> Result<Vec<task::Model>, ServiceError> {
        let db = &*self.db_pool;
        let tasks = task::Entity::find()
            .order_by_desc(task::Column::CreatedAt)
            .all(db)
            .await?;

        Ok(tasks)
    }

    /// Deletes an open task owned by the actor, cascading to its quotes and
    /// ratings in a single transaction.
    #[instrument(skip(self))]
    pub async fn delete_task(&self, actor_id: i32, task_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let found = task::Entity::find()
            .filter(task::Column::Id.eq(task_id))
            .filter(task::Column::PosterId.eq(actor_id))
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound("Task not found or you don't own it".to_string())
            })?;

        if found.status != TaskStatus::Open {
            return Err(ServiceError::InvalidState(
                "Only open tasks can be deleted".to_string(),
            ));
        }

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, task_id = task_id, "Failed to start transaction for task deletion");
            ServiceError::DatabaseError(e)
        })?;

        quote::Entity::delete_many()
            .filter(quote::Column::TaskId.eq(task_id))
            .exec(&txn)
            .await?;
        rating::Entity::delete_many()
            .filter(rating::Column::TaskId.eq(task_id))
            .exec(&txn)
            .await?;
        task::Entity::delete_by_id(task_id).exec(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, task_id = task_id, "Failed to commit task deletion");
            ServiceError::DatabaseError(e)
        })?;

        info!(task_id = task_id, "Task deleted with its quotes and ratings");
        self.emit(Event::TaskDeleted(task_id)).await;

        Ok(())
    }

    /// Marks a task completed. Either participant may do this, from any
    /// status; an unassigned task can be closed out directly by its poster.
    #[instrument(skip(self))]
    pub async fn complete_task(
        &self,
        actor_id: i32,
        task_id: i32,
    ) -> Result<task::Model, ServiceError> {
        let db = &*self.db_pool;

        let found = task::Entity::find_by_id(task_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;

        if actor_id != found.poster_id && Some(actor_id) != found.helper_id {
            return Err(ServiceError::Forbidden(
                "You're not authorized to complete this task".to_string(),
            ));
        }

        let mut active: task::ActiveModel = found.into();
        active.status = Set(TaskStatus::Completed);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(db).await?;

        info!(task_id = task_id, actor_id = actor_id, "Task completed");
        self.emit(Event::TaskCompleted(task_id)).await;

        Ok(updated)
    }

    /// The task with the given id, provided the actor posted it
    #[instrument(skip(self))]
    pub async fn get_owned_task(
        &self,
        actor_id: i32,
        task_id: i32,
    ) -> Result<task::Model, ServiceError> {
        let db = &*self.db_pool;
        task::Entity::find()
            .filter(task::Column::Id.eq(task_id))
            .filter(task::Column::PosterId.eq(actor_id))
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound("Task not found or you don't own it".to_string())
            })
    }

    /// Records the stored image URL on a task owned by the actor
    #[instrument(skip(self))]
    pub async fn attach_image(
        &self,
        actor_id: i32,
        task_id: i32,
        image_url: String,
    ) -> Result<task::Model, ServiceError> {
        let found = self.get_owned_task(actor_id, task_id).await?;

        let mut active: task::ActiveModel = found.into();
        active.image_url = Set(Some(image_url));
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&*self.db_pool).await?;

        Ok(updated)
    }

    /// Open tasks within `radius_km` of the user's stored location, with the
    /// great-circle distance to each. Scans every open task; fine at this
    /// scale, a spatial index becomes worthwhile well before it stops being.
    #[instrument(skip(self))]
    pub async fn nearby_tasks(
        &self,
        user_id: i32,
        radius_km: Option<f64>,
    ) -> Result<Vec<NearbyTaskResponse>, ServiceError> {
        let db = &*self.db_pool;

        let user = user::Entity::find_by_id(user_id).one(db).await?;
        let (user_lat, user_lon) = match user.and_then(|u| u.latitude.zip(u.longitude)) {
            Some(coords) => coords,
            None => {
                return Err(ServiceError::ValidationError(
                    "Your location is not set".to_string(),
                ))
            }
        };

        let radius = radius_km.unwrap_or(DEFAULT_RADIUS_KM);
        if !radius.is_finite() || !(MIN_RADIUS_KM..=MAX_RADIUS_KM).contains(&radius) {
            return Err(ServiceError::ValidationError(
                "Radius must be between 0.1 and 50 km".to_string(),
            ));
        }

        let open_tasks = self.list_open_tasks().await?;

        let nearby = open_tasks
            .into_iter()
            .filter_map(|task| {
                let distance =
                    geo::haversine_distance_km(user_lat, user_lon, task.latitude, task.longitude);
                (distance <= radius).then(|| NearbyTaskResponse {
                    id: task.id,
                    title: task.title,
                    category: task.category,
                    reward: task.reward,
                    latitude: task.latitude,
                    longitude: task.longitude,
                    distance_km: geo::round_to(distance, 2),
                })
            })
            .collect();

        Ok(nearby)
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send task event");
            }
        }
    }
}
