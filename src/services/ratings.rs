use crate::{
    db::DbPool,
    entities::rating,
    entities::task::{self, TaskStatus},
    entities::user,
    errors::ServiceError,
    events::{Event, EventSender},
    services::geo,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitRatingRequest {
    pub task_id: Option<i32>,
    pub ratee_id: Option<i32>,
    pub score: Option<i32>,
    pub comment: Option<String>,
}

/// Aggregated profile view: completion counts plus received ratings
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileStatsResponse {
    pub user: user::Model,
    pub completed_tasks_as_helper: u64,
    pub completed_tasks_as_seeker: u64,
    pub total_ratings: u64,
    /// Mean of received scores rounded to one decimal; 0.0 when unrated
    pub average_rating: f64,
    pub ratings: Vec<rating::Model>,
}

/// Records post-completion peer ratings with duplicate/eligibility checks
#[derive(Clone)]
pub struct RatingService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl RatingService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Submits a rating. Guards run in a fixed order and the first violation
    /// wins; nothing is persisted on any failure.
    #[instrument(skip(self, request), fields(actor_id = actor_id))]
    pub async fn submit_rating(
        &self,
        actor_id: i32,
        request: SubmitRatingRequest,
    ) -> Result<rating::Model, ServiceError> {
        let (task_id, ratee_id, score) =
            match (request.task_id, request.ratee_id, request.score) {
                (Some(t), Some(r), Some(s)) => (t, r, s),
                _ => {
                    return Err(ServiceError::ValidationError(
                        "task_id, ratee_id, and score are required".to_string(),
                    ))
                }
            };

        if !(1..=5).contains(&score) {
            return Err(ServiceError::ValidationError(
                "Score must be between 1 and 5".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let target_task = task::Entity::find_by_id(task_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;

        if target_task.status != TaskStatus::Completed {
            return Err(ServiceError::InvalidState(
                "Task is not completed".to_string(),
            ));
        }

        let participants = [Some(target_task.poster_id), target_task.helper_id];
        if !participants.contains(&Some(actor_id)) {
            return Err(ServiceError::Forbidden(
                "You were not part of this task".to_string(),
            ));
        }

        if !participants.contains(&Some(ratee_id)) || ratee_id == actor_id {
            return Err(ServiceError::ValidationError(
                "You can only rate the other participant".to_string(),
            ));
        }

        let existing = rating::Entity::find()
            .filter(rating::Column::TaskId.eq(task_id))
            .filter(rating::Column::RaterId.eq(actor_id))
            .filter(rating::Column::RateeId.eq(ratee_id))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "You already rated this user for this task".to_string(),
            ));
        }

        let new_rating = rating::ActiveModel {
            task_id: Set(task_id),
            rater_id: Set(actor_id),
            ratee_id: Set(ratee_id),
            score: Set(score),
            comment: Set(request.comment),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let model = new_rating.insert(db).await?;

        info!(
            rating_id = model.id,
            task_id = task_id,
            ratee_id = ratee_id,
            "Rating submitted"
        );
        self.emit(Event::RatingSubmitted {
            rating_id: model.id,
            task_id,
            ratee_id,
        })
        .await;

        Ok(model)
    }

    /// Public profile stats for a user
    #[instrument(skip(self))]
    pub async fn profile_stats(&self, user_id: i32) -> Result<ProfileStatsResponse, ServiceError> {
        let db = &*self.db_pool;

        let profile_user = user::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        let completed_tasks_as_helper = task::Entity::find()
            .filter(task::Column::HelperId.eq(user_id))
            .filter(task::Column::Status.eq(TaskStatus::Completed))
            .count(db)
            .await?;

        let completed_tasks_as_seeker = task::Entity::find()
            .filter(task::Column::PosterId.eq(user_id))
            .filter(task::Column::Status.eq(TaskStatus::Completed))
            .count(db)
            .await?;

        let ratings = rating::Entity::find()
            .filter(rating::Column::RateeId.eq(user_id))
            .all(db)
            .await?;

        let average_rating = if ratings.is_empty() {
            0.0
        } else {
            let sum: i32 = ratings.iter().map(|r| r.score).sum();
            geo::round_to(f64::from(sum) / ratings.len() as f64, 1)
        };

        Ok(ProfileStatsResponse {
            user: profile_user,
            completed_tasks_as_helper,
            completed_tasks_as_seeker,
            total_ratings: ratings.len() as u64,
            average_rating,
            ratings,
        })
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send rating event");
            }
        }
    }
}
