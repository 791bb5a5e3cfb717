use super::common::{created_response, success_response};
use crate::{
    auth::AuthenticatedUser,
    errors::ServiceError,
    handlers::AppState,
    services::ratings::SubmitRatingRequest,
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

/// Rate the other participant of a completed task
#[utoipa::path(
    post,
    path = "/api/v1/rating",
    request_body = SubmitRatingRequest,
    responses(
        (status = 201, description = "Rating recorded", body = crate::entities::rating::Model),
        (status = 400, description = "Invalid rating payload or task not completed", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller was not part of the task", body = crate::errors::ErrorResponse),
        (status = 404, description = "Task not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Already rated", body = crate::errors::ErrorResponse)
    ),
    tag = "ratings"
)]
pub async fn submit_rating(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<SubmitRatingRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let rating = state.services.ratings.submit_rating(user.id, payload).await?;
    Ok(created_response(rating))
}

/// Public profile with completion counts and received ratings
#[utoipa::path(
    get,
    path = "/api/v1/profile/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Profile stats", body = crate::services::ratings::ProfileStatsResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    tag = "profiles"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let stats = state.services.ratings.profile_stats(user_id).await?;
    Ok(success_response(stats))
}
