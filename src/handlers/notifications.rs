use super::common::success_response;
use crate::{auth::AuthenticatedUser, errors::ServiceError, handlers::AppState};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

/// Caller's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    responses(
        (status = 200, description = "Notifications", body = [crate::entities::notification::Model]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "notifications"
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let notifications = state
        .services
        .notifications
        .list_notifications(user.id)
        .await?;
    Ok(success_response(notifications))
}

/// Mark one of the caller's notifications as read
#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked read"),
        (status = 404, description = "Notification not found", body = crate::errors::ErrorResponse)
    ),
    tag = "notifications"
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(notification_id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .notifications
        .mark_read(user.id, notification_id)
        .await?;
    Ok(success_response(
        json!({ "message": "Notification marked as read" }),
    ))
}
