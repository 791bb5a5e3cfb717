use super::common::{created_response, success_response};
use crate::{
    auth::AuthenticatedUser,
    errors::ServiceError,
    handlers::AppState,
    services::tasks::CreateTaskRequest,
};
use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct NearbyParams {
    /// Search radius in kilometers, 0.1 to 50 (default 5)
    pub radius: Option<f64>,
}

/// Create a new task
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = crate::entities::task::Model),
        (status = 400, description = "Missing or invalid fields", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn create_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let task = state.services.tasks.create_task(user.id, payload).await?;
    Ok(created_response(task))
}

/// List all open tasks
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    responses(
        (status = 200, description = "Open tasks", body = [crate::entities::task::Model]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn list_open_tasks(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let tasks = state.services.tasks.list_open_tasks().await?;
    Ok(success_response(tasks))
}

/// Tasks posted by the caller, with their quotes and ratings
#[utoipa::path(
    get,
    path = "/api/v1/tasks/mine",
    responses(
        (status = 200, description = "Caller's tasks", body = [crate::services::tasks::TaskDetailResponse]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn my_tasks(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let tasks = state.services.tasks.list_tasks_by_poster(user.id).await?;
    Ok(success_response(tasks))
}

/// Tasks assigned to the caller as helper
#[utoipa::path(
    get,
    path = "/api/v1/tasks/assigned",
    responses(
        (status = 200, description = "Assigned tasks", body = [crate::entities::task::Model]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn assigned_tasks(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let tasks = state.services.tasks.list_tasks_by_helper(user.id).await?;
    Ok(success_response(tasks))
}

/// Completed tasks where the given user was the helper
#[utoipa::path(
    get,
    path = "/api/v1/tasks/completed/{user_id}",
    params(("user_id" = i32, Path, description = "Helper user ID")),
    responses(
        (status = 200, description = "Completed tasks", body = [crate::entities::task::Model])
    ),
    tag = "tasks"
)]
pub async fn completed_tasks(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let tasks = state
        .services
        .tasks
        .list_completed_by_helper(user_id)
        .await?;
    Ok(success_response(tasks))
}

/// Delete an open task owned by the caller (cascades quotes and ratings)
#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task deleted"),
        (status = 400, description = "Task is not open", body = crate::errors::ErrorResponse),
        (status = 404, description = "Task not found or not owned", body = crate::errors::ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn delete_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(task_id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.tasks.delete_task(user.id, task_id).await?;
    Ok(success_response(
        json!({ "message": "Task deleted successfully" }),
    ))
}

/// Mark a task completed (poster or helper)
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{id}/complete",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task completed", body = crate::entities::task::Model),
        (status = 403, description = "Caller is not a participant", body = crate::errors::ErrorResponse),
        (status = 404, description = "Task not found", body = crate::errors::ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn complete_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(task_id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let task = state.services.tasks.complete_task(user.id, task_id).await?;
    Ok(success_response(task))
}

/// Attach an image to a task owned by the caller
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{id}/image",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Image stored"),
        (status = 400, description = "Missing or invalid image", body = crate::errors::ErrorResponse),
        (status = 404, description = "Task not found or not owned", body = crate::errors::ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn upload_task_image(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(task_id): Path<i32>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    // Ownership is checked before any bytes hit disk
    state.services.tasks.get_owned_task(user.id, task_id).await?;

    let (filename, data) = read_image_field(multipart).await?;
    let url = state
        .uploads
        .store(&format!("task_{}", task_id), &filename, &data)
        .await?;
    let task = state
        .services
        .tasks
        .attach_image(user.id, task_id, url)
        .await?;

    Ok(success_response(json!({
        "message": "Image uploaded",
        "image_url": task.image_url,
    })))
}

/// Open tasks within a radius of the caller's stored location
#[utoipa::path(
    get,
    path = "/api/v1/map/tasks",
    params(NearbyParams),
    responses(
        (status = 200, description = "Nearby open tasks", body = [crate::services::tasks::NearbyTaskResponse]),
        (status = 400, description = "Location unset or radius out of range", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn nearby_tasks(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<NearbyParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let tasks = state
        .services
        .tasks
        .nearby_tasks(user.id, params.radius)
        .await?;
    Ok(success_response(tasks))
}

/// All tasks, admin only
#[utoipa::path(
    get,
    path = "/api/v1/admin/tasks",
    responses(
        (status = 200, description = "All tasks", body = [crate::entities::task::Model]),
        (status = 403, description = "Admin only", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn admin_tasks(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    if !user.is_admin {
        return Err(ServiceError::Forbidden("Admin only".to_string()));
    }
    let tasks = state.services.tasks.list_all_tasks().await?;
    Ok(success_response(tasks))
}

/// Pulls the `image` field out of a multipart form
pub(crate) async fn read_image_field(
    mut multipart: Multipart,
) -> Result<(String, Vec<u8>), ServiceError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::ValidationError(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some("image") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await.map_err(|e| {
                ServiceError::ValidationError(format!("Failed to read upload: {}", e))
            })?;
            upload = Some((filename, data.to_vec()));
        }
    }

    let (filename, data) =
        upload.ok_or_else(|| ServiceError::ValidationError("No image provided".to_string()))?;

    if filename.is_empty() {
        return Err(ServiceError::ValidationError(
            "No image selected".to_string(),
        ));
    }

    Ok((filename, data))
}
