use super::common::success_response;
use super::tasks::read_image_field;
use crate::{
    auth::AuthenticatedUser,
    errors::ServiceError,
    handlers::AppState,
    services::users::UpdateLocationRequest,
};
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

/// Current user from the bearer token
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current user", body = crate::entities::user::Model),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let model = state.services.users.get_user(user.id).await?;
    Ok(success_response(model))
}

/// All registered users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = [crate::entities::user::Model])
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let users = state.services.users.list_users().await?;
    Ok(success_response(users))
}

/// Set the caller's stored location
#[utoipa::path(
    put,
    path = "/api/v1/profile/location",
    request_body = UpdateLocationRequest,
    responses(
        (status = 200, description = "Location updated", body = crate::entities::user::Model),
        (status = 400, description = "Missing coordinates", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn update_location(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let model = state.services.users.update_location(user.id, payload).await?;
    Ok(success_response(json!({
        "message": "Location updated",
        "user": model,
    })))
}

/// Upload the caller's profile image
#[utoipa::path(
    post,
    path = "/api/v1/profile/image",
    responses(
        (status = 200, description = "Image stored"),
        (status = 400, description = "Missing or invalid image", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn upload_profile_image(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    let (filename, data) = read_image_field(multipart).await?;
    let url = state
        .uploads
        .store(&format!("profile_{}", user.id), &filename, &data)
        .await?;
    let model = state.services.users.set_profile_image(user.id, url).await?;

    Ok(success_response(json!({
        "image_url": model.image_url,
    })))
}

/// All users, admin only
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    responses(
        (status = 200, description = "All users", body = [crate::entities::user::Model]),
        (status = 403, description = "Admin only", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn admin_users(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    if !user.is_admin {
        return Err(ServiceError::Forbidden("Admin only".to_string()));
    }
    let users = state.services.users.list_users().await?;
    Ok(success_response(users))
}
