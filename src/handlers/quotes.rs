use super::common::created_response;
use crate::{
    auth::AuthenticatedUser,
    errors::ServiceError,
    handlers::AppState,
    services::quotes::{AcceptQuoteResponse, SubmitQuoteRequest},
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

/// Submit (or replace) a quote on an open task
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{id}/quote",
    params(("id" = i32, Path, description = "Task ID")),
    request_body = SubmitQuoteRequest,
    responses(
        (status = 201, description = "Quote submitted", body = crate::entities::quote::Model),
        (status = 400, description = "Missing charges, hours, or mobile", body = crate::errors::ErrorResponse),
        (status = 404, description = "Task not found or no longer open", body = crate::errors::ErrorResponse)
    ),
    tag = "quotes"
)]
pub async fn submit_quote(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(task_id): Path<i32>,
    Json(payload): Json<SubmitQuoteRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let quote = state
        .services
        .quotes
        .submit_quote(user.id, task_id, payload)
        .await?;
    Ok(created_response(quote))
}

/// Accept a quote, declining all competitors and assigning the task
#[utoipa::path(
    post,
    path = "/api/v1/quotes/{id}/accept",
    params(("id" = i32, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Quote accepted", body = AcceptQuoteResponse),
        (status = 403, description = "Caller is not the task poster", body = crate::errors::ErrorResponse),
        (status = 404, description = "Quote not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Task is no longer open", body = crate::errors::ErrorResponse)
    ),
    tag = "quotes"
)]
pub async fn accept_quote(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(quote_id): Path<i32>,
) -> Result<Json<AcceptQuoteResponse>, ServiceError> {
    let (task, accepted_quote) = state.services.quotes.accept_quote(user.id, quote_id).await?;

    Ok(Json(AcceptQuoteResponse {
        message: "Quote accepted".to_string(),
        task,
        accepted_quote,
    }))
}
