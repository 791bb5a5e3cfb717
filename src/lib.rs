//! Wave API Library
//!
//! This crate provides the core functionality for the Wave local task
//! marketplace API: task posting, quote negotiation, peer ratings, in-app
//! notifications, and nearby-task discovery.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;
pub mod uploads;

use axum::extract::DefaultBodyLimit;
use axum::{
    extract::State,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::AuthRouterExt;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
    pub uploads: Arc<uploads::UploadStore>,
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Full v1 API surface. The public slice (user directory, profiles, completed
/// task listings) is merged with the bearer-authenticated remainder.
pub fn api_v1_routes() -> Router<AppState> {
    let public = Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .route("/users", get(handlers::users::list_users))
        .route("/profile/:id", get(handlers::ratings::get_profile))
        .route(
            "/tasks/completed/:user_id",
            get(handlers::tasks::completed_tasks),
        );

    let protected = Router::new()
        .route("/me", get(handlers::users::get_current_user))
        .route(
            "/tasks",
            post(handlers::tasks::create_task).get(handlers::tasks::list_open_tasks),
        )
        .route("/tasks/mine", get(handlers::tasks::my_tasks))
        .route("/tasks/assigned", get(handlers::tasks::assigned_tasks))
        .route("/tasks/:id", delete(handlers::tasks::delete_task))
        .route("/tasks/:id/complete", post(handlers::tasks::complete_task))
        .route("/tasks/:id/image", post(handlers::tasks::upload_task_image))
        .route("/tasks/:id/quote", post(handlers::quotes::submit_quote))
        .route("/quotes/:id/accept", post(handlers::quotes::accept_quote))
        .route("/rating", post(handlers::ratings::submit_rating))
        .route(
            "/notifications",
            get(handlers::notifications::list_notifications),
        )
        .route(
            "/notifications/:id/read",
            post(handlers::notifications::mark_notification_read),
        )
        .route("/profile/location", put(handlers::users::update_location))
        .route(
            "/profile/image",
            post(handlers::users::upload_profile_image),
        )
        .route("/map/tasks", get(handlers::tasks::nearby_tasks))
        .route("/admin/users", get(handlers::users::admin_users))
        .route("/admin/tasks", get(handlers::tasks::admin_tasks))
        .layer(DefaultBodyLimit::max(uploads::MAX_UPLOAD_BYTES))
        .with_auth();

    public.merge(protected)
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "service": "wave-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}
