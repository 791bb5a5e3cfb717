use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wave API",
        version = "0.3.0",
        description = r#"
# Wave Local Task Marketplace API

Backend for posting local tasks, negotiating quotes from nearby helpers,
marking work complete, and exchanging post-completion ratings.

## Authentication

Register and log in under `/auth`, then pass the issued token in the
Authorization header:

```
Authorization: Bearer <your-jwt-token>
```

## Task lifecycle

A task is `open` while helpers submit quotes, becomes `accepted` when the
poster accepts exactly one quote (all others are declined and notified), and
ends `completed` when either participant closes it out. Both participants may
then rate each other once.

## Nearby tasks

`GET /api/v1/map/tasks?radius=<km>` returns open tasks within a great-circle
radius (0.1 - 50 km) of the caller's stored location.
        "#,
        contact(
            name = "Wave Community",
            email = "dev@wavecommunity.io"
        ),
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "tasks", description = "Task posting and lifecycle"),
        (name = "quotes", description = "Quote negotiation"),
        (name = "ratings", description = "Post-completion ratings"),
        (name = "profiles", description = "Public profile stats"),
        (name = "notifications", description = "In-app notifications"),
        (name = "users", description = "Account and profile management"),
        (name = "admin", description = "Administrative listings")
    ),
    paths(
        // Auth
        crate::auth::register_handler,
        crate::auth::login_handler,

        // Tasks
        crate::handlers::tasks::create_task,
        crate::handlers::tasks::list_open_tasks,
        crate::handlers::tasks::my_tasks,
        crate::handlers::tasks::assigned_tasks,
        crate::handlers::tasks::completed_tasks,
        crate::handlers::tasks::delete_task,
        crate::handlers::tasks::complete_task,
        crate::handlers::tasks::upload_task_image,
        crate::handlers::tasks::nearby_tasks,
        crate::handlers::tasks::admin_tasks,

        // Quotes
        crate::handlers::quotes::submit_quote,
        crate::handlers::quotes::accept_quote,

        // Ratings & profiles
        crate::handlers::ratings::submit_rating,
        crate::handlers::ratings::get_profile,

        // Notifications
        crate::handlers::notifications::list_notifications,
        crate::handlers::notifications::mark_notification_read,

        // Users
        crate::handlers::users::get_current_user,
        crate::handlers::users::list_users,
        crate::handlers::users::update_location,
        crate::handlers::users::upload_profile_image,
        crate::handlers::users::admin_users,
    ),
    components(
        schemas(
            // Entities
            crate::entities::task::Model,
            crate::entities::task::TaskStatus,
            crate::entities::quote::Model,
            crate::entities::quote::QuoteStatus,
            crate::entities::rating::Model,
            crate::entities::notification::Model,
            crate::entities::user::Model,

            // Requests/responses
            crate::auth::RegisterRequest,
            crate::auth::LoginRequest,
            crate::auth::TokenResponse,
            crate::auth::LoginResponse,
            crate::auth::RegisterResponse,
            crate::services::tasks::CreateTaskRequest,
            crate::services::tasks::TaskDetailResponse,
            crate::services::tasks::NearbyTaskResponse,
            crate::services::quotes::SubmitQuoteRequest,
            crate::services::quotes::AcceptQuoteResponse,
            crate::services::ratings::SubmitRatingRequest,
            crate::services::ratings::ProfileStatsResponse,
            crate::services::users::UpdateLocationRequest,

            // Error type
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_covers_the_core_surface() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Wave API"));
        assert!(json.contains("/api/v1/tasks"));
        assert!(json.contains("/api/v1/quotes/{id}/accept"));
        assert!(json.contains("/api/v1/map/tasks"));
    }
}
