use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Registration payload. Presence is validated in the service so a missing
/// field reports the full requirement message instead of a bare deserialization
/// error.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// "user" (helper) or "seeker" (task poster)
    pub role: Option<String>,
    pub work_platform: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Issued bearer token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: TokenResponse,
    pub user: crate::entities::user::Model,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: crate::entities::user::Model,
}
