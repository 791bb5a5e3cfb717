use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = User)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub username: String,
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Either "user" (helper) or "seeker" (task poster); informational only,
    /// authorization is derived from task ownership, not the role string.
    pub role: String,

    pub skills: Option<String>,
    pub image_url: Option<String>,
    pub mobile: Option<String>,

    /// Stored location, null until the user sets it via the profile endpoint
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub work_platform: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
