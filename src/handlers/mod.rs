pub mod common;
pub mod notifications;
pub mod quotes;
pub mod ratings;
pub mod tasks;
pub mod users;

use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub tasks: Arc<crate::services::tasks::TaskService>,
    pub quotes: Arc<crate::services::quotes::QuoteService>,
    pub ratings: Arc<crate::services::ratings::RatingService>,
    pub notifications: Arc<crate::services::notifications::NotificationService>,
    pub users: Arc<crate::services::users::UserService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        let tasks = Arc::new(crate::services::tasks::TaskService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let quotes = Arc::new(crate::services::quotes::QuoteService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let ratings = Arc::new(crate::services::ratings::RatingService::new(
            db_pool.clone(),
            Some(event_sender),
        ));
        let notifications = Arc::new(crate::services::notifications::NotificationService::new(
            db_pool.clone(),
        ));
        let users = Arc::new(crate::services::users::UserService::new(db_pool));

        Self {
            tasks,
            quotes,
            ratings,
            notifications,
            users,
        }
    }
}
