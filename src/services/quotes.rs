use crate::{
    db::DbPool,
    entities::quote::{self, QuoteStatus},
    entities::task::{self, TaskStatus},
    errors::ServiceError,
    events::{Event, EventSender},
    services::notifications::notify,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitQuoteRequest {
    #[validate(range(min = 0.0, message = "charges must be non-negative"))]
    pub charges: Option<f64>,
    #[validate(range(min = 0.0, message = "hours must be non-negative"))]
    pub hours: Option<f64>,
    pub mobile: Option<String>,
}

/// Outcome of an accepted negotiation: the updated task and the winning quote
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct AcceptQuoteResponse {
    pub message: String,
    pub task: task::Model,
    pub accepted_quote: quote::Model,
}

/// Manages competing offers on a task: one live quote per helper, and an
/// atomic accept that closes the negotiation.
#[derive(Clone)]
pub struct QuoteService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl QuoteService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Submits a quote on an open task. A prior quote from the same helper is
    /// superseded: deleted and replaced within one transaction, so the helper
    /// never transiently has zero quotes on the task.
    #[instrument(skip(self, request), fields(helper_id = helper_id, task_id = task_id))]
    pub async fn submit_quote(
        &self,
        helper_id: i32,
        task_id: i32,
        request: SubmitQuoteRequest,
    ) -> Result<quote::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let (charges, hours, mobile) = match (request.charges, request.hours, request.mobile) {
            (Some(c), Some(h), Some(m)) if !m.is_empty() => (c, h, m),
            _ => {
                return Err(ServiceError::ValidationError(
                    "Charges, hours, and mobile are required".to_string(),
                ))
            }
        };

        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, task_id = task_id, "Failed to start transaction for quote submission");
            ServiceError::DatabaseError(e)
        })?;

        task::Entity::find()
            .filter(task::Column::Id.eq(task_id))
            .filter(task::Column::Status.eq(TaskStatus::Open))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound("Task not found or no longer open".to_string())
            })?;

        // Replace-in-place: no history of superseded quotes is retained
        quote::Entity::delete_many()
            .filter(quote::Column::TaskId.eq(task_id))
            .filter(quote::Column::HelperId.eq(helper_id))
            .exec(&txn)
            .await?;

        let new_quote = quote::ActiveModel {
            task_id: Set(task_id),
            helper_id: Set(helper_id),
            charges: Set(charges),
            hours: Set(hours),
            mobile: Set(mobile),
            status: Set(QuoteStatus::Pending),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let model = new_quote.insert(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, task_id = task_id, "Failed to commit quote submission");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            quote_id = model.id,
            task_id = task_id,
            helper_id = helper_id,
            "Quote submitted"
        );
        self.emit(Event::QuoteSubmitted {
            quote_id: model.id,
            task_id,
            helper_id,
        })
        .await;

        Ok(model)
    }

    /// Accepts one quote and closes the negotiation. In a single transaction:
    /// every other quote on the task is declined (with a notification per
    /// declined helper), the selected quote is accepted, the task takes the
    /// quote's helper/charges/hours and moves open -> accepted, and the winner
    /// is notified. A failure anywhere rolls the whole thing back.
    #[instrument(skip(self), fields(actor_id = actor_id, quote_id = quote_id))]
    pub async fn accept_quote(
        &self,
        actor_id: i32,
        quote_id: i32,
    ) -> Result<(task::Model, quote::Model), ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, quote_id = quote_id, "Failed to start transaction for quote acceptance");
            ServiceError::DatabaseError(e)
        })?;

        let selected = quote::Entity::find_by_id(quote_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Quote not found".to_string()))?;

        let target_task = task::Entity::find_by_id(selected.task_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;

        if target_task.poster_id != actor_id {
            return Err(ServiceError::Forbidden(
                "Only the task poster can accept quotes".to_string(),
            ));
        }

        // Decline all other quotes, notifying each superseded helper
        let losing_quotes = quote::Entity::find()
            .filter(quote::Column::TaskId.eq(target_task.id))
            .filter(quote::Column::Id.ne(quote_id))
            .all(&txn)
            .await?;

        if !losing_quotes.is_empty() {
            quote::Entity::update_many()
                .col_expr(quote::Column::Status, Expr::value(QuoteStatus::Declined))
                .filter(quote::Column::TaskId.eq(target_task.id))
                .filter(quote::Column::Id.ne(quote_id))
                .exec(&txn)
                .await?;

            for losing in &losing_quotes {
                notify(
                    &txn,
                    losing.helper_id,
                    format!("Your quotation for '{}' was declined.", target_task.title),
                )
                .await?;
            }
        }

        // Accept the selected quote
        let mut selected_active: quote::ActiveModel = selected.into();
        selected_active.status = Set(QuoteStatus::Accepted);
        let accepted = selected_active.update(&txn).await?;

        // Assign the task, guarded so only one concurrent acceptance can win
        let now = Utc::now();
        let assigned = task::Entity::update_many()
            .col_expr(task::Column::Status, Expr::value(TaskStatus::Accepted))
            .col_expr(task::Column::HelperId, Expr::value(Some(accepted.helper_id)))
            .col_expr(task::Column::Charges, Expr::value(Some(accepted.charges)))
            .col_expr(task::Column::Hours, Expr::value(Some(accepted.hours)))
            .col_expr(task::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(task::Column::Id.eq(target_task.id))
            .filter(task::Column::Status.eq(TaskStatus::Open))
            .exec(&txn)
            .await?;

        if assigned.rows_affected == 0 {
            // Dropping the transaction rolls back the declines above
            return Err(ServiceError::Conflict(
                "Task is no longer open".to_string(),
            ));
        }

        notify(
            &txn,
            accepted.helper_id,
            format!("Your work for '{}' was assigned!", target_task.title),
        )
        .await?;

        let updated_task = task::Entity::find_by_id(target_task.id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError("Task vanished during acceptance".to_string())
            })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, quote_id = quote_id, "Failed to commit quote acceptance");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            quote_id = accepted.id,
            task_id = updated_task.id,
            helper_id = accepted.helper_id,
            declined = losing_quotes.len(),
            "Quote accepted"
        );
        self.emit(Event::QuoteAccepted {
            quote_id: accepted.id,
            task_id: updated_task.id,
            helper_id: accepted.helper_id,
            declined: losing_quotes.len() as u64,
        })
        .await;

        Ok((updated_task, accepted))
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send quote event");
            }
        }
    }
}
