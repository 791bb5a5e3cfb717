use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

/// Events emitted by the services after a state transition commits. These are
/// telemetry only; durable in-app notifications are written inside the same
/// transaction as the transition that triggers them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Task events
    TaskCreated(i32),
    TaskCompleted(i32),
    TaskDeleted(i32),

    // Quote negotiation events
    QuoteSubmitted {
        quote_id: i32,
        task_id: i32,
        helper_id: i32,
    },
    QuoteAccepted {
        quote_id: i32,
        task_id: i32,
        helper_id: i32,
        declined: u64,
    },

    // Rating events
    RatingSubmitted {
        rating_id: i32,
        task_id: i32,
        ratee_id: i32,
    },

    // User events
    UserRegistered(i32),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel, logging each event. Runs for the lifetime of the
/// process; exits when every sender is dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::TaskCreated(id) => info!(task_id = id, "Task created"),
            Event::TaskCompleted(id) => info!(task_id = id, "Task completed"),
            Event::TaskDeleted(id) => info!(task_id = id, "Task deleted"),
            Event::QuoteSubmitted {
                quote_id,
                task_id,
                helper_id,
            } => info!(
                quote_id = quote_id,
                task_id = task_id,
                helper_id = helper_id,
                "Quote submitted"
            ),
            Event::QuoteAccepted {
                quote_id,
                task_id,
                helper_id,
                declined,
            } => info!(
                quote_id = quote_id,
                task_id = task_id,
                helper_id = helper_id,
                declined = declined,
                "Quote accepted"
            ),
            Event::RatingSubmitted {
                rating_id,
                task_id,
                ratee_id,
            } => info!(
                rating_id = rating_id,
                task_id = task_id,
                ratee_id = ratee_id,
                "Rating submitted"
            ),
            Event::UserRegistered(id) => info!(user_id = id, "User registered"),
        }
    }
}
