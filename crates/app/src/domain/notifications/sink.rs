//! Notification Sinks

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tracing::info;

use crate::domain::notifications::events::BookingEvent;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("notification channel unavailable: {0}")]
    Unavailable(String),

    #[error("notification rejected: {0}")]
    Rejected(String),
}

#[automock]
#[async_trait]
/// Delivers booking events to students, instructors or staff.
///
/// Errors are logged by the caller and otherwise ignored; implementations must not retry
/// indefinitely.
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, event: &BookingEvent) -> Result<(), NotificationError>;
}

/// Sink that records every event in the trace log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn deliver(&self, event: &BookingEvent) -> Result<(), NotificationError> {
        let payload = serde_json::to_string(event)
            .map_err(|error| NotificationError::Rejected(error.to_string()))?;

        info!(
            kind = %event.kind,
            tenant_uuid = %event.tenant_uuid,
            lesson_uuid = %event.lesson.uuid,
            payload = %payload,
            "booking event"
        );

        Ok(())
    }
}
