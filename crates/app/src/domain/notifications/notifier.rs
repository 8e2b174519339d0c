//! Notifier

use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

use crate::domain::notifications::{events::BookingEvent, sink::NotificationSink};

/// Queues events for background delivery to a [`NotificationSink`].
///
/// Cloning shares the queue. The delivery task exits once every clone is dropped.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: mpsc::UnboundedSender<BookingEvent>,
}

impl Notifier {
    /// Start the delivery task. Must be called within a Tokio runtime.
    pub fn spawn(sink: Arc<dyn NotificationSink>) -> Self {
        Self::spawn_with_handle(sink).0
    }

    /// Start the delivery task and keep its handle.
    ///
    /// The task finishes once every clone of the notifier is dropped and the queue is drained,
    /// so awaiting the handle flushes pending events before a short-lived process exits.
    pub fn spawn_with_handle(sink: Arc<dyn NotificationSink>) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::unbounded_channel::<BookingEvent>();

        let delivery = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                match sink.deliver(&event).await {
                    Ok(()) => {
                        debug!(kind = %event.kind, lesson_uuid = %event.lesson.uuid, "delivered");
                    }
                    Err(error) => {
                        warn!(
                            kind = %event.kind,
                            lesson_uuid = %event.lesson.uuid,
                            %error,
                            "notification delivery failed"
                        );
                    }
                }
            }
        });

        (Self { sender }, delivery)
    }

    /// Queue an event. Never blocks and never fails the caller.
    pub fn notify(&self, event: BookingEvent) {
        if let Err(error) = self.sender.send(event) {
            warn!(kind = %error.0.kind, "notification queue closed; event dropped");
        }
    }
}
