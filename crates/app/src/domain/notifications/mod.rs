//! Notifications
//!
//! Booking and deposit transitions are announced to a [`NotificationSink`] after they commit.
//! Delivery happens off the request path: a failed or slow sink never affects the operation
//! that produced the event.

pub mod events;
pub mod notifier;
pub mod sink;

pub use events::{BookingEvent, EventKind};
pub use notifier::Notifier;
pub use sink::{MockNotificationSink, NotificationError, NotificationSink, TracingSink};
