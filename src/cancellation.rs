//! Cancellation Notice

use jiff::{SignedDuration, Timestamp};
use serde::Serialize;

/// Advisory produced when a lesson is cancelled.
///
/// It never blocks a cancellation; it only informs the response and the lesson's audit notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CancellationAdvisory {
    /// Whether less than the required notice remained before the lesson.
    pub late: bool,

    /// Notice the tenant asks for, in hours.
    pub notice_hours: u32,
}

impl CancellationAdvisory {
    /// Assess a cancellation requested at `now` for a lesson scheduled at `scheduled_at`.
    pub fn assess(scheduled_at: Timestamp, now: Timestamp, notice_hours: u32) -> Self {
        let remaining = scheduled_at.duration_since(now);
        let required = SignedDuration::from_hours(i64::from(notice_hours));

        Self {
            late: remaining < required,
            notice_hours,
        }
    }

    /// Human-readable suffix for the response message; empty for on-time cancellations.
    pub fn message(&self) -> String {
        if self.late {
            format!(
                " (Late cancellation - less than {}h notice)",
                self.notice_hours
            )
        } else {
            String::new()
        }
    }

    /// Line appended to the lesson's notes.
    pub fn annotation(&self, cancelled_at: Timestamp, reason: Option<&str>) -> String {
        let mut note = format!(
            "\n[Cancelled: {}]{}",
            cancelled_at.strftime("%Y-%m-%d %H:%M:%S"),
            self.message()
        );

        if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
            note.push_str(" Reason: ");
            note.push_str(reason);
        }

        note
    }
}
