//! Booking Events

use std::fmt;

use serde::Serialize;

use crate::domain::{
    instructors::records::InstructorRecord, lesson_types::records::LessonTypeRecord,
    lessons::records::LessonRecord, students::records::StudentRecord,
    tenants::records::TenantUuid,
};

/// What happened to the lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    BookingCreated,
    DepositConfirmed,
    DepositFailed,
    LessonRescheduled,
    LessonCancelled,
}

impl EventKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BookingCreated => "booking_created",
            Self::DepositConfirmed => "deposit_confirmed",
            Self::DepositFailed => "deposit_failed",
            Self::LessonRescheduled => "lesson_rescheduled",
            Self::LessonCancelled => "lesson_cancelled",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A committed lesson transition with snapshots of everything a message template needs.
#[derive(Debug, Clone, Serialize)]
pub struct BookingEvent {
    pub kind: EventKind,
    pub tenant_uuid: TenantUuid,
    pub lesson: LessonRecord,
    pub student: StudentRecord,
    pub instructor: InstructorRecord,
    pub lesson_type: LessonTypeRecord,
}
