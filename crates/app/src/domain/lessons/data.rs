//! Lesson Data

use jiff::Timestamp;
use roster::{cancellation::CancellationAdvisory, lessons::LessonStatus};
use serde::Serialize;

use crate::domain::{
    instructors::records::InstructorUuid,
    lesson_types::records::LessonTypeUuid,
    lessons::records::{LessonRecord, LessonUuid},
    students::records::StudentUuid,
};

/// Default page size for booking listings.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// New Booking
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub uuid: LessonUuid,
    pub student_uuid: StudentUuid,
    pub instructor_uuid: InstructorUuid,
    pub lesson_type_uuid: LessonTypeUuid,
    pub scheduled_at: Timestamp,
    pub notes: Option<String>,
}

/// Booking listing filter. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub status: Option<LessonStatus>,
    pub instructor_uuid: Option<InstructorUuid>,
    pub student_uuid: Option<StudentUuid>,

    /// Inclusive lower bound on the scheduled time.
    pub from: Option<Timestamp>,

    /// Exclusive upper bound on the scheduled time.
    pub to: Option<Timestamp>,

    /// Page size, [`DEFAULT_PAGE_SIZE`] when unset.
    pub limit: Option<u32>,
    pub offset: u32,
}

/// A cancelled lesson with the notice assessment made at cancellation time.
#[derive(Debug, Clone, Serialize)]
pub struct CancelledLesson {
    pub lesson: LessonRecord,
    pub advisory: CancellationAdvisory,
}

/// Headline counts for a tenant's dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardCounts {
    /// Non-cancelled lessons scheduled on the current local day.
    pub lessons_today: u64,

    /// Deposits awaiting confirmation.
    pub pending_deposits: u64,

    /// Lessons created since the start of the current local month.
    pub monthly_bookings: u64,
}
