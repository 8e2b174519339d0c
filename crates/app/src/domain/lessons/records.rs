//! Lesson Records

use jiff::Timestamp;
use roster::lessons::LessonStatus;
use serde::Serialize;

use crate::{
    domain::{
        instructors::records::InstructorUuid, lesson_types::records::LessonTypeUuid,
        students::records::StudentUuid,
    },
    uuids::TypedUuid,
};

/// Lesson UUID
pub type LessonUuid = TypedUuid<LessonRecord>;

/// Lesson Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonRecord {
    pub uuid: LessonUuid,
    pub student_uuid: StudentUuid,
    pub instructor_uuid: InstructorUuid,
    pub lesson_type_uuid: LessonTypeUuid,

    /// Start of the lesson; the slot it occupies.
    pub scheduled_at: Timestamp,

    pub status: LessonStatus,

    /// Set when the lesson's deposit is confirmed.
    pub deposit_paid: bool,

    /// Free text, with cancellation annotations appended.
    pub notes: String,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
