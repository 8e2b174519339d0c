//! Instructor Data

use crate::domain::instructors::records::InstructorUuid;

/// Weekly hour cap applied when none is given.
pub const DEFAULT_MAX_HOURS_PER_WEEK: u32 = 40;

/// New Instructor Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewInstructor {
    pub uuid: InstructorUuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub max_hours_per_week: Option<u32>,
}
