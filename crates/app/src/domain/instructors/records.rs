//! Instructor Records

use jiff::Timestamp;
use serde::Serialize;

use crate::uuids::TypedUuid;

/// Instructor UUID
pub type InstructorUuid = TypedUuid<InstructorRecord>;

/// Instructor Record
#[derive(Debug, Clone, Serialize)]
pub struct InstructorRecord {
    pub uuid: InstructorUuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,

    /// Weekly teaching hour cap.
    pub max_hours_per_week: u32,

    /// Inactive instructors keep their lessons but take no new bookings.
    pub active: bool,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
