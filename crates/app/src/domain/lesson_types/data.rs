//! Lesson Type Data

use crate::domain::lesson_types::records::LessonTypeUuid;

/// New Lesson Type Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewLessonType {
    pub uuid: LessonTypeUuid,
    pub name: String,
    pub description: Option<String>,

    /// Slot length in minutes.
    pub duration_minutes: u32,

    /// Price in minor currency units.
    pub price: u64,

    pub display_order: i32,
}
