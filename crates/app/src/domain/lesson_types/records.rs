//! Lesson Type Records

use jiff::Timestamp;
use serde::Serialize;

use crate::uuids::TypedUuid;

/// Lesson Type UUID
pub type LessonTypeUuid = TypedUuid<LessonTypeRecord>;

/// Lesson Type Record
#[derive(Debug, Clone, Serialize)]
pub struct LessonTypeRecord {
    pub uuid: LessonTypeUuid,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: u32,

    /// Price in minor currency units.
    pub price: u64,

    pub active: bool,
    pub display_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
