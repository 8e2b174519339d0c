//! Lesson event snapshots.

use sqlx::{Postgres, Transaction};

use crate::domain::{
    instructors::repository::PgInstructorsRepository,
    lesson_types::repository::PgLessonTypesRepository,
    lessons::records::LessonRecord,
    notifications::{BookingEvent, EventKind},
    students::repository::PgStudentsRepository,
    tenants::records::TenantUuid,
};

/// Loads the records a [`BookingEvent`] carries alongside the lesson.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSnapshots {
    students: PgStudentsRepository,
    instructors: PgInstructorsRepository,
    lesson_types: PgLessonTypesRepository,
}

impl EventSnapshots {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Snapshot the lesson's student, instructor and lesson type inside the mutating
    /// transaction, so the event describes exactly what was committed.
    pub(crate) async fn event(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        kind: EventKind,
        lesson: LessonRecord,
    ) -> Result<BookingEvent, sqlx::Error> {
        let student = self
            .students
            .get_student(tx, tenant, lesson.student_uuid)
            .await?;

        let instructor = self
            .instructors
            .get_instructor(tx, tenant, lesson.instructor_uuid)
            .await?;

        let lesson_type = self
            .lesson_types
            .get_lesson_type(tx, tenant, lesson.lesson_type_uuid)
            .await?;

        Ok(BookingEvent {
            kind,
            tenant_uuid: tenant,
            lesson,
            student,
            instructor,
            lesson_type,
        })
    }
}
