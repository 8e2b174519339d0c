//! Lessons Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use roster::lessons::LessonStatus;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::domain::{
    availability::repository::decode_status,
    instructors::records::InstructorUuid,
    lesson_types::records::LessonTypeUuid,
    lessons::{
        data::{BookingFilter, DEFAULT_PAGE_SIZE, NewBooking},
        records::{LessonRecord, LessonUuid},
    },
    students::records::StudentUuid,
    tenants::records::TenantUuid,
};

const CREATE_LESSON_SQL: &str = include_str!("sql/create_lesson.sql");
const GET_LESSON_SQL: &str = include_str!("sql/get_lesson.sql");
const LOCK_LESSON_SQL: &str = include_str!("sql/lock_lesson.sql");
const SET_LESSON_STATUS_SQL: &str = include_str!("sql/set_lesson_status.sql");
const CONFIRM_LESSON_DEPOSIT_SQL: &str = include_str!("sql/confirm_lesson_deposit.sql");
const CANCEL_LESSON_SQL: &str = include_str!("sql/cancel_lesson.sql");
const RESCHEDULE_LESSON_SQL: &str = include_str!("sql/reschedule_lesson.sql");
const STUDENT_LESSONS_SQL: &str = include_str!("sql/student_lessons.sql");
const INSTRUCTOR_SCHEDULE_SQL: &str = include_str!("sql/instructor_schedule.sql");
const LIST_LESSONS_SQL: &str = include_str!("sql/list_lessons.sql");
const COUNT_LESSONS_CREATED_SINCE_SQL: &str = include_str!("sql/count_lessons_created_since.sql");
const COUNT_LESSONS_SCHEDULED_BETWEEN_SQL: &str =
    include_str!("sql/count_lessons_scheduled_between.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgLessonsRepository;

impl PgLessonsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert a `pending_deposit` lesson.
    ///
    /// Fails with a unique violation on the active slot index when the instructor already
    /// holds a non-cancelled lesson at the same time.
    pub(crate) async fn create_lesson(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        booking: NewBooking,
    ) -> Result<LessonRecord, sqlx::Error> {
        query_as::<Postgres, LessonRecord>(CREATE_LESSON_SQL)
            .bind(booking.uuid.into_uuid())
            .bind(tenant.into_uuid())
            .bind(booking.student_uuid.into_uuid())
            .bind(booking.instructor_uuid.into_uuid())
            .bind(booking.lesson_type_uuid.into_uuid())
            .bind(SqlxTimestamp::from(booking.scheduled_at))
            .bind(booking.notes.unwrap_or_default())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_lesson(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        lesson: LessonUuid,
    ) -> Result<LessonRecord, sqlx::Error> {
        query_as::<Postgres, LessonRecord>(GET_LESSON_SQL)
            .bind(tenant.into_uuid())
            .bind(lesson.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch a lesson and hold its row lock until the transaction ends.
    pub(crate) async fn lock_lesson(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        lesson: LessonUuid,
    ) -> Result<LessonRecord, sqlx::Error> {
        query_as::<Postgres, LessonRecord>(LOCK_LESSON_SQL)
            .bind(tenant.into_uuid())
            .bind(lesson.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        lesson: LessonUuid,
        status: LessonStatus,
    ) -> Result<LessonRecord, sqlx::Error> {
        query_as::<Postgres, LessonRecord>(SET_LESSON_STATUS_SQL)
            .bind(tenant.into_uuid())
            .bind(lesson.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// Record a confirmed deposit: set `status` and mark the deposit paid.
    pub(crate) async fn confirm_deposit(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        lesson: LessonUuid,
        status: LessonStatus,
    ) -> Result<LessonRecord, sqlx::Error> {
        query_as::<Postgres, LessonRecord>(CONFIRM_LESSON_DEPOSIT_SQL)
            .bind(tenant.into_uuid())
            .bind(lesson.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// Cancel a lesson, appending `annotation` to its notes.
    pub(crate) async fn cancel_lesson(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        lesson: LessonUuid,
        annotation: &str,
    ) -> Result<LessonRecord, sqlx::Error> {
        query_as::<Postgres, LessonRecord>(CANCEL_LESSON_SQL)
            .bind(tenant.into_uuid())
            .bind(lesson.into_uuid())
            .bind(annotation)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn reschedule_lesson(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        lesson: LessonUuid,
        scheduled_at: Timestamp,
    ) -> Result<LessonRecord, sqlx::Error> {
        query_as::<Postgres, LessonRecord>(RESCHEDULE_LESSON_SQL)
            .bind(tenant.into_uuid())
            .bind(lesson.into_uuid())
            .bind(SqlxTimestamp::from(scheduled_at))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn student_lessons(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        student: StudentUuid,
        limit: u32,
    ) -> Result<Vec<LessonRecord>, sqlx::Error> {
        query_as::<Postgres, LessonRecord>(STUDENT_LESSONS_SQL)
            .bind(tenant.into_uuid())
            .bind(student.into_uuid())
            .bind(i64::from(limit))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn instructor_schedule(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        instructor: InstructorUuid,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<LessonRecord>, sqlx::Error> {
        query_as::<Postgres, LessonRecord>(INSTRUCTOR_SCHEDULE_SQL)
            .bind(tenant.into_uuid())
            .bind(instructor.into_uuid())
            .bind(SqlxTimestamp::from(from))
            .bind(SqlxTimestamp::from(to))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_lessons(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        filter: BookingFilter,
    ) -> Result<Vec<LessonRecord>, sqlx::Error> {
        query_as::<Postgres, LessonRecord>(LIST_LESSONS_SQL)
            .bind(tenant.into_uuid())
            .bind(filter.status.map(LessonStatus::as_str))
            .bind(filter.instructor_uuid.map(InstructorUuid::into_uuid))
            .bind(filter.student_uuid.map(StudentUuid::into_uuid))
            .bind(filter.from.map(SqlxTimestamp::from))
            .bind(filter.to.map(SqlxTimestamp::from))
            .bind(i64::from(filter.limit.unwrap_or(DEFAULT_PAGE_SIZE)))
            .bind(i64::from(filter.offset))
            .fetch_all(&mut **tx)
            .await
    }

    /// Lessons created at or after `since`, whatever their status.
    pub(crate) async fn count_created_since(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        since: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_LESSONS_CREATED_SINCE_SQL)
            .bind(tenant.into_uuid())
            .bind(SqlxTimestamp::from(since))
            .fetch_one(&mut **tx)
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Non-cancelled lessons scheduled within `[from, to)`.
    pub(crate) async fn count_scheduled_between(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_LESSONS_SCHEDULED_BETWEEN_SQL)
            .bind(tenant.into_uuid())
            .bind(SqlxTimestamp::from(from))
            .bind(SqlxTimestamp::from(to))
            .fetch_one(&mut **tx)
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

impl<'r> FromRow<'r, PgRow> for LessonRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        Ok(Self {
            uuid: LessonUuid::from_uuid(row.try_get("uuid")?),
            student_uuid: StudentUuid::from_uuid(row.try_get("student_uuid")?),
            instructor_uuid: InstructorUuid::from_uuid(row.try_get("instructor_uuid")?),
            lesson_type_uuid: LessonTypeUuid::from_uuid(row.try_get("lesson_type_uuid")?),
            scheduled_at: row.try_get::<SqlxTimestamp, _>("scheduled_at")?.to_jiff(),
            status: decode_status(&status)?,
            deposit_paid: row.try_get("deposit_paid")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
