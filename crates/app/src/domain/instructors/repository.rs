//! Instructors Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::domain::{
    instructors::{
        data::{DEFAULT_MAX_HOURS_PER_WEEK, NewInstructor},
        records::{InstructorRecord, InstructorUuid},
    },
    tenants::records::TenantUuid,
};

const CREATE_INSTRUCTOR_SQL: &str = include_str!("sql/create_instructor.sql");
const GET_INSTRUCTOR_SQL: &str = include_str!("sql/get_instructor.sql");
const GET_ACTIVE_INSTRUCTOR_SQL: &str = include_str!("sql/get_active_instructor.sql");
const LIST_INSTRUCTORS_SQL: &str = include_str!("sql/list_instructors.sql");
const DEACTIVATE_INSTRUCTOR_SQL: &str = include_str!("sql/deactivate_instructor.sql");
const COUNT_ACTIVE_INSTRUCTORS_SQL: &str = include_str!("sql/count_active_instructors.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgInstructorsRepository;

impl PgInstructorsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_instructor(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        instructor: NewInstructor,
    ) -> Result<InstructorRecord, sqlx::Error> {
        let max_hours = instructor
            .max_hours_per_week
            .unwrap_or(DEFAULT_MAX_HOURS_PER_WEEK);

        let max_hours = i32::try_from(max_hours).map_err(|e| sqlx::Error::ColumnDecode {
            index: "max_hours_per_week".to_string(),
            source: Box::new(e),
        })?;

        query_as::<Postgres, InstructorRecord>(CREATE_INSTRUCTOR_SQL)
            .bind(instructor.uuid.into_uuid())
            .bind(tenant.into_uuid())
            .bind(instructor.name)
            .bind(instructor.email)
            .bind(instructor.phone)
            .bind(max_hours)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_instructor(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        instructor: InstructorUuid,
    ) -> Result<InstructorRecord, sqlx::Error> {
        query_as::<Postgres, InstructorRecord>(GET_INSTRUCTOR_SQL)
            .bind(tenant.into_uuid())
            .bind(instructor.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch an instructor who is still taking bookings.
    pub(crate) async fn get_active_instructor(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        instructor: InstructorUuid,
    ) -> Result<InstructorRecord, sqlx::Error> {
        query_as::<Postgres, InstructorRecord>(GET_ACTIVE_INSTRUCTOR_SQL)
            .bind(tenant.into_uuid())
            .bind(instructor.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_instructors(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        active_only: bool,
    ) -> Result<Vec<InstructorRecord>, sqlx::Error> {
        query_as::<Postgres, InstructorRecord>(LIST_INSTRUCTORS_SQL)
            .bind(tenant.into_uuid())
            .bind(active_only)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn deactivate_instructor(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        instructor: InstructorUuid,
    ) -> Result<InstructorRecord, sqlx::Error> {
        query_as::<Postgres, InstructorRecord>(DEACTIVATE_INSTRUCTOR_SQL)
            .bind(tenant.into_uuid())
            .bind(instructor.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn count_active_instructors(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_ACTIVE_INSTRUCTORS_SQL)
            .bind(tenant.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

impl<'r> FromRow<'r, PgRow> for InstructorRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let max_hours: i32 = row.try_get("max_hours_per_week")?;

        Ok(Self {
            uuid: InstructorUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            max_hours_per_week: u32::try_from(max_hours).map_err(|e| {
                sqlx::Error::ColumnDecode {
                    index: "max_hours_per_week".to_string(),
                    source: Box::new(e),
                }
            })?,
            active: row.try_get("active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
