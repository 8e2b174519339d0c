//! Lesson Types Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::{
    lesson_types::{
        data::NewLessonType,
        records::{LessonTypeRecord, LessonTypeUuid},
    },
    tenants::records::TenantUuid,
};

const CREATE_LESSON_TYPE_SQL: &str = include_str!("sql/create_lesson_type.sql");
const GET_LESSON_TYPE_SQL: &str = include_str!("sql/get_lesson_type.sql");
const GET_ACTIVE_LESSON_TYPE_SQL: &str = include_str!("sql/get_active_lesson_type.sql");
const LIST_LESSON_TYPES_SQL: &str = include_str!("sql/list_lesson_types.sql");
const UPDATE_PRICE_SQL: &str = include_str!("sql/update_price.sql");
const SET_LESSON_TYPE_ACTIVE_SQL: &str = include_str!("sql/set_lesson_type_active.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgLessonTypesRepository;

impl PgLessonTypesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_lesson_type(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        lesson_type: NewLessonType,
        price: i64,
        duration_minutes: i32,
    ) -> Result<LessonTypeRecord, sqlx::Error> {
        query_as::<Postgres, LessonTypeRecord>(CREATE_LESSON_TYPE_SQL)
            .bind(lesson_type.uuid.into_uuid())
            .bind(tenant.into_uuid())
            .bind(lesson_type.name)
            .bind(lesson_type.description)
            .bind(duration_minutes)
            .bind(price)
            .bind(lesson_type.display_order)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_lesson_type(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        lesson_type: LessonTypeUuid,
    ) -> Result<LessonTypeRecord, sqlx::Error> {
        query_as::<Postgres, LessonTypeRecord>(GET_LESSON_TYPE_SQL)
            .bind(tenant.into_uuid())
            .bind(lesson_type.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch a lesson type that is still offered for booking.
    pub(crate) async fn get_active_lesson_type(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        lesson_type: LessonTypeUuid,
    ) -> Result<LessonTypeRecord, sqlx::Error> {
        query_as::<Postgres, LessonTypeRecord>(GET_ACTIVE_LESSON_TYPE_SQL)
            .bind(tenant.into_uuid())
            .bind(lesson_type.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_lesson_types(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        active_only: bool,
    ) -> Result<Vec<LessonTypeRecord>, sqlx::Error> {
        query_as::<Postgres, LessonTypeRecord>(LIST_LESSON_TYPES_SQL)
            .bind(tenant.into_uuid())
            .bind(active_only)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn update_price(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        lesson_type: LessonTypeUuid,
        price: i64,
    ) -> Result<LessonTypeRecord, sqlx::Error> {
        query_as::<Postgres, LessonTypeRecord>(UPDATE_PRICE_SQL)
            .bind(tenant.into_uuid())
            .bind(lesson_type.into_uuid())
            .bind(price)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_active(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        lesson_type: LessonTypeUuid,
        active: bool,
    ) -> Result<LessonTypeRecord, sqlx::Error> {
        query_as::<Postgres, LessonTypeRecord>(SET_LESSON_TYPE_ACTIVE_SQL)
            .bind(tenant.into_uuid())
            .bind(lesson_type.into_uuid())
            .bind(active)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for LessonTypeRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let price: i64 = row.try_get("price")?;
        let duration: i32 = row.try_get("duration_minutes")?;

        Ok(Self {
            uuid: LessonTypeUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            duration_minutes: u32::try_from(duration).map_err(|e| sqlx::Error::ColumnDecode {
                index: "duration_minutes".to_string(),
                source: Box::new(e),
            })?,
            price: u64::try_from(price).map_err(|e| sqlx::Error::ColumnDecode {
                index: "price".to_string(),
                source: Box::new(e),
            })?,
            active: row.try_get("active")?,
            display_order: row.try_get("display_order")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
