//! Availability Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use roster::lessons::LessonStatus;
use sqlx::{Postgres, Transaction, query_as, query_scalar};

use crate::domain::{instructors::records::InstructorUuid, tenants::records::TenantUuid};

const LESSON_STATUSES_AT_SQL: &str = include_str!("sql/lesson_statuses_at.sql");
const LESSONS_BETWEEN_SQL: &str = include_str!("sql/lessons_between.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAvailabilityRepository;

impl PgAvailabilityRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Statuses of every lesson the instructor has starting exactly at `at`.
    pub(crate) async fn lesson_statuses_at(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        instructor: InstructorUuid,
        at: Timestamp,
    ) -> Result<Vec<LessonStatus>, sqlx::Error> {
        let statuses: Vec<String> = query_scalar(LESSON_STATUSES_AT_SQL)
            .bind(tenant.into_uuid())
            .bind(instructor.into_uuid())
            .bind(SqlxTimestamp::from(at))
            .fetch_all(&mut **tx)
            .await?;

        statuses.iter().map(|s| decode_status(s)).collect()
    }

    /// Start and status of every lesson starting within `[from, to]`.
    pub(crate) async fn lessons_between(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        instructor: InstructorUuid,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<(Timestamp, LessonStatus)>, sqlx::Error> {
        let rows: Vec<(SqlxTimestamp, String)> = query_as(LESSONS_BETWEEN_SQL)
            .bind(tenant.into_uuid())
            .bind(instructor.into_uuid())
            .bind(SqlxTimestamp::from(from))
            .bind(SqlxTimestamp::from(to))
            .fetch_all(&mut **tx)
            .await?;

        rows.into_iter()
            .map(|(at, status)| Ok((at.to_jiff(), decode_status(&status)?)))
            .collect()
    }
}

pub(crate) fn decode_status(status: &str) -> Result<LessonStatus, sqlx::Error> {
    status.parse().map_err(|e| sqlx::Error::ColumnDecode {
        index: "status".to_string(),
        source: Box::new(e),
    })
}
