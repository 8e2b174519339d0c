//! Students Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::domain::{
    students::{
        data::NewStudent,
        records::{PendingOtp, StudentRecord, StudentUuid},
    },
    tenants::records::TenantUuid,
};

const CREATE_STUDENT_SQL: &str = include_str!("sql/create_student.sql");
const GET_STUDENT_SQL: &str = include_str!("sql/get_student.sql");
const FIND_STUDENT_BY_PHONE_SQL: &str = include_str!("sql/find_student_by_phone.sql");
const ISSUE_OTP_SQL: &str = include_str!("sql/issue_otp.sql");
const LOCK_PENDING_OTP_SQL: &str = include_str!("sql/lock_pending_otp.sql");
const MARK_VERIFIED_SQL: &str = include_str!("sql/mark_verified.sql");
const COUNT_STUDENTS_SQL: &str = include_str!("sql/count_students.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgStudentsRepository;

impl PgStudentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert a student whose phone has already been validated.
    pub(crate) async fn create_student(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        student: NewStudent,
    ) -> Result<StudentRecord, sqlx::Error> {
        query_as::<Postgres, StudentRecord>(CREATE_STUDENT_SQL)
            .bind(student.uuid.into_uuid())
            .bind(tenant.into_uuid())
            .bind(student.phone)
            .bind(student.name)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_student(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        student: StudentUuid,
    ) -> Result<StudentRecord, sqlx::Error> {
        query_as::<Postgres, StudentRecord>(GET_STUDENT_SQL)
            .bind(tenant.into_uuid())
            .bind(student.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_by_phone(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        phone: &str,
    ) -> Result<Option<StudentRecord>, sqlx::Error> {
        query_as::<Postgres, StudentRecord>(FIND_STUDENT_BY_PHONE_SQL)
            .bind(tenant.into_uuid())
            .bind(phone)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn issue_otp(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        student: StudentUuid,
        code: &str,
        expires_at: Timestamp,
    ) -> Result<StudentRecord, sqlx::Error> {
        query_as::<Postgres, StudentRecord>(ISSUE_OTP_SQL)
            .bind(tenant.into_uuid())
            .bind(student.into_uuid())
            .bind(code)
            .bind(SqlxTimestamp::from(expires_at))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn lock_pending_otp(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        phone: &str,
    ) -> Result<PendingOtp, sqlx::Error> {
        query_as::<Postgres, PendingOtp>(LOCK_PENDING_OTP_SQL)
            .bind(tenant.into_uuid())
            .bind(phone)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn mark_verified(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        student: StudentUuid,
    ) -> Result<StudentRecord, sqlx::Error> {
        query_as::<Postgres, StudentRecord>(MARK_VERIFIED_SQL)
            .bind(tenant.into_uuid())
            .bind(student.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn count_students(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_STUDENTS_SQL)
            .bind(tenant.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

impl<'r> FromRow<'r, PgRow> for StudentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: StudentUuid::from_uuid(row.try_get("uuid")?),
            phone: row.try_get("phone")?,
            name: row.try_get("name")?,
            otp_verified: row.try_get("otp_verified")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for PendingOtp {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: StudentUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("otp_code")?,
            expires_at: row
                .try_get::<Option<SqlxTimestamp>, _>("otp_expires_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
