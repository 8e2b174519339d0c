//! Deposits Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use roster::deposits::DepositStatus;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::domain::{
    deposits::{
        data::DepositRow,
        records::{DepositRecord, DepositUuid},
    },
    lessons::records::LessonUuid,
    tenants::records::TenantUuid,
};

const CREATE_DEPOSIT_SQL: &str = include_str!("sql/create_deposit.sql");
const GET_DEPOSIT_SQL: &str = include_str!("sql/get_deposit.sql");
const LOCK_DEPOSIT_SQL: &str = include_str!("sql/lock_deposit.sql");
const GET_LESSON_DEPOSIT_SQL: &str = include_str!("sql/get_lesson_deposit.sql");
const SET_DEPOSIT_STATUS_SQL: &str = include_str!("sql/set_deposit_status.sql");
const LIST_PENDING_DEPOSITS_SQL: &str = include_str!("sql/list_pending_deposits.sql");
const COUNT_PENDING_DEPOSITS_SQL: &str = include_str!("sql/count_pending_deposits.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgDepositsRepository;

impl PgDepositsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert a deposit. A second deposit for the same lesson is a unique violation.
    pub(crate) async fn create_deposit(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        deposit: DepositRow,
    ) -> Result<DepositRecord, sqlx::Error> {
        query_as::<Postgres, DepositRecord>(CREATE_DEPOSIT_SQL)
            .bind(deposit.uuid.into_uuid())
            .bind(tenant.into_uuid())
            .bind(deposit.lesson_uuid.into_uuid())
            .bind(deposit.amount)
            .bind(deposit.currency)
            .bind(deposit.payment_reference)
            .bind(deposit.transaction_id)
            .bind(deposit.receipt)
            .bind(deposit.status.as_str())
            .bind(deposit.verified_at.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_deposit(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        deposit: DepositUuid,
    ) -> Result<DepositRecord, sqlx::Error> {
        query_as::<Postgres, DepositRecord>(GET_DEPOSIT_SQL)
            .bind(tenant.into_uuid())
            .bind(deposit.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch a deposit and hold its row lock until the transaction ends.
    pub(crate) async fn lock_deposit(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        deposit: DepositUuid,
    ) -> Result<DepositRecord, sqlx::Error> {
        query_as::<Postgres, DepositRecord>(LOCK_DEPOSIT_SQL)
            .bind(tenant.into_uuid())
            .bind(deposit.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_lesson_deposit(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        lesson: LessonUuid,
    ) -> Result<DepositRecord, sqlx::Error> {
        query_as::<Postgres, DepositRecord>(GET_LESSON_DEPOSIT_SQL)
            .bind(tenant.into_uuid())
            .bind(lesson.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        deposit: DepositUuid,
        status: DepositStatus,
        verified_at: Option<Timestamp>,
    ) -> Result<DepositRecord, sqlx::Error> {
        query_as::<Postgres, DepositRecord>(SET_DEPOSIT_STATUS_SQL)
            .bind(tenant.into_uuid())
            .bind(deposit.into_uuid())
            .bind(status.as_str())
            .bind(verified_at.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_pending_deposits(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
    ) -> Result<Vec<DepositRecord>, sqlx::Error> {
        query_as::<Postgres, DepositRecord>(LIST_PENDING_DEPOSITS_SQL)
            .bind(tenant.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_pending_deposits(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_PENDING_DEPOSITS_SQL)
            .bind(tenant.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

impl<'r> FromRow<'r, PgRow> for DepositRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let amount: i64 = row.try_get("amount")?;
        let status: String = row.try_get("status")?;

        Ok(Self {
            uuid: DepositUuid::from_uuid(row.try_get("uuid")?),
            lesson_uuid: LessonUuid::from_uuid(row.try_get("lesson_uuid")?),
            amount: u64::try_from(amount).map_err(|e| sqlx::Error::ColumnDecode {
                index: "amount".to_string(),
                source: Box::new(e),
            })?,
            currency: row.try_get("currency")?,
            payment_reference: row.try_get("payment_reference")?,
            transaction_id: row.try_get("transaction_id")?,
            receipt: row.try_get("receipt")?,
            status: status.parse().map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?,
            verified_at: row
                .try_get::<Option<SqlxTimestamp>, _>("verified_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
