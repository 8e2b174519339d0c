//! Tenants Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use roster::limits::PlanLimits;
use rustc_hash::FxHashMap;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::domain::tenants::{
    data::NewTenant,
    records::{TenantRecord, TenantStatus, TenantUuid},
};

const CREATE_TENANT_SQL: &str = include_str!("sql/create_tenant.sql");
const FIND_ACTIVE_TENANT_BY_SLUG_SQL: &str = include_str!("sql/find_active_tenant_by_slug.sql");
const GET_TENANT_SQL: &str = include_str!("sql/get_tenant.sql");
const SET_TENANT_STATUS_SQL: &str = include_str!("sql/set_tenant_status.sql");
const GET_CONFIG_SQL: &str = include_str!("sql/get_config.sql");
const LIST_CONFIGS_SQL: &str = include_str!("sql/list_configs.sql");
const SET_CONFIG_SQL: &str = include_str!("sql/set_config.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgTenantsRepository;

impl PgTenantsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_tenant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: NewTenant,
    ) -> Result<TenantRecord, sqlx::Error> {
        query_as::<Postgres, TenantRecord>(CREATE_TENANT_SQL)
            .bind(tenant.uuid.into_uuid())
            .bind(tenant.slug)
            .bind(tenant.name)
            .bind(cap_to_sql(tenant.limits.max_instructors, "max_instructors")?)
            .bind(cap_to_sql(tenant.limits.max_students, "max_students")?)
            .bind(cap_to_sql(
                tenant.limits.max_monthly_bookings,
                "max_monthly_bookings",
            )?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_active_by_slug(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        slug: &str,
    ) -> Result<TenantRecord, sqlx::Error> {
        query_as::<Postgres, TenantRecord>(FIND_ACTIVE_TENANT_BY_SLUG_SQL)
            .bind(slug)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_tenant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
    ) -> Result<TenantRecord, sqlx::Error> {
        query_as::<Postgres, TenantRecord>(GET_TENANT_SQL)
            .bind(tenant.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        status: TenantStatus,
    ) -> Result<TenantRecord, sqlx::Error> {
        query_as::<Postgres, TenantRecord>(SET_TENANT_STATUS_SQL)
            .bind(tenant.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_config(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        key: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        query_scalar(GET_CONFIG_SQL)
            .bind(tenant.into_uuid())
            .bind(key)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_configs(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
    ) -> Result<FxHashMap<String, String>, sqlx::Error> {
        let rows: Vec<(String, String)> = query_as(LIST_CONFIGS_SQL)
            .bind(tenant.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().collect())
    }

    pub(crate) async fn set_config(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: TenantUuid,
        key: &str,
        value: &str,
    ) -> Result<(), sqlx::Error> {
        query(SET_CONFIG_SQL)
            .bind(tenant.into_uuid())
            .bind(key)
            .bind(value)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

fn cap_to_sql(cap: Option<u32>, column: &str) -> Result<Option<i32>, sqlx::Error> {
    cap.map(i32::try_from)
        .transpose()
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
}

fn cap_from_row(row: &PgRow, column: &str) -> sqlx::Result<Option<u32>> {
    row.try_get::<Option<i32>, _>(column)?
        .map(u32::try_from)
        .transpose()
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
}

impl<'r> FromRow<'r, PgRow> for TenantRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        Ok(Self {
            uuid: TenantUuid::from_uuid(row.try_get("uuid")?),
            slug: row.try_get("slug")?,
            name: row.try_get("name")?,
            status: status.parse().map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?,
            limits: PlanLimits {
                max_instructors: cap_from_row(row, "max_instructors")?,
                max_students: cap_from_row(row, "max_students")?,
                max_monthly_bookings: cap_from_row(row, "max_monthly_bookings")?,
            },
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
