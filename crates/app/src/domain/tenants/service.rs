//! Tenants service.

use async_trait::async_trait;
use mockall::automock;
use roster::TenantSettings;
use tracing::{debug, info};

use crate::{
    database::Db,
    domain::tenants::{
        data::NewTenant,
        errors::TenantsServiceError,
        records::{Tenant, TenantRecord, TenantStatus, TenantUuid},
        repository::PgTenantsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgTenantsService {
    db: Db,
    repository: PgTenantsRepository,
}

impl PgTenantsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgTenantsRepository::new(),
        }
    }

    async fn load_settings(&self, tenant: TenantUuid) -> Result<TenantSettings, TenantsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let config = self.repository.list_configs(&mut tx, tenant).await?;

        tx.commit().await?;

        debug!(config_keys = config.len(), "loaded tenant configuration");

        Ok(TenantSettings::from_map(&config)?)
    }
}

#[async_trait]
impl TenantsService for PgTenantsService {
    #[tracing::instrument(
        name = "tenants.service.create_tenant",
        skip(self, tenant),
        fields(tenant_uuid = %tenant.uuid, slug = %tenant.slug),
        err
    )]
    async fn create_tenant(&self, tenant: NewTenant) -> Result<TenantRecord, TenantsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.create_tenant(&mut tx, tenant).await?;

        tx.commit().await?;

        info!(tenant_uuid = %record.uuid, "created tenant");

        Ok(record)
    }

    #[tracing::instrument(name = "tenants.service.resolve_tenant", skip(self), err)]
    async fn resolve_tenant(&self, slug: &str) -> Result<Tenant, TenantsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.find_active_by_slug(&mut tx, slug).await?;

        tx.commit().await?;

        let settings = self.load_settings(record.uuid).await?;

        Ok(Tenant { record, settings })
    }

    #[tracing::instrument(
        name = "tenants.service.get_tenant",
        skip(self),
        fields(tenant_uuid = %tenant),
        err
    )]
    async fn get_tenant(&self, tenant: TenantUuid) -> Result<Tenant, TenantsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.get_tenant(&mut tx, tenant).await?;

        tx.commit().await?;

        let settings = self.load_settings(record.uuid).await?;

        Ok(Tenant { record, settings })
    }

    #[tracing::instrument(
        name = "tenants.service.set_status",
        skip(self),
        fields(tenant_uuid = %tenant, status = %status),
        err
    )]
    async fn set_status(
        &self,
        tenant: TenantUuid,
        status: TenantStatus,
    ) -> Result<TenantRecord, TenantsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.set_status(&mut tx, tenant, status).await?;

        tx.commit().await?;

        info!(tenant_uuid = %tenant, status = %status, "updated tenant status");

        Ok(record)
    }

    #[tracing::instrument(
        name = "tenants.service.get_config",
        skip(self, default),
        fields(tenant_uuid = %tenant),
        err
    )]
    async fn get_config(
        &self,
        tenant: TenantUuid,
        key: &str,
        default: &str,
    ) -> Result<String, TenantsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let value = self.repository.get_config(&mut tx, tenant, key).await?;

        tx.commit().await?;

        Ok(value.unwrap_or_else(|| default.to_string()))
    }

    #[tracing::instrument(
        name = "tenants.service.set_config",
        skip(self, value),
        fields(tenant_uuid = %tenant),
        err
    )]
    async fn set_config(
        &self,
        tenant: TenantUuid,
        key: &str,
        value: &str,
    ) -> Result<(), TenantsServiceError> {
        TenantSettings::validate(key, value)?;

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        self.repository.set_config(&mut tx, tenant, key, value).await?;

        tx.commit().await?;

        info!(tenant_uuid = %tenant, key, "updated tenant configuration");

        Ok(())
    }

    #[tracing::instrument(
        name = "tenants.service.settings",
        skip(self),
        fields(tenant_uuid = %tenant),
        err
    )]
    async fn settings(&self, tenant: TenantUuid) -> Result<TenantSettings, TenantsServiceError> {
        self.load_settings(tenant).await
    }
}

#[automock]
#[async_trait]
/// Tenant registry and configuration store.
pub trait TenantsService: Send + Sync {
    /// Creates a new tenant.
    async fn create_tenant(&self, tenant: NewTenant) -> Result<TenantRecord, TenantsServiceError>;

    /// Resolve an active, non-deleted tenant by slug, with its settings.
    async fn resolve_tenant(&self, slug: &str) -> Result<Tenant, TenantsServiceError>;

    /// Load a tenant by UUID regardless of status, with its settings.
    async fn get_tenant(&self, tenant: TenantUuid) -> Result<Tenant, TenantsServiceError>;

    /// Change a tenant's lifecycle status.
    async fn set_status(
        &self,
        tenant: TenantUuid,
        status: TenantStatus,
    ) -> Result<TenantRecord, TenantsServiceError>;

    /// Raw configuration value, or `default` when the key is unset.
    async fn get_config(
        &self,
        tenant: TenantUuid,
        key: &str,
        default: &str,
    ) -> Result<String, TenantsServiceError>;

    /// Store a configuration value, validating keys the settings understand.
    async fn set_config(
        &self,
        tenant: TenantUuid,
        key: &str,
        value: &str,
    ) -> Result<(), TenantsServiceError>;

    /// Typed settings with defaults for unset keys.
    async fn settings(&self, tenant: TenantUuid) -> Result<TenantSettings, TenantsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use roster::{ErrorKind, limits::PlanLimits, settings};
    use sqlx::query;
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    fn new_tenant(slug: &str) -> NewTenant {
        NewTenant {
            uuid: TenantUuid::new(),
            slug: slug.to_string(),
            name: format!("{slug} lessons"),
            limits: PlanLimits::default(),
        }
    }

    #[tokio::test]
    async fn create_tenant_returns_record_with_limits() -> TestResult {
        let ctx = TestContext::new().await;
        let before = Timestamp::now();

        let tenant = ctx
            .tenants
            .create_tenant(NewTenant {
                limits: PlanLimits {
                    max_instructors: Some(3),
                    max_students: None,
                    max_monthly_bookings: Some(200),
                },
                ..new_tenant("bayside")
            })
            .await?;

        assert_eq!(tenant.slug, "bayside");
        assert_eq!(tenant.status, TenantStatus::Active);
        assert_eq!(tenant.limits.max_instructors, Some(3));
        assert_eq!(tenant.limits.max_students, None);
        assert_eq!(tenant.limits.max_monthly_bookings, Some(200));
        assert!(tenant.created_at >= before);
        assert!(tenant.deleted_at.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_slug_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.tenants.create_tenant(new_tenant("northside")).await?;

        let result = ctx.tenants.create_tenant(new_tenant("northside")).await;

        assert!(
            matches!(result, Err(TenantsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn malformed_slug_is_rejected() {
        let ctx = TestContext::new().await;

        let result = ctx.tenants.create_tenant(new_tenant("Not A Slug")).await;

        assert!(
            matches!(&result, Err(e) if e.kind() == ErrorKind::ValidationError),
            "expected ValidationError, got {result:?}"
        );
    }

    #[tokio::test]
    async fn resolve_tenant_loads_default_settings() -> TestResult {
        let ctx = TestContext::new().await;

        let tenant = ctx.tenants.resolve_tenant("acme").await?;

        assert_eq!(tenant.uuid(), ctx.tenant_uuid);
        assert_eq!(tenant.settings.cancellation_hours, 24);
        assert_eq!(tenant.settings.deposit_percentage.points(), 50);
        assert_eq!(tenant.settings.currency.iso_alpha_code, "AUD");

        Ok(())
    }

    #[tokio::test]
    async fn unknown_slug_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.tenants.resolve_tenant("nobody").await;

        assert!(
            matches!(result, Err(TenantsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn inactive_and_deleted_tenants_do_not_resolve() -> TestResult {
        let ctx = TestContext::new().await;

        for (slug, status) in [
            ("dormant", TenantStatus::Inactive),
            ("gone", TenantStatus::Deleted),
        ] {
            let record = ctx.tenants.create_tenant(new_tenant(slug)).await?;
            let updated = ctx.tenants.set_status(record.uuid, status).await?;

            assert_eq!(updated.status, status);

            let result = ctx.tenants.resolve_tenant(slug).await;

            assert!(
                matches!(result, Err(TenantsServiceError::NotFound)),
                "expected NotFound for {status} tenant, got {result:?}"
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn get_config_falls_back_to_caller_default() -> TestResult {
        let ctx = TestContext::new().await;

        let value = ctx
            .tenants
            .get_config(ctx.tenant_uuid, "welcome_message", "G'day")
            .await?;

        assert_eq!(value, "G'day");

        Ok(())
    }

    #[tokio::test]
    async fn set_config_overrides_and_flows_into_settings() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.tenants
            .set_config(ctx.tenant_uuid, settings::CANCELLATION_HOURS, "48")
            .await?;

        ctx.tenants
            .set_config(ctx.tenant_uuid, settings::CANCELLATION_HOURS, "12")
            .await?;

        let raw = ctx
            .tenants
            .get_config(ctx.tenant_uuid, settings::CANCELLATION_HOURS, "24")
            .await?;

        let typed = ctx.tenants.settings(ctx.tenant_uuid).await?;

        assert_eq!(raw, "12");
        assert_eq!(typed.cancellation_hours, 12);

        Ok(())
    }

    #[tokio::test]
    async fn set_config_rejects_malformed_values() {
        let ctx = TestContext::new().await;

        let result = ctx
            .tenants
            .set_config(ctx.tenant_uuid, settings::DEPOSIT_PERCENTAGE, "lots")
            .await;

        assert!(
            matches!(result, Err(TenantsServiceError::InvalidSettings(_))),
            "expected InvalidSettings, got {result:?}"
        );
    }

    #[tokio::test]
    async fn malformed_stored_value_is_a_validation_error() -> TestResult {
        let ctx = TestContext::new().await;

        query("INSERT INTO tenant_configs (tenant_uuid, key, value) VALUES ($1, $2, $3)")
            .bind(ctx.tenant_uuid.into_uuid())
            .bind(settings::BUSINESS_HOURS)
            .bind("nine till five")
            .execute(ctx.db.pool())
            .await?;

        let result = ctx.tenants.settings(ctx.tenant_uuid).await;

        assert!(
            matches!(&result, Err(e) if e.kind() == ErrorKind::ValidationError),
            "expected ValidationError, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn configuration_is_isolated_between_tenants() -> TestResult {
        let ctx = TestContext::new().await;
        let other = ctx.create_tenant("other").await;

        ctx.tenants
            .set_config(ctx.tenant_uuid, settings::CURRENCY, "NZD")
            .await?;

        let own = ctx.tenants.settings(ctx.tenant_uuid).await?;
        let theirs = ctx.tenants.settings(other.uuid()).await?;

        assert_eq!(own.currency.iso_alpha_code, "NZD");
        assert_eq!(theirs.currency.iso_alpha_code, "AUD");

        Ok(())
    }

    #[test]
    fn check_limit_fails_open_for_unknown_limits() {
        let tenant = Tenant {
            record: TenantRecord {
                uuid: TenantUuid::new(),
                slug: "capped".to_string(),
                name: "Capped".to_string(),
                status: TenantStatus::Active,
                limits: PlanLimits {
                    max_instructors: Some(1),
                    max_students: Some(1),
                    max_monthly_bookings: Some(1),
                },
                created_at: Timestamp::UNIX_EPOCH,
                updated_at: Timestamp::UNIX_EPOCH,
                deleted_at: None,
            },
            settings: TenantSettings::default(),
        };

        assert!(tenant.check_limit("students", 0));
        assert!(!tenant.check_limit("students", 1));
        assert!(tenant.check_limit("sms_credits", 1_000));
    }
}
