//! Lesson types service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        lesson_types::{
            data::NewLessonType,
            errors::LessonTypesServiceError,
            records::{LessonTypeRecord, LessonTypeUuid},
            repository::PgLessonTypesRepository,
        },
        tenants::records::TenantUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgLessonTypesService {
    db: Db,
    repository: PgLessonTypesRepository,
}

impl PgLessonTypesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgLessonTypesRepository::new(),
        }
    }
}

#[async_trait]
impl LessonTypesService for PgLessonTypesService {
    #[tracing::instrument(
        name = "lesson_types.service.create_lesson_type",
        skip(self, lesson_type),
        fields(tenant_uuid = %tenant, lesson_type_uuid = %lesson_type.uuid),
        err
    )]
    async fn create_lesson_type(
        &self,
        tenant: TenantUuid,
        lesson_type: NewLessonType,
    ) -> Result<LessonTypeRecord, LessonTypesServiceError> {
        let price = i64::try_from(lesson_type.price)?;
        let duration = i32::try_from(lesson_type.duration_minutes)?;

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let record = self
            .repository
            .create_lesson_type(&mut tx, tenant, lesson_type, price, duration)
            .await?;

        tx.commit().await?;

        info!(lesson_type_uuid = %record.uuid, "created lesson type");

        Ok(record)
    }

    async fn list_lesson_types(
        &self,
        tenant: TenantUuid,
        active_only: bool,
    ) -> Result<Vec<LessonTypeRecord>, LessonTypesServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let lesson_types = self
            .repository
            .list_lesson_types(&mut tx, tenant, active_only)
            .await?;

        tx.commit().await?;

        Ok(lesson_types)
    }

    async fn get_lesson_type(
        &self,
        tenant: TenantUuid,
        lesson_type: LessonTypeUuid,
    ) -> Result<LessonTypeRecord, LessonTypesServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let record = self
            .repository
            .get_lesson_type(&mut tx, tenant, lesson_type)
            .await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "lesson_types.service.update_price",
        skip(self),
        fields(tenant_uuid = %tenant, lesson_type_uuid = %lesson_type),
        err
    )]
    async fn update_price(
        &self,
        tenant: TenantUuid,
        lesson_type: LessonTypeUuid,
        price: u64,
    ) -> Result<LessonTypeRecord, LessonTypesServiceError> {
        let price = i64::try_from(price)?;

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let record = self
            .repository
            .update_price(&mut tx, tenant, lesson_type, price)
            .await?;

        tx.commit().await?;

        info!(lesson_type_uuid = %lesson_type, price, "updated lesson type price");

        Ok(record)
    }

    #[tracing::instrument(
        name = "lesson_types.service.set_active",
        skip(self),
        fields(tenant_uuid = %tenant, lesson_type_uuid = %lesson_type),
        err
    )]
    async fn set_active(
        &self,
        tenant: TenantUuid,
        lesson_type: LessonTypeUuid,
        active: bool,
    ) -> Result<LessonTypeRecord, LessonTypesServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let record = self
            .repository
            .set_active(&mut tx, tenant, lesson_type, active)
            .await?;

        tx.commit().await?;

        Ok(record)
    }
}

#[automock]
#[async_trait]
pub trait LessonTypesService: Send + Sync {
    /// Creates a lesson type.
    async fn create_lesson_type(
        &self,
        tenant: TenantUuid,
        lesson_type: NewLessonType,
    ) -> Result<LessonTypeRecord, LessonTypesServiceError>;

    /// Lists lesson types by display order, then name.
    async fn list_lesson_types(
        &self,
        tenant: TenantUuid,
        active_only: bool,
    ) -> Result<Vec<LessonTypeRecord>, LessonTypesServiceError>;

    /// Retrieve a single lesson type.
    async fn get_lesson_type(
        &self,
        tenant: TenantUuid,
        lesson_type: LessonTypeUuid,
    ) -> Result<LessonTypeRecord, LessonTypesServiceError>;

    /// Change the price charged for future bookings.
    async fn update_price(
        &self,
        tenant: TenantUuid,
        lesson_type: LessonTypeUuid,
        price: u64,
    ) -> Result<LessonTypeRecord, LessonTypesServiceError>;

    /// Offer or withdraw a lesson type for new bookings.
    async fn set_active(
        &self,
        tenant: TenantUuid,
        lesson_type: LessonTypeUuid,
        active: bool,
    ) -> Result<LessonTypeRecord, LessonTypesServiceError>;
}
