//! Instructors service.

use async_trait::async_trait;
use mockall::automock;
use roster::limits::LimitKind;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        instructors::{
            data::NewInstructor,
            errors::InstructorsServiceError,
            records::{InstructorRecord, InstructorUuid},
            repository::PgInstructorsRepository,
        },
        tenants::records::{Tenant, TenantUuid},
    },
};

#[derive(Debug, Clone)]
pub struct PgInstructorsService {
    db: Db,
    repository: PgInstructorsRepository,
}

impl PgInstructorsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgInstructorsRepository::new(),
        }
    }
}

#[async_trait]
impl InstructorsService for PgInstructorsService {
    #[tracing::instrument(
        name = "instructors.service.create_instructor",
        skip(self, tenant, instructor),
        fields(tenant_uuid = %tenant.uuid(), instructor_uuid = %instructor.uuid),
        err
    )]
    async fn create_instructor(
        &self,
        tenant: &Tenant,
        instructor: NewInstructor,
    ) -> Result<InstructorRecord, InstructorsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant.uuid()).await?;

        let active = self
            .repository
            .count_active_instructors(&mut tx, tenant.uuid())
            .await?;

        if !tenant.limits().allows(LimitKind::Instructors, active) {
            return Err(InstructorsServiceError::LimitExceeded(
                LimitKind::Instructors,
            ));
        }

        let record = self
            .repository
            .create_instructor(&mut tx, tenant.uuid(), instructor)
            .await?;

        tx.commit().await?;

        info!(instructor_uuid = %record.uuid, "created instructor");

        Ok(record)
    }

    async fn list_instructors(
        &self,
        tenant: TenantUuid,
        active_only: bool,
    ) -> Result<Vec<InstructorRecord>, InstructorsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let instructors = self
            .repository
            .list_instructors(&mut tx, tenant, active_only)
            .await?;

        tx.commit().await?;

        Ok(instructors)
    }

    async fn get_instructor(
        &self,
        tenant: TenantUuid,
        instructor: InstructorUuid,
    ) -> Result<InstructorRecord, InstructorsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let record = self
            .repository
            .get_instructor(&mut tx, tenant, instructor)
            .await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "instructors.service.deactivate_instructor",
        skip(self),
        fields(tenant_uuid = %tenant, instructor_uuid = %instructor),
        err
    )]
    async fn deactivate_instructor(
        &self,
        tenant: TenantUuid,
        instructor: InstructorUuid,
    ) -> Result<InstructorRecord, InstructorsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let record = self
            .repository
            .deactivate_instructor(&mut tx, tenant, instructor)
            .await?;

        tx.commit().await?;

        info!(instructor_uuid = %instructor, "deactivated instructor");

        Ok(record)
    }
}

#[automock]
#[async_trait]
pub trait InstructorsService: Send + Sync {
    /// Creates an instructor, enforcing the plan's active instructor cap.
    async fn create_instructor(
        &self,
        tenant: &Tenant,
        instructor: NewInstructor,
    ) -> Result<InstructorRecord, InstructorsServiceError>;

    /// Lists instructors by name.
    async fn list_instructors(
        &self,
        tenant: TenantUuid,
        active_only: bool,
    ) -> Result<Vec<InstructorRecord>, InstructorsServiceError>;

    /// Retrieve a single instructor.
    async fn get_instructor(
        &self,
        tenant: TenantUuid,
        instructor: InstructorUuid,
    ) -> Result<InstructorRecord, InstructorsServiceError>;

    /// Stop an instructor taking new bookings. Existing lessons are untouched.
    async fn deactivate_instructor(
        &self,
        tenant: TenantUuid,
        instructor: InstructorUuid,
    ) -> Result<InstructorRecord, InstructorsServiceError>;
}
