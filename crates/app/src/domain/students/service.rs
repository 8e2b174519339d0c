//! Students service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use roster::{limits::LimitKind, phone::PhoneNumber};
use tracing::info;

use crate::{
    database::Db,
    domain::{
        students::{
            data::{NewStudent, StudentRegistration},
            errors::StudentsServiceError,
            otp,
            records::{StudentRecord, StudentUuid},
            repository::PgStudentsRepository,
        },
        tenants::records::{Tenant, TenantUuid},
    },
};

#[derive(Debug, Clone)]
pub struct PgStudentsService {
    db: Db,
    repository: PgStudentsRepository,
}

impl PgStudentsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgStudentsRepository::new(),
        }
    }
}

#[async_trait]
impl StudentsService for PgStudentsService {
    #[tracing::instrument(
        name = "students.service.register",
        skip(self, tenant, student),
        fields(tenant_uuid = %tenant.uuid(), student_uuid = tracing::field::Empty),
        err
    )]
    async fn register(
        &self,
        tenant: &Tenant,
        student: NewStudent,
        now: Timestamp,
    ) -> Result<StudentRegistration, StudentsServiceError> {
        let phone = PhoneNumber::parse(&student.phone)?;

        let mut tx = self.db.begin_tenant_transaction(tenant.uuid()).await?;

        let existing = self
            .repository
            .find_by_phone(&mut tx, tenant.uuid(), phone.as_str())
            .await?;

        let created = existing.is_none();

        let record = match existing {
            Some(record) => record,
            None => {
                let registered = self.repository.count_students(&mut tx, tenant.uuid()).await?;

                if !tenant.limits().allows(LimitKind::Students, registered) {
                    return Err(StudentsServiceError::LimitExceeded(LimitKind::Students));
                }

                self.repository
                    .create_student(
                        &mut tx,
                        tenant.uuid(),
                        NewStudent {
                            phone: phone.into_string(),
                            ..student
                        },
                    )
                    .await?
            }
        };

        tracing::Span::current().record("student_uuid", tracing::field::display(record.uuid));

        let otp_code = otp::generate_code();
        let otp_expires_at = now.checked_add(otp::OTP_TTL)?;

        let record = self
            .repository
            .issue_otp(&mut tx, tenant.uuid(), record.uuid, &otp_code, otp_expires_at)
            .await?;

        tx.commit().await?;

        info!(student_uuid = %record.uuid, created, "issued verification code");

        Ok(StudentRegistration {
            student: record,
            created,
            otp_code,
            otp_expires_at,
        })
    }

    #[tracing::instrument(
        name = "students.service.verify_otp",
        skip(self, code),
        fields(tenant_uuid = %tenant),
        err
    )]
    async fn verify_otp(
        &self,
        tenant: TenantUuid,
        phone: &str,
        code: &str,
        now: Timestamp,
    ) -> Result<StudentRecord, StudentsServiceError> {
        let phone = PhoneNumber::parse(phone)?;

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let pending = self
            .repository
            .lock_pending_otp(&mut tx, tenant, phone.as_str())
            .await?;

        if !otp::is_valid(pending.code.as_deref(), pending.expires_at, code, now) {
            return Err(StudentsServiceError::InvalidOtp);
        }

        let record = self
            .repository
            .mark_verified(&mut tx, tenant, pending.uuid)
            .await?;

        tx.commit().await?;

        info!(student_uuid = %record.uuid, "verified student phone");

        Ok(record)
    }

    async fn find_by_phone(
        &self,
        tenant: TenantUuid,
        phone: &str,
    ) -> Result<StudentRecord, StudentsServiceError> {
        let phone = PhoneNumber::parse(phone)?;

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let record = self
            .repository
            .find_by_phone(&mut tx, tenant, phone.as_str())
            .await?;

        tx.commit().await?;

        record.ok_or(StudentsServiceError::NotFound)
    }

    async fn get_student(
        &self,
        tenant: TenantUuid,
        student: StudentUuid,
    ) -> Result<StudentRecord, StudentsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let record = self.repository.get_student(&mut tx, tenant, student).await?;

        tx.commit().await?;

        Ok(record)
    }
}

#[automock]
#[async_trait]
pub trait StudentsService: Send + Sync {
    /// Register a phone number, creating the student on first attempt, and issue a fresh
    /// verification code.
    async fn register(
        &self,
        tenant: &Tenant,
        student: NewStudent,
        now: Timestamp,
    ) -> Result<StudentRegistration, StudentsServiceError>;

    /// Check a verification code, marking the student verified and clearing the code.
    async fn verify_otp(
        &self,
        tenant: TenantUuid,
        phone: &str,
        code: &str,
        now: Timestamp,
    ) -> Result<StudentRecord, StudentsServiceError>;

    /// Look up a student by phone number.
    async fn find_by_phone(
        &self,
        tenant: TenantUuid,
        phone: &str,
    ) -> Result<StudentRecord, StudentsServiceError>;

    /// Retrieve a single student.
    async fn get_student(
        &self,
        tenant: TenantUuid,
        student: StudentUuid,
    ) -> Result<StudentRecord, StudentsServiceError>;
}
