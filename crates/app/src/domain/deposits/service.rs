//! Deposits service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use roster::{
    deposits::{DepositChange, DepositStatus, format_amount},
    lessons::LessonStatus,
};
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        deposits::{
            data::{DepositRow, NewDeposit},
            errors::DepositsServiceError,
            records::{DepositRecord, DepositUuid},
            repository::PgDepositsRepository,
        },
        lesson_types::repository::PgLessonTypesRepository,
        lessons::{
            events::EventSnapshots,
            records::{LessonRecord, LessonUuid},
            repository::PgLessonsRepository,
        },
        notifications::{BookingEvent, EventKind, Notifier},
        payments::{PaymentGateway, PaymentRequest, PaymentResult},
        tenants::records::{Tenant, TenantUuid},
    },
};

#[derive(Clone)]
pub struct PgDepositsService {
    db: Db,
    notifier: Notifier,
    gateway: Arc<dyn PaymentGateway>,
    repository: PgDepositsRepository,
    lessons: PgLessonsRepository,
    lesson_types: PgLessonTypesRepository,
    snapshots: EventSnapshots,
}

impl std::fmt::Debug for PgDepositsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgDepositsService")
            .field("db", &self.db)
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

impl PgDepositsService {
    #[must_use]
    pub fn new(db: Db, notifier: Notifier, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            db,
            notifier,
            gateway,
            repository: PgDepositsRepository::new(),
            lessons: PgLessonsRepository::new(),
            lesson_types: PgLessonTypesRepository::new(),
            snapshots: EventSnapshots::new(),
        }
    }

    /// Lock the lesson and check it is still waiting for its deposit.
    async fn lock_awaiting_lesson(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        tenant: TenantUuid,
        lesson: LessonUuid,
    ) -> Result<LessonRecord, DepositsServiceError> {
        let record = self.lessons.lock_lesson(tx, tenant, lesson).await?;

        if record.status != LessonStatus::PendingDeposit {
            return Err(DepositsServiceError::LessonNotAwaitingDeposit(record.status));
        }

        Ok(record)
    }

    /// Confirm the lesson a confirmed deposit belongs to. Status never regresses, so a lesson
    /// already confirmed or under way only has its deposit marked paid.
    async fn confirm_lesson(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        tenant: TenantUuid,
        lesson: LessonUuid,
    ) -> Result<LessonRecord, DepositsServiceError> {
        let current = self.lessons.lock_lesson(tx, tenant, lesson).await?;

        let status = current.status.confirm_by_deposit()?;

        Ok(self.lessons.confirm_deposit(tx, tenant, lesson, status).await?)
    }

    /// Event announcing a verified deposit, if the status warrants one.
    async fn verification_event(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        tenant: TenantUuid,
        status: DepositStatus,
        lesson: LessonRecord,
    ) -> Result<Option<BookingEvent>, DepositsServiceError> {
        let kind = match status {
            DepositStatus::Confirmed => EventKind::DepositConfirmed,
            DepositStatus::Failed => EventKind::DepositFailed,
            DepositStatus::Pending => return Ok(None),
        };

        Ok(Some(self.snapshots.event(tx, tenant, kind, lesson).await?))
    }
}

#[async_trait]
impl DepositsService for PgDepositsService {
    #[tracing::instrument(
        name = "deposits.service.create_deposit",
        skip(self, tenant, deposit),
        fields(tenant_uuid = %tenant.uuid(), lesson_uuid = %deposit.lesson_uuid),
        err
    )]
    async fn create_deposit(
        &self,
        tenant: &Tenant,
        deposit: NewDeposit,
    ) -> Result<DepositRecord, DepositsServiceError> {
        let tenant_uuid = tenant.uuid();
        let mut tx = self.db.begin_tenant_transaction(tenant_uuid).await?;

        let lesson = self
            .lock_awaiting_lesson(&mut tx, tenant_uuid, deposit.lesson_uuid)
            .await?;

        let lesson_type = self
            .lesson_types
            .get_lesson_type(&mut tx, tenant_uuid, lesson.lesson_type_uuid)
            .await?;

        let amount = tenant.settings.deposit_percentage.of(lesson_type.price);

        let record = self
            .repository
            .create_deposit(
                &mut tx,
                tenant_uuid,
                DepositRow {
                    uuid: deposit.uuid,
                    lesson_uuid: deposit.lesson_uuid,
                    amount: i64::try_from(amount)?,
                    currency: tenant.settings.currency.iso_alpha_code,
                    payment_reference: deposit.payment_reference,
                    transaction_id: None,
                    receipt: None,
                    status: DepositStatus::Pending,
                    verified_at: None,
                },
            )
            .await?;

        tx.commit().await?;

        info!(
            deposit_uuid = %record.uuid,
            amount = %format_amount(record.amount, tenant.settings.currency),
            "recorded deposit"
        );

        Ok(record)
    }

    #[tracing::instrument(
        name = "deposits.service.update_status",
        skip(self),
        fields(tenant_uuid = %tenant, deposit_uuid = %deposit, status = %status),
        err
    )]
    async fn update_status(
        &self,
        tenant: TenantUuid,
        deposit: DepositUuid,
        status: DepositStatus,
        now: Timestamp,
    ) -> Result<DepositRecord, DepositsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let current = self.repository.lock_deposit(&mut tx, tenant, deposit).await?;

        let DepositChange::Changed { from, to } = current.status.change_to(status)? else {
            tx.commit().await?;

            return Ok(current);
        };

        let lesson = if to == DepositStatus::Confirmed {
            self.confirm_lesson(&mut tx, tenant, current.lesson_uuid)
                .await?
        } else {
            self.lessons
                .get_lesson(&mut tx, tenant, current.lesson_uuid)
                .await?
        };

        let record = self
            .repository
            .set_status(&mut tx, tenant, deposit, to, Some(now))
            .await?;

        let event = self.verification_event(&mut tx, tenant, to, lesson).await?;

        tx.commit().await?;

        info!(deposit_uuid = %deposit, %from, %to, "deposit verified");

        if let Some(event) = event {
            self.notifier.notify(event);
        }

        Ok(record)
    }

    #[tracing::instrument(
        name = "deposits.service.record_payment",
        skip(self, tenant, reference),
        fields(tenant_uuid = %tenant.uuid(), lesson_uuid = %lesson),
        err
    )]
    async fn record_payment(
        &self,
        tenant: &Tenant,
        lesson: LessonUuid,
        reference: String,
        now: Timestamp,
    ) -> Result<DepositRecord, DepositsServiceError> {
        if !tenant.settings.online_payment_enabled {
            return Err(DepositsServiceError::OnlinePaymentsDisabled);
        }

        let tenant_uuid = tenant.uuid();

        // Price the deposit, then talk to the provider outside any transaction.
        let mut tx = self.db.begin_tenant_transaction(tenant_uuid).await?;

        let record = self
            .lock_awaiting_lesson(&mut tx, tenant_uuid, lesson)
            .await?;

        let lesson_type = self
            .lesson_types
            .get_lesson_type(&mut tx, tenant_uuid, record.lesson_type_uuid)
            .await?;

        tx.commit().await?;

        let amount = tenant.settings.deposit_percentage.of(lesson_type.price);

        let request = PaymentRequest {
            amount,
            currency: tenant.settings.currency.iso_alpha_code.to_string(),
            reference: reference.clone(),
            lesson_uuid: lesson,
        };

        let payment = match self.gateway.process(&request).await {
            Ok(payment) => payment,
            Err(error) => {
                warn!(%error, "payment gateway error; recording failed payment");

                PaymentResult::failed()
            }
        };

        let status = DepositStatus::from(payment.status);
        let verified_at = (status != DepositStatus::Pending).then_some(now);

        let mut tx = self.db.begin_tenant_transaction(tenant_uuid).await?;

        let current = self
            .lock_awaiting_lesson(&mut tx, tenant_uuid, lesson)
            .await?;

        let deposit = self
            .repository
            .create_deposit(
                &mut tx,
                tenant_uuid,
                DepositRow {
                    uuid: DepositUuid::new(),
                    lesson_uuid: lesson,
                    amount: i64::try_from(amount)?,
                    currency: tenant.settings.currency.iso_alpha_code,
                    payment_reference: Some(reference),
                    transaction_id: payment.transaction_id,
                    receipt: payment.receipt,
                    status,
                    verified_at,
                },
            )
            .await?;

        let current = if status == DepositStatus::Confirmed {
            self.confirm_lesson(&mut tx, tenant_uuid, lesson).await?
        } else {
            current
        };

        let event = self
            .verification_event(&mut tx, tenant_uuid, status, current)
            .await?;

        tx.commit().await?;

        info!(
            deposit_uuid = %deposit.uuid,
            status = %status,
            amount = %format_amount(amount, tenant.settings.currency),
            "recorded payment"
        );

        if let Some(event) = event {
            self.notifier.notify(event);
        }

        Ok(deposit)
    }

    async fn get_deposit(
        &self,
        tenant: TenantUuid,
        deposit: DepositUuid,
    ) -> Result<DepositRecord, DepositsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let record = self.repository.get_deposit(&mut tx, tenant, deposit).await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn deposit_for_lesson(
        &self,
        tenant: TenantUuid,
        lesson: LessonUuid,
    ) -> Result<DepositRecord, DepositsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let record = self
            .repository
            .get_lesson_deposit(&mut tx, tenant, lesson)
            .await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn pending_deposits(
        &self,
        tenant: TenantUuid,
    ) -> Result<Vec<DepositRecord>, DepositsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let deposits = self
            .repository
            .list_pending_deposits(&mut tx, tenant)
            .await?;

        tx.commit().await?;

        Ok(deposits)
    }
}

#[automock]
#[async_trait]
/// The deposit ledger.
pub trait DepositsService: Send + Sync {
    /// Record a pending deposit for a lesson awaiting one, priced from the lesson type's
    /// current price and the tenant's deposit percentage.
    async fn create_deposit(
        &self,
        tenant: &Tenant,
        deposit: NewDeposit,
    ) -> Result<DepositRecord, DepositsServiceError>;

    /// Apply a verification outcome. Confirming also confirms the lesson; re-applying the
    /// current status changes nothing and announces nothing.
    async fn update_status(
        &self,
        tenant: TenantUuid,
        deposit: DepositUuid,
        status: DepositStatus,
        now: Timestamp,
    ) -> Result<DepositRecord, DepositsServiceError>;

    /// Collect a lesson's deposit through the payment gateway and record the outcome.
    async fn record_payment(
        &self,
        tenant: &Tenant,
        lesson: LessonUuid,
        reference: String,
        now: Timestamp,
    ) -> Result<DepositRecord, DepositsServiceError>;

    /// Retrieve a single deposit.
    async fn get_deposit(
        &self,
        tenant: TenantUuid,
        deposit: DepositUuid,
    ) -> Result<DepositRecord, DepositsServiceError>;

    /// The deposit recorded for a lesson.
    async fn deposit_for_lesson(
        &self,
        tenant: TenantUuid,
        lesson: LessonUuid,
    ) -> Result<DepositRecord, DepositsServiceError>;

    /// Deposits awaiting verification, oldest first.
    async fn pending_deposits(
        &self,
        tenant: TenantUuid,
    ) -> Result<Vec<DepositRecord>, DepositsServiceError>;
}
