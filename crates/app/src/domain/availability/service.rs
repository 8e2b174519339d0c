//! Availability service.

use async_trait::async_trait;
use jiff::{Timestamp, civil::Date};
use mockall::automock;
use roster::slots::{self, Slot};
use tracing::debug;

use crate::{
    database::Db,
    domain::{
        availability::{errors::AvailabilityServiceError, repository::PgAvailabilityRepository},
        instructors::{records::InstructorUuid, repository::PgInstructorsRepository},
        tenants::records::{Tenant, TenantUuid},
    },
};

#[derive(Debug, Clone)]
pub struct PgAvailabilityService {
    db: Db,
    repository: PgAvailabilityRepository,
    instructors: PgInstructorsRepository,
}

impl PgAvailabilityService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgAvailabilityRepository::new(),
            instructors: PgInstructorsRepository::new(),
        }
    }
}

#[async_trait]
impl AvailabilityService for PgAvailabilityService {
    #[tracing::instrument(
        name = "availability.service.list_slots",
        skip(self, tenant),
        fields(tenant_uuid = %tenant.uuid(), instructor_uuid = %instructor, date = %date),
        err
    )]
    async fn list_slots(
        &self,
        tenant: &Tenant,
        instructor: InstructorUuid,
        date: Date,
        duration_minutes: i64,
    ) -> Result<Vec<Slot>, AvailabilityServiceError> {
        let windows = slots::tile_business_day(
            date,
            tenant.settings.business_hours,
            &tenant.settings.timezone,
            duration_minutes,
        )?;

        let mut tx = self.db.begin_tenant_transaction(tenant.uuid()).await?;

        self.instructors
            .get_active_instructor(&mut tx, tenant.uuid(), instructor)
            .await?;

        let booked = match (windows.first(), windows.last()) {
            (Some(first), Some(last)) => {
                self.repository
                    .lessons_between(&mut tx, tenant.uuid(), instructor, first.start, last.start)
                    .await?
            }
            _ => Vec::new(),
        };

        tx.commit().await?;

        let slots = slots::mark_availability(&windows, &booked);

        debug!(
            slots = slots.len(),
            available = slots.iter().filter(|s| s.available).count(),
            "computed slots"
        );

        Ok(slots)
    }

    async fn is_available(
        &self,
        tenant: TenantUuid,
        instructor: InstructorUuid,
        at: Timestamp,
    ) -> Result<bool, AvailabilityServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        self.instructors
            .get_active_instructor(&mut tx, tenant, instructor)
            .await?;

        let statuses = self
            .repository
            .lesson_statuses_at(&mut tx, tenant, instructor, at)
            .await?;

        tx.commit().await?;

        Ok(!slots::is_blocked(statuses))
    }
}

#[automock]
#[async_trait]
pub trait AvailabilityService: Send + Sync {
    /// Tile the tenant's business hours on `date` into slots of `duration_minutes`, marking
    /// each one the instructor already holds a blocking lesson at as unavailable.
    async fn list_slots(
        &self,
        tenant: &Tenant,
        instructor: InstructorUuid,
        date: Date,
        duration_minutes: i64,
    ) -> Result<Vec<Slot>, AvailabilityServiceError>;

    /// Whether no blocking lesson holds the instructor at exactly `at`.
    ///
    /// Advisory only: the booking insert is what claims the slot.
    async fn is_available(
        &self,
        tenant: TenantUuid,
        instructor: InstructorUuid,
        at: Timestamp,
    ) -> Result<bool, AvailabilityServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::{civil::date, tz::TimeZone};
    use roster::{ErrorKind, deposits::DepositStatus};
    use testresult::TestResult;

    use crate::{
        domain::{deposits::DepositsService, lessons::BookingsService},
        test::{TestContext, helpers},
    };

    use super::*;

    fn utc(tenant: &Tenant) -> Tenant {
        let mut tenant = tenant.clone();
        tenant.settings.timezone = TimeZone::UTC;
        tenant
    }

    #[tokio::test]
    async fn empty_day_offers_ten_hourly_slots() -> TestResult {
        let ctx = TestContext::new().await;
        let tenant = utc(&ctx.tenant);
        let instructor = helpers::instructor(&ctx, &tenant, "Mia").await?;

        let slots = ctx
            .availability
            .list_slots(&tenant, instructor.uuid, date(2024, 6, 10), 60)
            .await?;

        assert_eq!(slots.len(), 10);
        assert!(slots.iter().all(|s| s.available));
        assert_eq!(
            slots.first().map(|s| s.start),
            Some("2024-06-10T08:00:00Z".parse::<Timestamp>()?)
        );
        assert_eq!(
            slots.last().map(|s| s.start),
            Some("2024-06-10T17:00:00Z".parse::<Timestamp>()?)
        );

        Ok(())
    }

    #[tokio::test]
    async fn slots_follow_tenant_time_zone() -> TestResult {
        let ctx = TestContext::new().await;
        let instructor = helpers::instructor(&ctx, &ctx.tenant, "Mia").await?;

        let slots = ctx
            .availability
            .list_slots(&ctx.tenant, instructor.uuid, date(2024, 6, 10), 60)
            .await?;

        // 08:00 AEST
        assert_eq!(
            slots.first().map(|s| s.start),
            Some("2024-06-09T22:00:00Z".parse::<Timestamp>()?)
        );

        Ok(())
    }

    #[tokio::test]
    async fn booked_slot_is_unavailable_and_listing_agrees_with_point_check() -> TestResult {
        let ctx = TestContext::new().await;
        let tenant = utc(&ctx.tenant);
        let fixture = helpers::booking_fixture(&ctx, &tenant).await?;
        let at: Timestamp = "2024-06-10T10:00:00Z".parse()?;

        ctx.bookings
            .create_booking(&tenant, fixture.booking(at), Timestamp::now())
            .await?;

        let slots = ctx
            .availability
            .list_slots(&tenant, fixture.instructor.uuid, date(2024, 6, 10), 60)
            .await?;

        assert_eq!(slots.iter().filter(|s| !s.available).count(), 1);

        for slot in &slots {
            let available = ctx
                .availability
                .is_available(tenant.uuid(), fixture.instructor.uuid, slot.start)
                .await?;

            assert_eq!(
                available, slot.available,
                "listing and point check disagree at {}",
                slot.start
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn cancelled_lesson_frees_the_slot() -> TestResult {
        let ctx = TestContext::new().await;
        let tenant = utc(&ctx.tenant);
        let fixture = helpers::booking_fixture(&ctx, &tenant).await?;
        let at: Timestamp = "2024-06-10T10:00:00Z".parse()?;

        let lesson = ctx
            .bookings
            .create_booking(&tenant, fixture.booking(at), Timestamp::now())
            .await?;

        ctx.bookings
            .cancel_lesson(&tenant, lesson.uuid, None, Timestamp::now())
            .await?;

        assert!(
            ctx.availability
                .is_available(tenant.uuid(), fixture.instructor.uuid, at)
                .await?
        );

        Ok(())
    }

    #[tokio::test]
    async fn completed_lesson_frees_the_slot_for_rebooking() -> TestResult {
        let ctx = TestContext::new().await;
        let tenant = utc(&ctx.tenant);
        let fixture = helpers::booking_fixture(&ctx, &tenant).await?;
        let at: Timestamp = "2024-06-10T10:00:00Z".parse()?;

        let lesson = ctx
            .bookings
            .create_booking(&tenant, fixture.booking(at), Timestamp::now())
            .await?;

        let deposit = helpers::deposit(&ctx, &tenant, &lesson).await?;

        ctx.deposits
            .update_status(
                tenant.uuid(),
                deposit.uuid,
                DepositStatus::Confirmed,
                Timestamp::now(),
            )
            .await?;

        ctx.bookings.start_lesson(tenant.uuid(), lesson.uuid).await?;
        ctx.bookings
            .complete_lesson(tenant.uuid(), lesson.uuid)
            .await?;

        let slots = ctx
            .availability
            .list_slots(&tenant, fixture.instructor.uuid, date(2024, 6, 10), 60)
            .await?;

        assert!(
            slots.iter().any(|s| s.start == at && s.available),
            "completed lesson should not block {at}"
        );
        assert!(
            ctx.availability
                .is_available(tenant.uuid(), fixture.instructor.uuid, at)
                .await?
        );

        let rebooked = ctx
            .bookings
            .create_booking(&tenant, fixture.booking(at), Timestamp::now())
            .await?;

        assert_eq!(rebooked.scheduled_at, at);

        Ok(())
    }

    #[tokio::test]
    async fn non_positive_duration_is_a_validation_error() -> TestResult {
        let ctx = TestContext::new().await;
        let instructor = helpers::instructor(&ctx, &ctx.tenant, "Mia").await?;

        let result = ctx
            .availability
            .list_slots(&ctx.tenant, instructor.uuid, date(2024, 6, 10), 0)
            .await;

        assert!(
            matches!(&result, Err(e) if e.kind() == ErrorKind::ValidationError),
            "expected ValidationError, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn other_tenants_instructor_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let other = ctx.create_tenant("other").await;
        let instructor = helpers::instructor(&ctx, &ctx.tenant, "Mia").await?;

        let result = ctx
            .availability
            .list_slots(&other, instructor.uuid, date(2024, 6, 10), 60)
            .await;

        assert!(
            matches!(result, Err(AvailabilityServiceError::NotFound)),
            "expected NotFound for cross-tenant access, got {result:?}"
        );

        let result = ctx
            .availability
            .is_available(other.uuid(), instructor.uuid, Timestamp::now())
            .await;

        assert!(
            matches!(result, Err(AvailabilityServiceError::NotFound)),
            "expected NotFound for cross-tenant access, got {result:?}"
        );

        Ok(())
    }
}
