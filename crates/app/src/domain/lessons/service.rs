//! Bookings service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use roster::{
    cancellation::CancellationAdvisory,
    lessons::LessonStatus,
    limits::{self, LimitKind},
    slots,
};
use tracing::info;

use crate::{
    database::Db,
    domain::{
        availability::repository::PgAvailabilityRepository,
        deposits::repository::PgDepositsRepository,
        instructors::{records::InstructorUuid, repository::PgInstructorsRepository},
        lesson_types::repository::PgLessonTypesRepository,
        lessons::{
            data::{BookingFilter, CancelledLesson, DashboardCounts, NewBooking},
            errors::BookingsServiceError,
            events::EventSnapshots,
            records::{LessonRecord, LessonUuid},
            repository::PgLessonsRepository,
        },
        notifications::{EventKind, Notifier},
        students::{records::StudentUuid, repository::PgStudentsRepository},
        tenants::records::{Tenant, TenantUuid},
    },
};

#[derive(Debug, Clone)]
pub struct PgBookingsService {
    db: Db,
    notifier: Notifier,
    repository: PgLessonsRepository,
    availability: PgAvailabilityRepository,
    students: PgStudentsRepository,
    instructors: PgInstructorsRepository,
    lesson_types: PgLessonTypesRepository,
    deposits: PgDepositsRepository,
    snapshots: EventSnapshots,
}

impl PgBookingsService {
    #[must_use]
    pub fn new(db: Db, notifier: Notifier) -> Self {
        Self {
            db,
            notifier,
            repository: PgLessonsRepository::new(),
            availability: PgAvailabilityRepository::new(),
            students: PgStudentsRepository::new(),
            instructors: PgInstructorsRepository::new(),
            lesson_types: PgLessonTypesRepository::new(),
            deposits: PgDepositsRepository::new(),
            snapshots: EventSnapshots::new(),
        }
    }

    /// Move a lesson along the status graph, holding its row lock for the check.
    async fn transition(
        &self,
        tenant: TenantUuid,
        lesson: LessonUuid,
        next: LessonStatus,
    ) -> Result<LessonRecord, BookingsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let current = self.repository.lock_lesson(&mut tx, tenant, lesson).await?;

        let status = current.status.transition(next)?;

        let record = self
            .repository
            .set_status(&mut tx, tenant, lesson, status)
            .await?;

        tx.commit().await?;

        info!(lesson_uuid = %lesson, from = %current.status, to = %status, "lesson status changed");

        Ok(record)
    }
}

#[async_trait]
impl BookingsService for PgBookingsService {
    #[tracing::instrument(
        name = "bookings.service.create_booking",
        skip(self, tenant, booking),
        fields(
            tenant_uuid = %tenant.uuid(),
            lesson_uuid = %booking.uuid,
            instructor_uuid = %booking.instructor_uuid,
            scheduled_at = %booking.scheduled_at
        ),
        err
    )]
    async fn create_booking(
        &self,
        tenant: &Tenant,
        booking: NewBooking,
        now: Timestamp,
    ) -> Result<LessonRecord, BookingsServiceError> {
        let tenant_uuid = tenant.uuid();
        let mut tx = self.db.begin_tenant_transaction(tenant_uuid).await?;

        let student = self
            .students
            .get_student(&mut tx, tenant_uuid, booking.student_uuid)
            .await?;

        if !student.otp_verified {
            return Err(BookingsServiceError::Unverified);
        }

        self.instructors
            .get_active_instructor(&mut tx, tenant_uuid, booking.instructor_uuid)
            .await?;

        self.lesson_types
            .get_active_lesson_type(&mut tx, tenant_uuid, booking.lesson_type_uuid)
            .await?;

        let since = limits::month_start(now, &tenant.settings.timezone)?;
        let this_month = self
            .repository
            .count_created_since(&mut tx, tenant_uuid, since)
            .await?;

        if !tenant.limits().allows(LimitKind::MonthlyBookings, this_month) {
            return Err(BookingsServiceError::LimitExceeded(
                LimitKind::MonthlyBookings,
            ));
        }

        let statuses = self
            .availability
            .lesson_statuses_at(
                &mut tx,
                tenant_uuid,
                booking.instructor_uuid,
                booking.scheduled_at,
            )
            .await?;

        if slots::is_blocked(statuses) {
            return Err(BookingsServiceError::SlotConflict);
        }

        // The active slot index settles races the check above cannot see.
        let record = self
            .repository
            .create_lesson(&mut tx, tenant_uuid, booking)
            .await?;

        let event = self
            .snapshots
            .event(&mut tx, tenant_uuid, EventKind::BookingCreated, record.clone())
            .await?;

        tx.commit().await?;

        info!(lesson_uuid = %record.uuid, "created booking");

        self.notifier.notify(event);

        Ok(record)
    }

    #[tracing::instrument(
        name = "bookings.service.cancel_lesson",
        skip(self, tenant, reason),
        fields(tenant_uuid = %tenant.uuid(), lesson_uuid = %lesson),
        err
    )]
    async fn cancel_lesson(
        &self,
        tenant: &Tenant,
        lesson: LessonUuid,
        reason: Option<String>,
        now: Timestamp,
    ) -> Result<CancelledLesson, BookingsServiceError> {
        let tenant_uuid = tenant.uuid();
        let mut tx = self.db.begin_tenant_transaction(tenant_uuid).await?;

        let current = self.repository.lock_lesson(&mut tx, tenant_uuid, lesson).await?;

        current.status.transition(LessonStatus::Cancelled)?;

        let advisory = CancellationAdvisory::assess(
            current.scheduled_at,
            now,
            tenant.settings.cancellation_hours,
        );

        let annotation = advisory.annotation(now, reason.as_deref());

        let record = self
            .repository
            .cancel_lesson(&mut tx, tenant_uuid, lesson, &annotation)
            .await?;

        let event = self
            .snapshots
            .event(&mut tx, tenant_uuid, EventKind::LessonCancelled, record.clone())
            .await?;

        tx.commit().await?;

        info!(lesson_uuid = %lesson, late = advisory.late, "cancelled lesson");

        self.notifier.notify(event);

        Ok(CancelledLesson {
            lesson: record,
            advisory,
        })
    }

    #[tracing::instrument(
        name = "bookings.service.start_lesson",
        skip(self),
        fields(tenant_uuid = %tenant, lesson_uuid = %lesson),
        err
    )]
    async fn start_lesson(
        &self,
        tenant: TenantUuid,
        lesson: LessonUuid,
    ) -> Result<LessonRecord, BookingsServiceError> {
        self.transition(tenant, lesson, LessonStatus::InProgress)
            .await
    }

    #[tracing::instrument(
        name = "bookings.service.complete_lesson",
        skip(self),
        fields(tenant_uuid = %tenant, lesson_uuid = %lesson),
        err
    )]
    async fn complete_lesson(
        &self,
        tenant: TenantUuid,
        lesson: LessonUuid,
    ) -> Result<LessonRecord, BookingsServiceError> {
        self.transition(tenant, lesson, LessonStatus::Completed)
            .await
    }

    #[tracing::instrument(
        name = "bookings.service.reschedule_lesson",
        skip(self),
        fields(tenant_uuid = %tenant, lesson_uuid = %lesson, scheduled_at = %scheduled_at),
        err
    )]
    async fn reschedule_lesson(
        &self,
        tenant: TenantUuid,
        lesson: LessonUuid,
        scheduled_at: Timestamp,
    ) -> Result<LessonRecord, BookingsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let current = self.repository.lock_lesson(&mut tx, tenant, lesson).await?;

        if !current.status.is_reschedulable() {
            return Err(BookingsServiceError::NotReschedulable(current.status));
        }

        if current.scheduled_at == scheduled_at {
            tx.commit().await?;

            return Ok(current);
        }

        let statuses = self
            .availability
            .lesson_statuses_at(&mut tx, tenant, current.instructor_uuid, scheduled_at)
            .await?;

        if slots::is_blocked(statuses) {
            return Err(BookingsServiceError::SlotConflict);
        }

        let record = self
            .repository
            .reschedule_lesson(&mut tx, tenant, lesson, scheduled_at)
            .await?;

        let event = self
            .snapshots
            .event(&mut tx, tenant, EventKind::LessonRescheduled, record.clone())
            .await?;

        tx.commit().await?;

        info!(
            lesson_uuid = %lesson,
            from = %current.scheduled_at,
            to = %scheduled_at,
            "rescheduled lesson"
        );

        self.notifier.notify(event);

        Ok(record)
    }

    async fn get_lesson(
        &self,
        tenant: TenantUuid,
        lesson: LessonUuid,
    ) -> Result<LessonRecord, BookingsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let record = self.repository.get_lesson(&mut tx, tenant, lesson).await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn student_lessons(
        &self,
        tenant: TenantUuid,
        student: StudentUuid,
        limit: u32,
    ) -> Result<Vec<LessonRecord>, BookingsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let lessons = self
            .repository
            .student_lessons(&mut tx, tenant, student, limit)
            .await?;

        tx.commit().await?;

        Ok(lessons)
    }

    async fn instructor_schedule(
        &self,
        tenant: TenantUuid,
        instructor: InstructorUuid,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<LessonRecord>, BookingsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let lessons = self
            .repository
            .instructor_schedule(&mut tx, tenant, instructor, from, to)
            .await?;

        tx.commit().await?;

        Ok(lessons)
    }

    async fn list_bookings(
        &self,
        tenant: TenantUuid,
        filter: BookingFilter,
    ) -> Result<Vec<LessonRecord>, BookingsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let lessons = self.repository.list_lessons(&mut tx, tenant, filter).await?;

        tx.commit().await?;

        Ok(lessons)
    }

    async fn dashboard(
        &self,
        tenant: &Tenant,
        now: Timestamp,
    ) -> Result<DashboardCounts, BookingsServiceError> {
        let tz = &tenant.settings.timezone;
        let today = now.to_zoned(tz.clone()).date();
        let (day_start, day_end) = slots::day_bounds(today, tz)?;
        let month_start = limits::month_start(now, tz)?;

        let mut tx = self.db.begin_tenant_transaction(tenant.uuid()).await?;

        let lessons_today = self
            .repository
            .count_scheduled_between(&mut tx, tenant.uuid(), day_start, day_end)
            .await?;

        let pending_deposits = self
            .deposits
            .count_pending_deposits(&mut tx, tenant.uuid())
            .await?;

        let monthly_bookings = self
            .repository
            .count_created_since(&mut tx, tenant.uuid(), month_start)
            .await?;

        tx.commit().await?;

        Ok(DashboardCounts {
            lessons_today,
            pending_deposits,
            monthly_bookings,
        })
    }
}

#[automock]
#[async_trait]
/// The booking lifecycle.
pub trait BookingsService: Send + Sync {
    /// Book a lesson for a verified student, claiming the instructor's slot.
    ///
    /// `now` anchors the monthly booking window.
    async fn create_booking(
        &self,
        tenant: &Tenant,
        booking: NewBooking,
        now: Timestamp,
    ) -> Result<LessonRecord, BookingsServiceError>;

    /// Cancel a lesson that is neither completed nor already cancelled, annotating late notice.
    async fn cancel_lesson(
        &self,
        tenant: &Tenant,
        lesson: LessonUuid,
        reason: Option<String>,
        now: Timestamp,
    ) -> Result<CancelledLesson, BookingsServiceError>;

    /// Mark a confirmed lesson as under way.
    async fn start_lesson(
        &self,
        tenant: TenantUuid,
        lesson: LessonUuid,
    ) -> Result<LessonRecord, BookingsServiceError>;

    /// Mark a lesson under way as delivered.
    async fn complete_lesson(
        &self,
        tenant: TenantUuid,
        lesson: LessonUuid,
    ) -> Result<LessonRecord, BookingsServiceError>;

    /// Move a pending or confirmed lesson to another start time with the same instructor.
    async fn reschedule_lesson(
        &self,
        tenant: TenantUuid,
        lesson: LessonUuid,
        scheduled_at: Timestamp,
    ) -> Result<LessonRecord, BookingsServiceError>;

    /// Retrieve a single lesson.
    async fn get_lesson(
        &self,
        tenant: TenantUuid,
        lesson: LessonUuid,
    ) -> Result<LessonRecord, BookingsServiceError>;

    /// A student's lessons, most recent first.
    async fn student_lessons(
        &self,
        tenant: TenantUuid,
        student: StudentUuid,
        limit: u32,
    ) -> Result<Vec<LessonRecord>, BookingsServiceError>;

    /// An instructor's non-cancelled lessons starting within `[from, to)`.
    async fn instructor_schedule(
        &self,
        tenant: TenantUuid,
        instructor: InstructorUuid,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<LessonRecord>, BookingsServiceError>;

    /// Lessons matching `filter`, by scheduled time.
    async fn list_bookings(
        &self,
        tenant: TenantUuid,
        filter: BookingFilter,
    ) -> Result<Vec<LessonRecord>, BookingsServiceError>;

    /// Counts for today and this month in the tenant's time zone.
    async fn dashboard(
        &self,
        tenant: &Tenant,
        now: Timestamp,
    ) -> Result<DashboardCounts, BookingsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, ToSpan};
    use roster::{ErrorKind, limits::PlanLimits};
    use testresult::TestResult;

    use crate::{
        domain::{
            deposits::DepositsService,
            instructors::InstructorsService,
            lessons::data::DEFAULT_PAGE_SIZE,
            students::{StudentsService, data::NewStudent},
        },
        test::{TestContext, helpers},
    };

    use super::*;

    fn at(raw: &str) -> Timestamp {
        raw.parse().expect("valid timestamp")
    }

    /// Book a lesson and confirm its deposit.
    async fn confirmed_lesson(
        ctx: &TestContext,
        fixture: &helpers::BookingFixture,
        scheduled_at: Timestamp,
    ) -> TestResult<LessonRecord> {
        let lesson = ctx
            .bookings
            .create_booking(&ctx.tenant, fixture.booking(scheduled_at), Timestamp::now())
            .await?;

        let deposit = helpers::deposit(ctx, &ctx.tenant, &lesson).await?;

        ctx.deposits
            .update_status(
                ctx.tenant_uuid,
                deposit.uuid,
                roster::deposits::DepositStatus::Confirmed,
                Timestamp::now(),
            )
            .await?;

        Ok(ctx.bookings.get_lesson(ctx.tenant_uuid, lesson.uuid).await?)
    }

    #[tokio::test]
    async fn create_booking_starts_pending_and_announces_it() -> TestResult {
        let ctx = TestContext::new().await;
        let fixture = helpers::booking_fixture(&ctx, &ctx.tenant).await?;

        let lesson = ctx
            .bookings
            .create_booking(
                &ctx.tenant,
                fixture.booking(at("2024-06-10T00:00:00Z")),
                Timestamp::now(),
            )
            .await?;

        assert_eq!(lesson.status, LessonStatus::PendingDeposit);
        assert!(!lesson.deposit_paid);
        assert_eq!(lesson.instructor_uuid, fixture.instructor.uuid);

        let event = ctx.next_event().await.ok_or("no event delivered")?;

        assert_eq!(event.kind, EventKind::BookingCreated);
        assert_eq!(event.lesson, lesson);
        assert_eq!(event.student.uuid, fixture.student.uuid);
        assert_eq!(event.instructor.name, "Mia");
        assert_eq!(event.lesson_type.price, 100_00);

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_bookings_for_one_slot_yield_one_conflict() -> TestResult {
        let ctx = TestContext::new().await;
        let fixture = helpers::booking_fixture(&ctx, &ctx.tenant).await?;
        let slot = at("2024-06-10T00:00:00Z");
        let now = Timestamp::now();

        let (first, second) = tokio::join!(
            ctx.bookings
                .create_booking(&ctx.tenant, fixture.booking(slot), now),
            ctx.bookings
                .create_booking(&ctx.tenant, fixture.booking(slot), now),
        );

        let results = [first, second];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(BookingsServiceError::SlotConflict))),
            "expected one SlotConflict, got {results:?}"
        );

        let booked = ctx
            .bookings
            .instructor_schedule(
                ctx.tenant_uuid,
                fixture.instructor.uuid,
                slot,
                slot.checked_add(SignedDuration::from_hours(1))?,
            )
            .await?;

        assert_eq!(booked.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn unverified_student_cannot_book() -> TestResult {
        let ctx = TestContext::new().await;
        let fixture = helpers::booking_fixture(&ctx, &ctx.tenant).await?;

        let registration = ctx
            .students
            .register(
                &ctx.tenant,
                NewStudent {
                    uuid: StudentUuid::new(),
                    phone: "0498765432".to_string(),
                    name: None,
                },
                Timestamp::now(),
            )
            .await?;

        let result = ctx
            .bookings
            .create_booking(
                &ctx.tenant,
                NewBooking {
                    student_uuid: registration.student.uuid,
                    ..fixture.booking(at("2024-06-10T00:00:00Z"))
                },
                Timestamp::now(),
            )
            .await;

        assert!(
            matches!(&result, Err(e) if e.kind() == ErrorKind::Unverified),
            "expected Unverified, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn inactive_instructor_takes_no_bookings() -> TestResult {
        let ctx = TestContext::new().await;
        let fixture = helpers::booking_fixture(&ctx, &ctx.tenant).await?;

        ctx.instructors
            .deactivate_instructor(ctx.tenant_uuid, fixture.instructor.uuid)
            .await?;

        let result = ctx
            .bookings
            .create_booking(
                &ctx.tenant,
                fixture.booking(at("2024-06-10T00:00:00Z")),
                Timestamp::now(),
            )
            .await;

        assert!(
            matches!(result, Err(BookingsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn monthly_booking_cap_is_enforced() -> TestResult {
        let ctx = TestContext::new().await;

        let tenant = ctx
            .create_tenant_with_limits(
                "capped",
                PlanLimits {
                    max_monthly_bookings: Some(1),
                    ..PlanLimits::default()
                },
            )
            .await;

        let fixture = helpers::booking_fixture(&ctx, &tenant).await?;

        ctx.bookings
            .create_booking(
                &tenant,
                fixture.booking(at("2024-06-10T00:00:00Z")),
                Timestamp::now(),
            )
            .await?;

        let result = ctx
            .bookings
            .create_booking(
                &tenant,
                fixture.booking(at("2024-06-10T01:00:00Z")),
                Timestamp::now(),
            )
            .await;

        assert!(
            matches!(&result, Err(e) if e.kind() == ErrorKind::LimitExceeded),
            "expected LimitExceeded, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn late_cancellation_is_annotated_but_allowed() -> TestResult {
        let ctx = TestContext::new().await;
        let fixture = helpers::booking_fixture(&ctx, &ctx.tenant).await?;
        let now = Timestamp::now();
        let scheduled_at = now.checked_add(2.hours())?;

        let lesson = ctx
            .bookings
            .create_booking(&ctx.tenant, fixture.booking(scheduled_at), now)
            .await?;

        let cancelled = ctx
            .bookings
            .cancel_lesson(&ctx.tenant, lesson.uuid, Some("Car trouble".to_string()), now)
            .await?;

        assert_eq!(cancelled.lesson.status, LessonStatus::Cancelled);
        assert!(cancelled.advisory.late);
        assert!(
            cancelled
                .lesson
                .notes
                .contains("(Late cancellation - less than 24h notice) Reason: Car trouble"),
            "unexpected notes {:?}",
            cancelled.lesson.notes
        );

        ctx.next_event().await.ok_or("no booking event")?;

        let event = ctx.next_event().await.ok_or("no cancellation event")?;

        assert_eq!(event.kind, EventKind::LessonCancelled);

        Ok(())
    }

    #[tokio::test]
    async fn timely_cancellation_has_no_late_notice() -> TestResult {
        let ctx = TestContext::new().await;
        let fixture = helpers::booking_fixture(&ctx, &ctx.tenant).await?;
        let now = Timestamp::now();

        let lesson = ctx
            .bookings
            .create_booking(&ctx.tenant, fixture.booking(now.checked_add(72.hours())?), now)
            .await?;

        let cancelled = ctx
            .bookings
            .cancel_lesson(&ctx.tenant, lesson.uuid, None, now)
            .await?;

        assert!(!cancelled.advisory.late);
        assert!(!cancelled.lesson.notes.contains("Late cancellation"));
        assert!(cancelled.lesson.notes.contains("[Cancelled: "));

        Ok(())
    }

    #[tokio::test]
    async fn cancelled_slot_can_be_booked_again() -> TestResult {
        let ctx = TestContext::new().await;
        let fixture = helpers::booking_fixture(&ctx, &ctx.tenant).await?;
        let slot = at("2024-06-10T00:00:00Z");

        let first = ctx
            .bookings
            .create_booking(&ctx.tenant, fixture.booking(slot), Timestamp::now())
            .await?;

        ctx.bookings
            .cancel_lesson(&ctx.tenant, first.uuid, None, Timestamp::now())
            .await?;

        let second = ctx
            .bookings
            .create_booking(&ctx.tenant, fixture.booking(slot), Timestamp::now())
            .await?;

        assert_ne!(first.uuid, second.uuid);

        let again = ctx
            .bookings
            .cancel_lesson(&ctx.tenant, first.uuid, None, Timestamp::now())
            .await;

        assert!(
            matches!(&again, Err(e) if e.kind() == ErrorKind::InvalidTransition),
            "expected InvalidTransition, got {again:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn lesson_runs_through_to_completion_and_stays_completed() -> TestResult {
        let ctx = TestContext::new().await;
        let fixture = helpers::booking_fixture(&ctx, &ctx.tenant).await?;

        let lesson = confirmed_lesson(&ctx, &fixture, at("2024-06-10T00:00:00Z")).await?;

        assert_eq!(lesson.status, LessonStatus::Confirmed);
        assert!(lesson.deposit_paid);

        let started = ctx.bookings.start_lesson(ctx.tenant_uuid, lesson.uuid).await?;

        assert_eq!(started.status, LessonStatus::InProgress);

        let completed = ctx
            .bookings
            .complete_lesson(ctx.tenant_uuid, lesson.uuid)
            .await?;

        assert_eq!(completed.status, LessonStatus::Completed);

        let result = ctx
            .bookings
            .cancel_lesson(&ctx.tenant, lesson.uuid, None, Timestamp::now())
            .await;

        assert!(
            matches!(&result, Err(e) if e.kind() == ErrorKind::InvalidTransition),
            "expected InvalidTransition, got {result:?}"
        );

        let unchanged = ctx.bookings.get_lesson(ctx.tenant_uuid, lesson.uuid).await?;

        assert_eq!(unchanged.status, LessonStatus::Completed);
        assert_eq!(unchanged.notes, "");

        Ok(())
    }

    #[tokio::test]
    async fn pending_lesson_cannot_start() -> TestResult {
        let ctx = TestContext::new().await;
        let fixture = helpers::booking_fixture(&ctx, &ctx.tenant).await?;

        let lesson = ctx
            .bookings
            .create_booking(
                &ctx.tenant,
                fixture.booking(at("2024-06-10T00:00:00Z")),
                Timestamp::now(),
            )
            .await?;

        let result = ctx.bookings.start_lesson(ctx.tenant_uuid, lesson.uuid).await;

        assert!(
            matches!(&result, Err(e) if e.kind() == ErrorKind::InvalidTransition),
            "expected InvalidTransition, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn reschedule_claims_the_new_slot_and_frees_the_old() -> TestResult {
        let ctx = TestContext::new().await;
        let fixture = helpers::booking_fixture(&ctx, &ctx.tenant).await?;
        let ten = at("2024-06-10T00:00:00Z");
        let eleven = at("2024-06-10T01:00:00Z");
        let noon = at("2024-06-10T02:00:00Z");

        let lesson = ctx
            .bookings
            .create_booking(&ctx.tenant, fixture.booking(ten), Timestamp::now())
            .await?;

        ctx.bookings
            .create_booking(&ctx.tenant, fixture.booking(noon), Timestamp::now())
            .await?;

        let moved = ctx
            .bookings
            .reschedule_lesson(ctx.tenant_uuid, lesson.uuid, eleven)
            .await?;

        assert_eq!(moved.scheduled_at, eleven);

        let conflict = ctx
            .bookings
            .reschedule_lesson(ctx.tenant_uuid, lesson.uuid, noon)
            .await;

        assert!(
            matches!(conflict, Err(BookingsServiceError::SlotConflict)),
            "expected SlotConflict, got {conflict:?}"
        );

        ctx.bookings
            .create_booking(&ctx.tenant, fixture.booking(ten), Timestamp::now())
            .await?;

        Ok(())
    }

    #[tokio::test]
    async fn lessons_under_way_cannot_be_rescheduled() -> TestResult {
        let ctx = TestContext::new().await;
        let fixture = helpers::booking_fixture(&ctx, &ctx.tenant).await?;

        let lesson = confirmed_lesson(&ctx, &fixture, at("2024-06-10T00:00:00Z")).await?;

        ctx.bookings.start_lesson(ctx.tenant_uuid, lesson.uuid).await?;

        let result = ctx
            .bookings
            .reschedule_lesson(ctx.tenant_uuid, lesson.uuid, at("2024-06-11T00:00:00Z"))
            .await;

        assert!(
            matches!(result, Err(BookingsServiceError::NotReschedulable(LessonStatus::InProgress))),
            "expected NotReschedulable, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_bookings_filters_by_status_and_student() -> TestResult {
        let ctx = TestContext::new().await;
        let fixture = helpers::booking_fixture(&ctx, &ctx.tenant).await?;

        let kept = ctx
            .bookings
            .create_booking(
                &ctx.tenant,
                fixture.booking(at("2024-06-10T00:00:00Z")),
                Timestamp::now(),
            )
            .await?;

        let dropped = ctx
            .bookings
            .create_booking(
                &ctx.tenant,
                fixture.booking(at("2024-06-10T01:00:00Z")),
                Timestamp::now(),
            )
            .await?;

        ctx.bookings
            .cancel_lesson(&ctx.tenant, dropped.uuid, None, Timestamp::now())
            .await?;

        let pending = ctx
            .bookings
            .list_bookings(
                ctx.tenant_uuid,
                BookingFilter {
                    status: Some(LessonStatus::PendingDeposit),
                    student_uuid: Some(fixture.student.uuid),
                    ..BookingFilter::default()
                },
            )
            .await?;

        assert_eq!(pending.iter().map(|l| l.uuid).collect::<Vec<_>>(), [kept.uuid]);

        let everything = ctx
            .bookings
            .student_lessons(ctx.tenant_uuid, fixture.student.uuid, DEFAULT_PAGE_SIZE)
            .await?;

        // Most recent first
        assert_eq!(
            everything.iter().map(|l| l.uuid).collect::<Vec<_>>(),
            [dropped.uuid, kept.uuid]
        );

        Ok(())
    }

    #[tokio::test]
    async fn dashboard_counts_today_pending_and_month() -> TestResult {
        let ctx = TestContext::new().await;
        let fixture = helpers::booking_fixture(&ctx, &ctx.tenant).await?;
        let now = Timestamp::now();

        let today = ctx
            .bookings
            .create_booking(&ctx.tenant, fixture.booking(now), now)
            .await?;

        ctx.bookings
            .create_booking(&ctx.tenant, fixture.booking(now.checked_add(72.hours())?), now)
            .await?;

        helpers::deposit(&ctx, &ctx.tenant, &today).await?;

        let counts = ctx.bookings.dashboard(&ctx.tenant, now).await?;

        assert_eq!(counts.lessons_today, 1);
        assert_eq!(counts.pending_deposits, 1);
        assert_eq!(counts.monthly_bookings, 2);

        Ok(())
    }

    #[tokio::test]
    async fn lessons_are_invisible_to_other_tenants() -> TestResult {
        let ctx = TestContext::new().await;
        let other = ctx.create_tenant("other").await;
        let fixture = helpers::booking_fixture(&ctx, &ctx.tenant).await?;

        let lesson = ctx
            .bookings
            .create_booking(
                &ctx.tenant,
                fixture.booking(at("2024-06-10T00:00:00Z")),
                Timestamp::now(),
            )
            .await?;

        let read = ctx.bookings.get_lesson(other.uuid(), lesson.uuid).await;

        assert!(
            matches!(read, Err(BookingsServiceError::NotFound)),
            "expected NotFound for cross-tenant read, got {read:?}"
        );

        let cancel = ctx
            .bookings
            .cancel_lesson(&other, lesson.uuid, None, Timestamp::now())
            .await;

        assert!(
            matches!(cancel, Err(BookingsServiceError::NotFound)),
            "expected NotFound for cross-tenant cancel, got {cancel:?}"
        );

        // Another tenant's student, instructor and lesson type cannot be combined into a booking
        let result = ctx
            .bookings
            .create_booking(
                &other,
                fixture.booking(at("2024-06-10T00:00:00Z")),
                Timestamp::now(),
            )
            .await;

        assert!(
            matches!(result, Err(BookingsServiceError::NotFound)),
            "expected NotFound for cross-tenant booking, got {result:?}"
        );

        let unchanged = ctx.bookings.get_lesson(ctx.tenant_uuid, lesson.uuid).await?;

        assert_eq!(unchanged.status, LessonStatus::PendingDeposit);

        Ok(())
    }
}
