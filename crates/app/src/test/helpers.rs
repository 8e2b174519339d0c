//! Test Helpers

use async_trait::async_trait;
use jiff::Timestamp;
use testresult::TestResult;
use tokio::sync::mpsc;

use crate::{
    domain::{
        deposits::{
            DepositsService, DepositsServiceError,
            data::NewDeposit,
            records::{DepositRecord, DepositUuid},
        },
        instructors::{
            InstructorsService, InstructorsServiceError, data::NewInstructor,
            records::{InstructorRecord, InstructorUuid},
        },
        lesson_types::{
            LessonTypesService, LessonTypesServiceError, data::NewLessonType,
            records::{LessonTypeRecord, LessonTypeUuid},
        },
        lessons::{
            data::NewBooking,
            records::{LessonRecord, LessonUuid},
        },
        notifications::{BookingEvent, NotificationError, NotificationSink},
        students::{
            StudentsService, StudentsServiceError, data::NewStudent,
            records::{StudentRecord, StudentUuid},
        },
        tenants::records::Tenant,
    },
    test::TestContext,
};

/// Forwards every delivered event to a channel.
#[derive(Debug, Clone)]
pub(crate) struct ChannelSink(mpsc::UnboundedSender<BookingEvent>);

impl ChannelSink {
    pub(crate) fn new(sender: mpsc::UnboundedSender<BookingEvent>) -> Self {
        Self(sender)
    }
}

#[async_trait]
impl NotificationSink for ChannelSink {
    async fn deliver(&self, event: &BookingEvent) -> Result<(), NotificationError> {
        self.0
            .send(event.clone())
            .map_err(|_| NotificationError::Unavailable("receiver dropped".to_string()))
    }
}

pub(crate) async fn instructor(
    ctx: &TestContext,
    tenant: &Tenant,
    name: &str,
) -> Result<InstructorRecord, InstructorsServiceError> {
    ctx.instructors
        .create_instructor(
            tenant,
            NewInstructor {
                uuid: InstructorUuid::new(),
                name: name.to_string(),
                email: None,
                phone: None,
                max_hours_per_week: None,
            },
        )
        .await
}

pub(crate) async fn lesson_type(
    ctx: &TestContext,
    tenant: &Tenant,
    duration_minutes: u32,
    price: u64,
) -> Result<LessonTypeRecord, LessonTypesServiceError> {
    ctx.lesson_types
        .create_lesson_type(
            tenant.uuid(),
            NewLessonType {
                uuid: LessonTypeUuid::new(),
                name: format!("{duration_minutes} minute lesson"),
                description: None,
                duration_minutes,
                price,
                display_order: 0,
            },
        )
        .await
}

/// Register `phone` and complete its verification.
pub(crate) async fn verified_student(
    ctx: &TestContext,
    tenant: &Tenant,
    phone: &str,
) -> Result<StudentRecord, StudentsServiceError> {
    let now = Timestamp::now();

    let registration = ctx
        .students
        .register(
            tenant,
            NewStudent {
                uuid: StudentUuid::new(),
                phone: phone.to_string(),
                name: Some("Sam".to_string()),
            },
            now,
        )
        .await?;

    ctx.students
        .verify_otp(tenant.uuid(), phone, &registration.otp_code, now)
        .await
}

/// A verified student, an instructor and an hour-long lesson type priced at 100.00.
#[derive(Debug, Clone)]
pub(crate) struct BookingFixture {
    pub student: StudentRecord,
    pub instructor: InstructorRecord,
    pub lesson_type: LessonTypeRecord,
}

impl BookingFixture {
    pub(crate) fn booking(&self, scheduled_at: Timestamp) -> NewBooking {
        NewBooking {
            uuid: LessonUuid::new(),
            student_uuid: self.student.uuid,
            instructor_uuid: self.instructor.uuid,
            lesson_type_uuid: self.lesson_type.uuid,
            scheduled_at,
            notes: None,
        }
    }
}

pub(crate) async fn booking_fixture(
    ctx: &TestContext,
    tenant: &Tenant,
) -> TestResult<BookingFixture> {
    Ok(BookingFixture {
        student: verified_student(ctx, tenant, "0412345678").await?,
        instructor: instructor(ctx, tenant, "Mia").await?,
        lesson_type: lesson_type(ctx, tenant, 60, 100_00).await?,
    })
}

pub(crate) async fn deposit(
    ctx: &TestContext,
    tenant: &Tenant,
    lesson: &LessonRecord,
) -> Result<DepositRecord, DepositsServiceError> {
    ctx.deposits
        .create_deposit(
            tenant,
            NewDeposit {
                uuid: DepositUuid::new(),
                lesson_uuid: lesson.uuid,
                payment_reference: Some("REF-1".to_string()),
            },
        )
        .await
}
