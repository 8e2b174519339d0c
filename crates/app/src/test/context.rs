//! Test context for service-level integration tests.

use std::{sync::Arc, time::Duration};

use roster::limits::PlanLimits;
use sqlx::{Connection, PgConnection, PgPool, query};
use tokio::{
    sync::{Mutex, mpsc},
    time::timeout,
};

use crate::{
    database::Db,
    domain::{
        availability::PgAvailabilityService,
        deposits::PgDepositsService,
        instructors::PgInstructorsService,
        lesson_types::PgLessonTypesService,
        lessons::PgBookingsService,
        notifications::{BookingEvent, NotificationSink, Notifier},
        payments::{ManualTransferGateway, PaymentGateway},
        students::PgStudentsService,
        tenants::{
            PgTenantsService, TenantsService,
            data::NewTenant,
            records::{Tenant, TenantUuid},
        },
    },
};

use super::{db::TestDb, helpers::ChannelSink};

/// Non-superuser role the services connect as, so row-level security applies.
const APP_ROLE: &str = "roster_app_test";
const APP_ROLE_PASSWORD: &str = "roster_app_test_pass";

/// How long to wait for an event that should arrive.
const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait before concluding no event is coming.
const QUIET_PERIOD: Duration = Duration::from_millis(250);

pub struct TestContext {
    pub db: TestDb,

    /// The `acme` tenant with default settings.
    pub tenant: Tenant,
    pub tenant_uuid: TenantUuid,

    pub tenants: PgTenantsService,
    pub instructors: PgInstructorsService,
    pub students: PgStudentsService,
    pub lesson_types: PgLessonTypesService,
    pub availability: PgAvailabilityService,
    pub bookings: PgBookingsService,
    pub deposits: PgDepositsService,

    /// Events delivered to the default channel sink.
    events: Mutex<mpsc::UnboundedReceiver<BookingEvent>>,
}

impl TestContext {
    /// Context whose notifications are captured for [`TestContext::next_event`], with manual
    /// transfer payments.
    pub async fn new() -> Self {
        Self::build(None, Arc::new(ManualTransferGateway)).await
    }

    /// Context delivering notifications to `sink` instead of the capturing channel.
    pub async fn with_sink(sink: Arc<dyn NotificationSink>) -> Self {
        Self::build(Some(sink), Arc::new(ManualTransferGateway)).await
    }

    /// Context processing payments through `gateway`.
    pub async fn with_gateway(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self::build(None, gateway).await
    }

    async fn build(sink: Option<Arc<dyn NotificationSink>>, gateway: Arc<dyn PaymentGateway>) -> Self {
        let test_db = TestDb::new().await;

        let db = Db::new(Self::setup_app_pool(&test_db).await);

        let (sender, receiver) = mpsc::unbounded_channel();
        let sink = sink.unwrap_or_else(|| Arc::new(ChannelSink::new(sender)));
        let notifier = Notifier::spawn(sink);

        let tenants = PgTenantsService::new(db.clone());

        let tenant = Self::provision(&tenants, "acme", PlanLimits::default()).await;

        Self {
            tenant_uuid: tenant.uuid(),
            tenant,
            instructors: PgInstructorsService::new(db.clone()),
            students: PgStudentsService::new(db.clone()),
            lesson_types: PgLessonTypesService::new(db.clone()),
            availability: PgAvailabilityService::new(db.clone()),
            bookings: PgBookingsService::new(db.clone(), notifier.clone()),
            deposits: PgDepositsService::new(db, notifier, gateway),
            tenants,
            db: test_db,
            events: Mutex::new(receiver),
        }
    }

    async fn provision(tenants: &PgTenantsService, slug: &str, limits: PlanLimits) -> Tenant {
        let record = tenants
            .create_tenant(NewTenant {
                uuid: TenantUuid::new(),
                slug: slug.to_string(),
                name: format!("{slug} driving school"),
                limits,
            })
            .await
            .expect("Failed to create test tenant");

        tenants
            .get_tenant(record.uuid)
            .await
            .expect("Failed to load test tenant")
    }

    /// Create another tenant with default settings, for isolation tests.
    pub async fn create_tenant(&self, slug: &str) -> Tenant {
        Self::provision(&self.tenants, slug, PlanLimits::default()).await
    }

    /// Create another tenant on a capped plan.
    pub async fn create_tenant_with_limits(&self, slug: &str, limits: PlanLimits) -> Tenant {
        Self::provision(&self.tenants, slug, limits).await
    }

    /// Next event delivered to the capturing sink, or `None` if none arrives in time.
    pub async fn next_event(&self) -> Option<BookingEvent> {
        let mut events = self.events.lock().await;

        timeout(EVENT_TIMEOUT, events.recv()).await.ok().flatten()
    }

    /// Panic if the capturing sink receives anything within a short quiet period.
    pub async fn assert_no_event(&self) {
        let mut events = self.events.lock().await;

        if let Ok(Some(event)) = timeout(QUIET_PERIOD, events.recv()).await {
            panic!("expected no event, got {} for {}", event.kind, event.lesson.uuid);
        }
    }

    /// Create the restricted role (once per server) and return a pool connected as it.
    ///
    /// Superusers bypass row-level security even with `FORCE ROW LEVEL SECURITY`.
    async fn setup_app_pool(test_db: &TestDb) -> PgPool {
        let su_url = &test_db.superuser_url;

        // Roles are server-scoped, so create them from the maintenance database.
        let server_url = su_url.rsplit_once('/').map_or(su_url.as_str(), |x| x.0);
        let server_url = format!("{server_url}/postgres");

        let mut server_conn = PgConnection::connect(&server_url)
            .await
            .expect("Failed to connect to postgres database for role setup");

        let created = query(&format!(
            "CREATE ROLE {APP_ROLE} WITH LOGIN PASSWORD '{APP_ROLE_PASSWORD}' \
               NOSUPERUSER NOCREATEDB NOCREATEROLE NOBYPASSRLS"
        ))
        .execute(&mut server_conn)
        .await;

        // Parallel tests race to create the role; losing the race is fine.
        match created {
            Ok(_) => {}
            Err(sqlx::Error::Database(ref e))
                if matches!(e.code().as_deref(), Some("42710" | "23505")) => {}
            Err(error) => panic!("Failed to create app role: {error}"),
        }

        query(&format!(
            "GRANT CONNECT ON DATABASE \"{}\" TO {APP_ROLE}",
            test_db.name
        ))
        .execute(&mut server_conn)
        .await
        .expect("Failed to grant CONNECT on test database");

        server_conn
            .close()
            .await
            .expect("Failed to close server connection");

        let mut db_conn = PgConnection::connect(su_url)
            .await
            .expect("Failed to connect to test database for privilege setup");

        for stmt in [
            format!("GRANT USAGE ON SCHEMA public TO {APP_ROLE}"),
            format!(
                "GRANT SELECT, INSERT, UPDATE, DELETE ON ALL TABLES IN SCHEMA public TO {APP_ROLE}"
            ),
        ] {
            query(&stmt)
                .execute(&mut db_conn)
                .await
                .expect("Failed to grant table privileges to app role");
        }

        db_conn
            .close()
            .await
            .expect("Failed to close db connection");

        let app_url = su_url.replacen(
            "roster_test:roster_test_password",
            &format!("{APP_ROLE}:{APP_ROLE_PASSWORD}"),
            1,
        );

        PgPool::connect(&app_url)
            .await
            .expect("Failed to create app pool")
    }
}
