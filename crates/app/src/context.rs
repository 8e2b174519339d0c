//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        availability::{AvailabilityService, PgAvailabilityService},
        deposits::{DepositsService, PgDepositsService},
        instructors::{InstructorsService, PgInstructorsService},
        lesson_types::{LessonTypesService, PgLessonTypesService},
        lessons::{BookingsService, PgBookingsService},
        notifications::{NotificationSink, Notifier},
        payments::PaymentGateway,
        students::{PgStudentsService, StudentsService},
        tenants::{PgTenantsService, TenantsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("database role bypasses row-level security; connect as the application role")]
    RlsBypassed,
}

/// Every service, wired to one connection pool.
///
/// Must be built inside a Tokio runtime; the notifier spawns its delivery task immediately.
#[derive(Clone)]
pub struct AppContext {
    pub tenants: Arc<dyn TenantsService>,
    pub instructors: Arc<dyn InstructorsService>,
    pub students: Arc<dyn StudentsService>,
    pub lesson_types: Arc<dyn LessonTypesService>,
    pub availability: Arc<dyn AvailabilityService>,
    pub bookings: Arc<dyn BookingsService>,
    pub deposits: Arc<dyn DepositsService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails, or when the connected
    /// role is not subject to row-level security.
    pub async fn from_database_url(
        url: &str,
        sink: Arc<dyn NotificationSink>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        let enforced = database::is_rls_enforced(&pool)
            .await
            .map_err(AppInitError::Database)?;

        if !enforced {
            return Err(AppInitError::RlsBypassed);
        }

        Ok(Self::from_db(Db::new(pool), sink, gateway))
    }

    /// Build application context over an existing pool wrapper.
    #[must_use]
    pub fn from_db(
        db: Db,
        sink: Arc<dyn NotificationSink>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let notifier = Notifier::spawn(sink);

        Self {
            tenants: Arc::new(PgTenantsService::new(db.clone())),
            instructors: Arc::new(PgInstructorsService::new(db.clone())),
            students: Arc::new(PgStudentsService::new(db.clone())),
            lesson_types: Arc::new(PgLessonTypesService::new(db.clone())),
            availability: Arc::new(PgAvailabilityService::new(db.clone())),
            bookings: Arc::new(PgBookingsService::new(db.clone(), notifier.clone())),
            deposits: Arc::new(PgDepositsService::new(db, notifier, gateway)),
        }
    }
}
