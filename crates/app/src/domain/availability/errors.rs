//! Availability service errors.

use roster::{ErrorKind as Kind, slots::SlotError};
use sqlx::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AvailabilityServiceError {
    #[error("instructor not found")]
    NotFound,

    #[error(transparent)]
    InvalidSlots(#[from] SlotError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl AvailabilityServiceError {
    /// Stable failure category.
    pub const fn kind(&self) -> Kind {
        match self {
            Self::NotFound => Kind::NotFound,
            Self::InvalidSlots(_) => Kind::ValidationError,
            Self::Sql(_) => Kind::StorageError,
        }
    }
}

impl From<Error> for AvailabilityServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Sql(error)
    }
}
