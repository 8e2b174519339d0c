//! Bookings service errors.

use roster::{
    ErrorKind as Kind,
    lessons::{LessonStatus, TransitionError},
    limits::LimitKind,
    slots::SlotError,
};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

/// Partial unique index holding at most one non-cancelled lesson per instructor and start time.
pub(crate) const ACTIVE_SLOT_INDEX: &str = "lessons_active_slot_idx";

#[derive(Debug, Error)]
pub enum BookingsServiceError {
    #[error("lesson already exists")]
    AlreadyExists,

    #[error("not found")]
    NotFound,

    #[error("student has not verified their phone number")]
    Unverified,

    #[error("plan limit reached for {0}")]
    LimitExceeded(LimitKind),

    #[error("instructor already has a lesson at that time")]
    SlotConflict,

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    #[error("a {0} lesson cannot be rescheduled")]
    NotReschedulable(LessonStatus),

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("invalid timestamp")]
    Time(#[from] jiff::Error),

    #[error(transparent)]
    InvalidDay(#[from] SlotError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl BookingsServiceError {
    /// Stable failure category.
    pub const fn kind(&self) -> Kind {
        match self {
            Self::AlreadyExists => Kind::AlreadyExists,
            Self::NotFound | Self::InvalidReference => Kind::NotFound,
            Self::Unverified => Kind::Unverified,
            Self::LimitExceeded(_) => Kind::LimitExceeded,
            Self::SlotConflict => Kind::SlotConflict,
            Self::InvalidTransition(_) | Self::NotReschedulable(_) => Kind::InvalidTransition,
            Self::MissingRequiredData
            | Self::InvalidData
            | Self::Time(_)
            | Self::InvalidDay(_) => Kind::ValidationError,
            Self::Sql(_) => Kind::StorageError,
        }
    }
}

impl From<Error> for BookingsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        if is_slot_conflict(&error) {
            return Self::SlotConflict;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}

/// Whether `error` is a violation of the active slot index.
pub(crate) fn is_slot_conflict(error: &Error) -> bool {
    error.as_database_error().is_some_and(|e| {
        matches!(e.kind(), ErrorKind::UniqueViolation) && e.constraint() == Some(ACTIVE_SLOT_INDEX)
    })
}
