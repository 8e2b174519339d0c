//! Deposits service errors.

use std::num::TryFromIntError;

use roster::{
    ErrorKind as Kind,
    deposits::DepositTransitionError,
    lessons::{LessonStatus, TransitionError},
};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DepositsServiceError {
    #[error("lesson already has a deposit")]
    AlreadyExists,

    #[error("not found")]
    NotFound,

    #[error("a {0} lesson is not awaiting a deposit")]
    LessonNotAwaitingDeposit(LessonStatus),

    #[error(transparent)]
    InvalidTransition(#[from] DepositTransitionError),

    #[error(transparent)]
    LessonTransition(#[from] TransitionError),

    #[error("online payments are disabled for this tenant")]
    OnlinePaymentsDisabled,

    #[error("amount out of range")]
    InvalidAmount(#[from] TryFromIntError),

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl DepositsServiceError {
    /// Stable failure category.
    pub const fn kind(&self) -> Kind {
        match self {
            Self::AlreadyExists => Kind::AlreadyExists,
            Self::NotFound | Self::InvalidReference => Kind::NotFound,
            Self::LessonNotAwaitingDeposit(_)
            | Self::InvalidTransition(_)
            | Self::LessonTransition(_) => Kind::InvalidTransition,
            Self::OnlinePaymentsDisabled
            | Self::InvalidAmount(_)
            | Self::MissingRequiredData
            | Self::InvalidData => Kind::ValidationError,
            Self::Sql(_) => Kind::StorageError,
        }
    }
}

impl From<Error> for DepositsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
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
