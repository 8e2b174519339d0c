//! Students service errors.

use roster::{ErrorKind as Kind, limits::LimitKind, phone::PhoneError};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudentsServiceError {
    #[error("student already exists")]
    AlreadyExists,

    #[error("student not found")]
    NotFound,

    #[error("plan limit reached for {0}")]
    LimitExceeded(LimitKind),

    #[error(transparent)]
    InvalidPhone(#[from] PhoneError),

    #[error("invalid or expired verification code")]
    InvalidOtp,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("invalid timestamp")]
    Time(#[from] jiff::Error),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl StudentsServiceError {
    /// Stable failure category.
    pub const fn kind(&self) -> Kind {
        match self {
            Self::AlreadyExists => Kind::AlreadyExists,
            Self::NotFound | Self::InvalidReference => Kind::NotFound,
            Self::LimitExceeded(_) => Kind::LimitExceeded,
            Self::InvalidOtp => Kind::Unverified,
            Self::InvalidPhone(_)
            | Self::MissingRequiredData
            | Self::InvalidData
            | Self::Time(_) => Kind::ValidationError,
            Self::Sql(_) => Kind::StorageError,
        }
    }
}

impl From<Error> for StudentsServiceError {
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
