//! Instructors service errors.

use roster::{ErrorKind as Kind, limits::LimitKind};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstructorsServiceError {
    #[error("instructor already exists")]
    AlreadyExists,

    #[error("instructor not found")]
    NotFound,

    #[error("plan limit reached for {0}")]
    LimitExceeded(LimitKind),

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl InstructorsServiceError {
    /// Stable failure category.
    pub const fn kind(&self) -> Kind {
        match self {
            Self::AlreadyExists => Kind::AlreadyExists,
            Self::NotFound | Self::InvalidReference => Kind::NotFound,
            Self::LimitExceeded(_) => Kind::LimitExceeded,
            Self::MissingRequiredData | Self::InvalidData => Kind::ValidationError,
            Self::Sql(_) => Kind::StorageError,
        }
    }
}

impl From<Error> for InstructorsServiceError {
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
