//! Lesson types service errors.

use std::num::TryFromIntError;

use roster::ErrorKind as Kind;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LessonTypesServiceError {
    #[error("lesson type already exists")]
    AlreadyExists,

    #[error("lesson type not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("invalid price value")]
    InvalidPrice(#[from] TryFromIntError),
}

impl LessonTypesServiceError {
    /// Stable failure category.
    pub const fn kind(&self) -> Kind {
        match self {
            Self::AlreadyExists => Kind::AlreadyExists,
            Self::NotFound | Self::InvalidReference => Kind::NotFound,
            Self::MissingRequiredData | Self::InvalidData | Self::InvalidPrice(_) => {
                Kind::ValidationError
            }
            Self::Sql(_) => Kind::StorageError,
        }
    }
}

impl From<Error> for LessonTypesServiceError {
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
